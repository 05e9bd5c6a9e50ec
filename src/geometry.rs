use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of an element in the shared (viewport) coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            top: self.top + dy,
            left: self.left + dx,
            ..*self
        }
    }

    pub fn side_center(&self, side: Side) -> AnchorPoint {
        let cx = self.left + self.width / 2.0;
        let cy = self.top + self.height / 2.0;
        let (x, y) = match side {
            Side::Top => (cx, self.top),
            Side::Right => (self.right(), cy),
            Side::Bottom => (cx, self.bottom()),
            Side::Left => (self.left, cy),
        };
        AnchorPoint { x, y, side }
    }

    /// Side midpoints in `Side::ALL` order.
    pub fn side_centers(&self) -> [AnchorPoint; 4] {
        Side::ALL.map(|side| self.side_center(side))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Side::Top,
            1 => Side::Right,
            2 => Side::Bottom,
            _ => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "TOP",
            Side::Right => "RIGHT",
            Side::Bottom => "BOTTOM",
            Side::Left => "LEFT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Midpoint of one side of a rectangle, tagged with the side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: f32,
    pub y: f32,
    pub side: Side,
}

impl AnchorPoint {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Signed slope angle of the line through `a` and `b`, in degrees.
///
/// Vertical lines give ±90 and coincident points give NaN; callers decide how to
/// treat those.
pub fn line_angle(a: Point, b: Point) -> f32 {
    ((a.y - b.y) / (a.x - b.x)).atan().to_degrees()
}
