use serde::Serialize;
use thiserror::Error;

use crate::geometry::{Point, Side, line_angle};
use crate::select::ConnectionPair;

/// Smallest width/height of the container box, even for coincident anchors.
pub const MIN_CONTAINER_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairEnd {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no endpoint offset rule for a {side:?} anchor on the {end:?} end")]
    UnsupportedSide { end: PairEnd, side: Side },
}

/// Container box in shared coordinates plus the two endpoints in box-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathGeometry {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub points: [Point; 2],
}

impl PathGeometry {
    pub fn to_path_data(&self) -> String {
        let [Point { x: x1, y: y1 }, Point { x: x2, y: y2 }] = self.points;
        format!("M {x1:.2} {y1:.2} L {x2:.2} {y2:.2}")
    }
}

/// Lays out the connector for `pair`. The stroke width doubles as the endpoint
/// inset; it is a flat offset, not corrected for the line's slope.
pub fn line_path(pair: &ConnectionPair, stroke_width: f32) -> Result<PathGeometry, PathError> {
    let left = pair.left;
    let right = pair.right;
    let top = left.y.min(right.y);
    let width = (left.x - right.x).abs().max(MIN_CONTAINER_SIZE);
    let height = (left.y - right.y).abs().max(MIN_CONTAINER_SIZE);
    // Negative slope: the right anchor sits above the left one.
    let is_top_half = line_angle(right.point(), left.point()) < 0.0;
    let offset = stroke_width;

    let start = match left.side {
        Side::Top => Point::new(offset, height + offset),
        Side::Right if is_top_half => Point::new(-offset, height - offset),
        Side::Right => Point::new(-offset, offset),
        Side::Bottom => Point::new(offset, -offset),
        side => {
            return Err(PathError::UnsupportedSide {
                end: PairEnd::Left,
                side,
            });
        }
    };
    let end = match right.side {
        Side::Top => Point::new(width - offset, height + offset),
        Side::Left if is_top_half => Point::new(width + offset, offset),
        Side::Left => Point::new(width + offset, height - offset),
        Side::Bottom => Point::new(width - offset, -offset),
        side => {
            return Err(PathError::UnsupportedSide {
                end: PairEnd::Right,
                side,
            });
        }
    };

    Ok(PathGeometry {
        top,
        left: left.x,
        width,
        height,
        points: [start, end],
    })
}
