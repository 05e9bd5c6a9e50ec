use std::cmp::Ordering;

use serde::Serialize;

use crate::config::ConnectorConfig;
use crate::geometry::{AnchorPoint, Point, Rect, Side, distance, line_angle};

// ── Candidate acceptance ────────────────────────────────────────────
/// Minimum slope (degrees from horizontal) for a non-opposing side pair.
pub const DEFAULT_CORNER_ANGLE: f32 = 25.0;

// ── Hysteresis ──────────────────────────────────────────────────────
/// Largest side-center displacement still treated as "nothing moved".
pub const DEFAULT_CHANGE_TRIGGER_SIZE: f32 = 1.0;

const SNAPSHOT_LEN: usize = 8;

/// Anything that can report where it currently sits on screen.
pub trait ElementHandle {
    fn bounding_box(&self) -> Rect;
}

impl<T: ElementHandle + ?Sized> ElementHandle for &T {
    fn bounding_box(&self) -> Rect {
        (**self).bounding_box()
    }
}

/// Answers whether an element is still part of its layout root.
pub trait ContainmentQuery<E: ?Sized> {
    fn contains(&self, element: &E) -> bool;
}

impl<E: ?Sized, F> ContainmentQuery<E> for F
where
    F: Fn(&E) -> bool,
{
    fn contains(&self, element: &E) -> bool {
        self(element)
    }
}

/// Containment query for hosts where elements never leave the layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAttached;

impl<E: ?Sized> ContainmentQuery<E> for AlwaysAttached {
    fn contains(&self, _element: &E) -> bool {
        true
    }
}

/// Ordered anchor pair; `left.x <= right.x` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConnectionPair {
    pub left: AnchorPoint,
    pub right: AnchorPoint,
}

impl ConnectionPair {
    /// Orders two anchors by x. On a tie the second anchor becomes `left`.
    pub fn ordered(first: AnchorPoint, second: AnchorPoint) -> Self {
        if first.x < second.x {
            Self {
                left: first,
                right: second,
            }
        } else {
            Self {
                left: second,
                right: first,
            }
        }
    }

    /// RIGHT side facing a LEFT side: elements sit next to each other.
    pub fn is_opposite_sides(&self) -> bool {
        self.left.side == Side::Right && self.right.side == Side::Left
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Connected(ConnectionPair),
    /// Every side center moved less than the change trigger size.
    Unchanged,
    /// No candidate pair passed the corner rule.
    NoCandidate,
    /// One of the elements left its layout root.
    Detached,
}

impl Selection {
    pub fn pair(&self) -> Option<&ConnectionPair> {
        match self {
            Selection::Connected(pair) => Some(pair),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Selection::Connected(_) => "connected",
            Selection::Unchanged => "unchanged",
            Selection::NoCandidate => "no-candidate",
            Selection::Detached => "detached",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    first: usize,
    second: usize,
}

#[derive(Debug, Clone)]
pub struct ConnectionPointSelector {
    corner_angle: f32,
    change_trigger_size: f32,
    snapshot: Option<[Point; SNAPSHOT_LEN]>,
}

impl Default for ConnectionPointSelector {
    fn default() -> Self {
        Self::new(DEFAULT_CORNER_ANGLE, DEFAULT_CHANGE_TRIGGER_SIZE)
    }
}

impl ConnectionPointSelector {
    pub fn new(corner_angle: f32, change_trigger_size: f32) -> Self {
        Self {
            corner_angle,
            change_trigger_size,
            snapshot: None,
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self::new(config.corner_angle, config.change_trigger_size)
    }

    pub fn corner_angle(&self) -> f32 {
        self.corner_angle
    }

    pub fn change_trigger_size(&self) -> f32 {
        self.change_trigger_size
    }

    /// Forgets the remembered side centers; the next call always recomputes.
    pub fn reset(&mut self) {
        self.snapshot = None;
    }

    /// Checks attachment, then measures both elements and selects a pair.
    pub fn select_elements<E, Q>(&mut self, first: &E, second: &E, containment: &Q) -> Selection
    where
        E: ElementHandle + ?Sized,
        Q: ContainmentQuery<E> + ?Sized,
    {
        if !containment.contains(first) || !containment.contains(second) {
            tracing::debug!("connector element detached from layout root");
            return Selection::Detached;
        }
        self.select(&first.bounding_box(), &second.bounding_box())
    }

    pub fn select(&mut self, first: &Rect, second: &Rect) -> Selection {
        let first_centers = first.side_centers();
        let second_centers = second.side_centers();
        let snapshot: [Point; SNAPSHOT_LEN] = std::array::from_fn(|idx| {
            if idx < 4 {
                first_centers[idx].point()
            } else {
                second_centers[idx - 4].point()
            }
        });

        if let Some(previous) = &self.snapshot {
            let moved = max_displacement(previous, &snapshot);
            if moved < self.change_trigger_size {
                tracing::trace!(
                    moved,
                    threshold = self.change_trigger_size,
                    "selection suppressed"
                );
                return Selection::Unchanged;
            }
        }
        self.snapshot = Some(snapshot);

        for candidate in sorted_candidates(&first_centers, &second_centers) {
            let from_first = first_centers[candidate.first];
            let from_second = second_centers[candidate.second];
            let pair = ConnectionPair::ordered(from_first, from_second);
            let angle = line_angle(from_first.point(), from_second.point()).abs();
            if pair.is_opposite_sides()
                || meets_corner_angle(&from_first, &from_second, self.corner_angle)
            {
                tracing::debug!(
                    left = pair.left.side.as_str(),
                    right = pair.right.side.as_str(),
                    distance = candidate.distance,
                    angle,
                    "connection pair selected"
                );
                return Selection::Connected(pair);
            }
        }

        tracing::debug!("no anchor pair passed the corner rule");
        Selection::NoCandidate
    }
}

/// Vertical and coincident anchors have no defined slope and always pass.
fn meets_corner_angle(a: &AnchorPoint, b: &AnchorPoint, corner_angle: f32) -> bool {
    if a.x == b.x {
        return true;
    }
    let angle = line_angle(a.point(), b.point()).abs();
    angle.is_nan() || angle >= corner_angle
}

fn max_displacement(previous: &[Point; SNAPSHOT_LEN], current: &[Point; SNAPSHOT_LEN]) -> f32 {
    previous
        .iter()
        .zip(current.iter())
        .map(|(old, new)| distance(*old, *new))
        .fold(0.0, f32::max)
}

/// All 16 cross pairs, nearest first. Equal distances keep second-major order.
fn sorted_candidates(first: &[AnchorPoint; 4], second: &[AnchorPoint; 4]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(16);
    for (second_idx, b) in second.iter().enumerate() {
        for (first_idx, a) in first.iter().enumerate() {
            candidates.push(Candidate {
                distance: distance(a.point(), b.point()),
                first: first_idx,
                second: second_idx,
            });
        }
    }
    candidates.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    });
    candidates
}
