use crate::math::arc_2d::FilletArc;
use crate::math::{Point2, Vector2, TOLERANCE};

/// A straight stretch of a smoothed path, lying on one waypoint segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightRun {
    pub start: Point2,
    pub end: Point2,
    /// Index `i` of the waypoint segment `i -> i + 1` the run lies on.
    pub segment: usize,
}

impl StraightRun {
    /// Creates a new run.
    #[must_use]
    pub fn new(start: Point2, end: Point2, segment: usize) -> Self {
        Self {
            start,
            end,
            segment,
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length() < TOLERANCE
    }

    #[must_use]
    pub fn vector(&self) -> Vector2 {
        self.end - self.start
    }
}

/// The fillet at one interior waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Index of the waypoint this corner rounds.
    pub waypoint: usize,
    /// The waypoint itself, where the two adjacent segments meet.
    pub vertex: Point2,
    pub arc: FilletArc,
}

impl Corner {
    /// Arc centre.
    #[must_use]
    pub fn center(&self) -> Point2 {
        self.arc.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.arc.radius
    }

    /// The tangent points bounding the arc on the incoming and outgoing
    /// segments.
    #[must_use]
    pub fn boundary(&self) -> (Point2, Point2) {
        (self.arc.start, self.arc.end)
    }
}

/// A planar path of straight runs joined by tangent circular arcs.
///
/// `samples` is the continuous output of the path: straight-run points and
/// arc points interleaved in traversal order, at most one sampling spacing
/// apart and without repeated points at run/arc joins. Its index order is the
/// parameterization used for width offsets and height lookup.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    /// The input waypoints.
    pub waypoints: Vec<Point2>,
    /// Non-degenerate straight runs in traversal order.
    pub runs: Vec<StraightRun>,
    /// One corner per filleted interior waypoint, in traversal order.
    pub corners: Vec<Corner>,
    pub samples: Vec<Point2>,
}

impl Polyline {
    /// Total length of the path (runs plus arcs).
    #[must_use]
    pub fn length(&self) -> f64 {
        let runs: f64 = self.runs.iter().map(StraightRun::length).sum();
        let arcs: f64 = self.corners.iter().map(|c| c.arc.length()).sum();
        runs + arcs
    }

    /// Returns the corner rounding waypoint `index`, if that waypoint was
    /// filleted.
    #[must_use]
    pub fn corner_at(&self, index: usize) -> Option<&Corner> {
        self.corners.iter().find(|c| c.waypoint == index)
    }
}
