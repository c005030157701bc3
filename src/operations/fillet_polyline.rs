use crate::error::{GeometryError, Result};
use crate::geometry::{Corner, Polyline, StraightRun};
use crate::math::arc_2d::{arc_subdivision_count, corner_half_angle, fillet, FilletArc};
use crate::math::{Point2, TOLERANCE};

use super::CurveParams;

/// Rounds the interior corners of a planar polyline with tangent arcs.
///
/// At each interior waypoint the incoming and outgoing segments are joined
/// by a circular arc tangent to both. The tangent points lie at most
/// `max_tangent_fraction` of the shorter adjacent segment away from the
/// waypoint, so arcs on the two ends of a segment never overlap. With a
/// preferred radius set, a corner uses that radius unless the bound forces a
/// smaller one.
///
/// Exactly collinear corners and corners with a zero-length neighbour
/// segment are passed straight through.
#[derive(Debug)]
pub struct FilletPolyline2D {
    points: Vec<Point2>,
    params: CurveParams,
}

impl FilletPolyline2D {
    /// Creates a new fillet operation.
    #[must_use]
    pub fn new(points: Vec<Point2>, params: CurveParams) -> Self {
        Self { points, params }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientPoints` if fewer than 3 points are
    /// provided.
    pub fn execute(&self) -> Result<Polyline> {
        let n = self.points.len();
        if n < 3 {
            return Err(GeometryError::InsufficientPoints {
                required: 3,
                found: n,
            }
            .into());
        }

        let pts = &self.points;
        let mut runs = Vec::with_capacity(n);
        let mut corners = Vec::with_capacity(n - 2);
        let mut cursor = pts[0];

        for i in 1..n - 1 {
            let Some(arc) = self.corner_arc(&pts[i - 1], &pts[i], &pts[i + 1]) else {
                push_run(&mut runs, cursor, pts[i], i - 1);
                cursor = pts[i];
                continue;
            };
            push_run(&mut runs, cursor, arc.start, i - 1);
            corners.push(Corner {
                waypoint: i,
                vertex: pts[i],
                arc,
            });
            cursor = arc.end;
        }
        push_run(&mut runs, cursor, pts[n - 1], n - 2);

        let samples = self.sample(pts[0], &runs, &corners);
        tracing::trace!(
            waypoints = n,
            corners = corners.len(),
            samples = samples.len(),
            "filleted polyline"
        );

        Ok(Polyline {
            waypoints: self.points.clone(),
            runs,
            corners,
            samples,
        })
    }

    /// Fits the arc at `vertex`, or `None` for a pass-through corner.
    fn corner_arc(&self, prev: &Point2, vertex: &Point2, next: &Point2) -> Option<FilletArc> {
        let half = corner_half_angle(prev, vertex, next)?;
        let shorter = (prev - vertex).norm().min((next - vertex).norm());
        let mut tangent = shorter * self.params.max_tangent_fraction();
        if let Some(radius) = self.params.radius() {
            tangent = tangent.min(radius / half.tan());
        }
        fillet(prev, vertex, next, tangent)
    }

    /// Builds the continuous output: runs and arcs interleaved in traversal
    /// order, each piece subdivided to at most `spacing`.
    fn sample(&self, first: Point2, runs: &[StraightRun], corners: &[Corner]) -> Vec<Point2> {
        let spacing = self.params.spacing();
        let mut out = vec![first];
        let mut corners = corners.iter().peekable();

        for run in runs {
            // Corners whose arc ends where this run begins come first.
            while let Some(corner) = corners.peek() {
                if corner.waypoint > run.segment {
                    break;
                }
                push_arc(&mut out, corner, spacing);
                corners.next();
            }
            push_segment(&mut out, run.start, run.end, spacing);
        }
        for corner in corners {
            push_arc(&mut out, corner, spacing);
        }
        out
    }
}

fn push_run(runs: &mut Vec<StraightRun>, start: Point2, end: Point2, segment: usize) {
    let run = StraightRun::new(start, end, segment);
    if !run.is_degenerate() {
        runs.push(run);
    }
}

/// Appends points along `start -> end`, excluding `start` unless the output
/// has drifted away from it.
fn push_segment(out: &mut Vec<Point2>, start: Point2, end: Point2, spacing: f64) {
    if out.last().is_none_or(|last| (last - start).norm() > TOLERANCE) {
        out.push(start);
    }
    let length = (end - start).norm();
    if length < TOLERANCE {
        return;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = ((length / spacing).ceil() as u32).max(1);
    for k in 1..=steps {
        let t = f64::from(k) / f64::from(steps);
        out.push(start + (end - start) * t);
    }
}

fn push_arc(out: &mut Vec<Point2>, corner: &Corner, spacing: f64) {
    let arc = &corner.arc;
    if out.last().is_none_or(|last| (last - arc.start).norm() > TOLERANCE) {
        out.push(arc.start);
    }
    let steps = arc_subdivision_count(arc.radius, arc.sweep.abs(), spacing);
    for k in 1..steps {
        out.push(arc.point_at(f64::from(k) / f64::from(steps)));
    }
    out.push(arc.end);
}
