//! 2D circular-arc utilities for corner fillets.
//!
//! Angles are measured counter-clockwise from `+x`. A positive sweep runs
//! counter-clockwise, a negative sweep clockwise.
use std::f64::consts::PI;

use super::polygon_2d::collinear;
use super::{Point2, Vector2, TOLERANCE};

/// A circular arc tangent to two consecutive segments of a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilletArc {
    pub center: Point2,
    pub radius: f64,
    /// Tangent point on the incoming segment.
    pub start: Point2,
    /// Tangent point on the outgoing segment.
    pub end: Point2,
    pub start_angle: f64,
    pub sweep: f64,
}

impl FilletArc {
    /// Point at parameter `t` in `[0, 1]` along the arc.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        arc_point_at(&self.center, self.radius, self.start_angle, self.sweep, t)
    }

    /// Arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Half of the interior angle at `vertex` between the rays towards `prev`
/// and `next`.
///
/// Returns `None` when the three points are exactly collinear or a ray has
/// zero length: such a corner is passed straight through.
#[must_use]
pub fn corner_half_angle(prev: &Point2, vertex: &Point2, next: &Point2) -> Option<f64> {
    let u1 = prev - vertex;
    let u2 = next - vertex;
    let (l1, l2) = (u1.norm(), u2.norm());
    if l1 < TOLERANCE || l2 < TOLERANCE || collinear(prev, vertex, next) {
        return None;
    }
    let cos_phi = (u1.dot(&u2) / (l1 * l2)).clamp(-1.0, 1.0);
    let half = cos_phi.acos() * 0.5;
    if half < TOLERANCE || half > PI * 0.5 - TOLERANCE {
        return None;
    }
    Some(half)
}

/// Fits the arc tangent to `prev -> vertex` and `vertex -> next` whose
/// tangent points lie `tangent_length` away from `vertex`.
///
/// The radius follows from the corner angle: `r = tangent_length * tan(half)`.
/// Returns `None` for pass-through corners (see [`corner_half_angle`]) or a
/// non-positive tangent length.
#[must_use]
pub fn fillet(prev: &Point2, vertex: &Point2, next: &Point2, tangent_length: f64) -> Option<FilletArc> {
    if tangent_length < TOLERANCE {
        return None;
    }
    let half = corner_half_angle(prev, vertex, next)?;

    let u1 = (prev - vertex).normalize();
    let u2 = (next - vertex).normalize();
    let bisector: Vector2 = (u1 + u2).normalize();

    let radius = tangent_length * half.tan();
    let center = vertex + bisector * (tangent_length / half.cos());
    let start = vertex + u1 * tangent_length;
    let end = vertex + u2 * tangent_length;

    // Walking direction turns left (counter-clockwise) when the cross of
    // incoming and outgoing directions is positive.
    let d_in = -u1;
    let turn = d_in.x * u2.y - d_in.y * u2.x;
    let sweep = (PI - 2.0 * half) * turn.signum();
    let start_angle = (start.y - center.y).atan2(start.x - center.x);

    Some(FilletArc {
        center,
        radius,
        start,
        end,
        start_angle,
        sweep,
    })
}

/// Number of chords needed so that each chord of the arc is at most
/// `spacing` long (measured along the arc).
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, spacing: f64) -> u32 {
    if radius < TOLERANCE || abs_sweep < TOLERANCE || spacing <= 0.0 {
        return 1;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (radius * abs_sweep / spacing).ceil().min(f64::from(u32::MAX)) as u32;
    n.max(1)
}
