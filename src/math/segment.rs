//! Offsetting of 3D segments around a normal axis.
//!
//! Sign convention: a positive distance offsets along `direction x normal`.
//! For the vertical normal this is the left (counter-clockwise) normal in
//! the planar `(x, z)` frame, so `+x` offsets towards `+z`.

use super::{Point3, Vector3, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Returns the point at `distance` from `origin`, orthogonal both to the
/// direction `origin -> point` and to `normal`.
///
/// Only the direction of `point - origin` is used.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if `origin` and `point` coincide or if
/// the direction is parallel to `normal`.
pub fn orthogonal(origin: &Point3, point: &Point3, distance: f64, normal: &Vector3) -> Result<Point3> {
    let vector = point - origin;
    let magnitude = vector.norm();
    if magnitude < TOLERANCE {
        return Err(GeometryError::Degenerate(format!(
            "zero-length direction at ({}, {}, {})",
            origin.x, origin.y, origin.z
        ))
        .into());
    }

    let side = (vector / magnitude).cross(normal);
    if side.norm() < TOLERANCE {
        return Err(GeometryError::Degenerate(
            "direction and normal are not linearly independent".into(),
        )
        .into());
    }

    Ok(origin + side * distance)
}

/// Returns the segment parallel to `segment` at `distance`.
///
/// Each endpoint is moved with [`orthogonal`]; the end point is offset
/// against the reversed direction with a negated distance so both land on
/// the same side.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` for a zero-length segment or one
/// parallel to `normal`.
pub fn parallel(segment: &(Point3, Point3), distance: f64, normal: &Vector3) -> Result<(Point3, Point3)> {
    let (start, end) = segment;
    Ok((
        orthogonal(start, end, distance, normal)?,
        orthogonal(end, start, -distance, normal)?,
    ))
}
