use std::collections::HashMap;

use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::{ElevationReference, Polyline};
use crate::math::polygon_2d::non_collinear_indices;
use crate::math::{Axis, Point2, Point3, Voxel, TOLERANCE};

use super::{
    CurveParams, FilletPolyline2D, MaterialSlot, PlacementCell, ProjectSurface, RoadParams,
};

/// Receives placement cells. Writing the same position twice must leave the
/// same result as writing it once.
pub trait PlacementSink {
    fn place(&mut self, cell: PlacementCell);
}

impl PlacementSink for Vec<PlacementCell> {
    fn place(&mut self, cell: PlacementCell) {
        self.push(cell);
    }
}

impl PlacementSink for HashMap<Voxel, MaterialSlot> {
    fn place(&mut self, cell: PlacementCell) {
        self.insert(cell.position, cell.material);
    }
}

/// A built road: its cleaned waypoints, the smoothed path for curved roads,
/// and the cells covering it.
#[derive(Debug, Clone)]
pub struct Road {
    /// Waypoints left after collinear stripping.
    pub waypoints: Vec<Point3>,
    /// The filleted planar path; `None` for two-point roads.
    pub polyline: Option<Polyline>,
    pub cells: Vec<PlacementCell>,
}

impl Road {
    /// Returns `true` if the road went through corner filleting.
    #[must_use]
    pub fn is_curved(&self) -> bool {
        self.polyline.is_some()
    }

    /// Hands every cell to `sink`, in order.
    pub fn place_into<S: PlacementSink + ?Sized>(&self, sink: &mut S) {
        for &cell in &self.cells {
            sink.place(cell);
        }
    }
}

/// Builds the paved surface of one road from its waypoints.
///
/// Waypoints whose planar projection is exactly collinear with their
/// neighbours are dropped first. Two remaining points give a straight band
/// whose heights follow the 3D segment between them. Three or more go
/// through corner filleting; their heights follow a height profile smoothed
/// the same way.
#[derive(Debug)]
pub struct BuildRoad {
    waypoints: Vec<Point3>,
    params: RoadParams,
}

impl BuildRoad {
    /// Creates a new road build.
    #[must_use]
    pub fn new(waypoints: Vec<Point3>, params: RoadParams) -> Self {
        Self { waypoints, params }
    }

    /// Executes the build.
    ///
    /// # Errors
    ///
    /// - `GeometryError::InsufficientPoints` if fewer than 2 waypoints are
    ///   given
    /// - `GeometryError::Degenerate` if the two remaining waypoints project
    ///   onto the same planar point
    pub fn execute(&self) -> Result<Road> {
        let vertical = self.params.vertical;
        let waypoints = strip_collinear(&self.waypoints, vertical);

        let (polyline, cells) = match waypoints.as_slice() {
            [] | [_] => {
                return Err(GeometryError::InsufficientPoints {
                    required: 2,
                    found: waypoints.len(),
                }
                .into());
            }
            [start, end] => (None, self.build_direct(start, end)?),
            _ => {
                let (polyline, cells) = self.build_curved(&waypoints)?;
                (Some(polyline), cells)
            }
        };

        tracing::debug!(
            input = self.waypoints.len(),
            kept = waypoints.len(),
            curved = polyline.is_some(),
            cells = cells.len(),
            "built road"
        );
        Ok(Road {
            waypoints,
            polyline,
            cells,
        })
    }

    fn build_direct(&self, start: &Point3, end: &Point3) -> Result<Vec<PlacementCell>> {
        let vertical = self.params.vertical;
        let samples = sample_segment(start, end, self.params.curve.spacing());
        let reference = ElevationReference::from_points(&samples, vertical)?;
        ProjectSurface::segment(
            vertical.project(start),
            vertical.project(end),
            self.params.style,
            &reference,
            vertical,
        )
        .execute()
    }

    fn build_curved(&self, waypoints: &[Point3]) -> Result<(Polyline, Vec<PlacementCell>)> {
        let vertical = self.params.vertical;
        let planar = waypoints.iter().map(|p| vertical.project(p)).collect();
        let polyline = FilletPolyline2D::new(planar, self.params.curve).execute()?;

        let heights = height_profile(&polyline, waypoints, vertical, self.params.curve)?;
        let reference = ElevationReference::from_samples(&polyline.samples, heights)?;
        let cells = ProjectSurface::new(&polyline, self.params.style, &reference, vertical).execute()?;
        Ok((polyline, cells))
    }
}

/// Drops interior waypoints whose projection along `vertical` is exactly
/// collinear with their neighbours, until none is left.
#[must_use]
pub fn strip_collinear(points: &[Point3], vertical: Axis) -> Vec<Point3> {
    let planar: Vec<Point2> = points.iter().map(|p| vertical.project(p)).collect();
    non_collinear_indices(&planar)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Points along `start -> end`, at most `spacing` apart, both ends included.
fn sample_segment(start: &Point3, end: &Point3, spacing: f64) -> Vec<Point3> {
    let length = (end - start).norm();
    if length < TOLERANCE {
        return vec![*start];
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = ((length / spacing).ceil() as u32).max(1);
    (0..=steps)
        .map(|k| start + (end - start) * (f64::from(k) / f64::from(steps)))
        .collect()
}

/// Height of every sample of `polyline`.
///
/// Each waypoint is matched to its nearest sample, giving a profile of
/// `(sample index, height)` points. A profile with at least three
/// non-collinear points is filleted like the planar path and read back at
/// `round(i * profile_samples / path_samples)`; otherwise heights are
/// interpolated linearly between profile points.
#[allow(clippy::cast_precision_loss)]
fn height_profile(
    polyline: &Polyline,
    waypoints: &[Point3],
    vertical: Axis,
    curve: CurveParams,
) -> Result<Vec<f64>> {
    let count = polyline.samples.len();
    let index = ElevationReference::from_samples(&polyline.samples, vec![0.0; count])?;

    let profile = waypoints
        .iter()
        .map(|w| {
            let i = index
                .nearest_index(&vertical.project(w))
                .ok_or_else(|| OperationError::Failed("path has no samples".into()))?;
            Ok(Point2::new(i as f64, vertical.component(w)))
        })
        .collect::<Result<Vec<_>>>()?;
    let profile: Vec<Point2> = non_collinear_indices(&profile)
        .into_iter()
        .map(|i| profile[i])
        .collect();

    if profile.len() < 3 {
        return Ok((0..count).map(|i| interpolate(&profile, i as f64)).collect());
    }

    let smooth = FilletPolyline2D::new(profile, curve).execute()?;
    let fine = &smooth.samples;
    let last = fine.len().saturating_sub(1);
    let factor = fine.len() as f64 / count as f64;
    Ok((0..count)
        .map(|i| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let j = ((i as f64 * factor).round() as usize).min(last);
            fine[j].y
        })
        .collect())
}

/// Piecewise-linear height at index `x` along an ordered profile.
fn interpolate(profile: &[Point2], x: f64) -> f64 {
    let Some(first) = profile.first() else {
        return 0.0;
    };
    if x <= first.x {
        return first.y;
    }
    for w in profile.windows(2) {
        if x <= w[1].x {
            let span = w[1].x - w[0].x;
            if span < TOLERANCE {
                return w[1].y;
            }
            let t = (x - w[0].x) / span;
            return w[0].y + (w[1].y - w[0].y) * t;
        }
    }
    profile.last().map_or(first.y, |p| p.y)
}
