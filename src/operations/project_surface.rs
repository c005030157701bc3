use std::collections::HashSet;

use crate::error::{OperationError, Result};
use crate::geometry::{Corner, ElevationReference, Polyline, StraightRun};
use crate::math::polygon_2d::point_in_triangle;
use crate::math::segment::orthogonal;
use crate::math::{point_to_voxel, Axis, Point2, Vector2, Voxel, TOLERANCE, UP};

use super::SurfaceStyle;

/// How far the wedge triangle reaches past the tangent points, in multiples
/// of the centre-to-tangent distance.
const WEDGE_EXTENSION: f64 = 5.0;

/// Which part of a road produced a cell. Callers map slots to materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    /// Band along a straight run of a curved road.
    Straight,
    /// Filled wedge of a corner arc.
    Corner,
    /// Band of a two-point road.
    Direct,
}

/// A grid position and the material slot to place there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementCell {
    pub position: Voxel,
    pub material: MaterialSlot,
}

/// Covers a smoothed path with cells of a given width and lifts every cell
/// to the height of its nearest elevation sample.
///
/// Straight runs are covered by bands: a cell is in a band when its centre
/// projects onto the run and its signed offset from the run lies in the
/// style's offset range. Corners are covered by the matching annulus around
/// the arc centre, clipped to the wedge spanned by the centre and the two
/// tangent points. Each planar cell is emitted once; straight runs claim
/// cells before corners.
#[derive(Debug)]
pub struct ProjectSurface<'a> {
    runs: Vec<StraightRun>,
    corners: &'a [Corner],
    style: SurfaceStyle,
    reference: &'a ElevationReference,
    vertical: Axis,
    band_material: MaterialSlot,
}

impl<'a> ProjectSurface<'a> {
    /// Projects the runs and corners of `polyline`.
    #[must_use]
    pub fn new(
        polyline: &'a Polyline,
        style: SurfaceStyle,
        reference: &'a ElevationReference,
        vertical: Axis,
    ) -> Self {
        Self {
            runs: polyline.runs.clone(),
            corners: &polyline.corners,
            style,
            reference,
            vertical,
            band_material: MaterialSlot::Straight,
        }
    }

    /// Projects the single straight segment `start -> end`.
    #[must_use]
    pub fn segment(
        start: Point2,
        end: Point2,
        style: SurfaceStyle,
        reference: &'a ElevationReference,
        vertical: Axis,
    ) -> Self {
        Self {
            runs: vec![StraightRun::new(start, end, 0)],
            corners: &[],
            style,
            reference,
            vertical,
            band_material: MaterialSlot::Direct,
        }
    }

    /// Executes the projection.
    ///
    /// # Errors
    ///
    /// - `GeometryError::Degenerate` if a straight run has zero length
    /// - `OperationError::Failed` if the elevation reference has no samples
    pub fn execute(&self) -> Result<Vec<PlacementCell>> {
        let (lo, hi) = self.style.offset_range();
        let mut seen = HashSet::new();
        let mut planar = Vec::new();

        for run in &self.runs {
            let normal = band_normal(run)?;
            for p in band_cells(run, &normal, lo, hi) {
                if seen.insert(cell_key(&p)) {
                    planar.push((p, self.band_material));
                }
            }
        }
        for corner in self.corners {
            for p in wedge_cells(corner, lo, hi) {
                if seen.insert(cell_key(&p)) {
                    planar.push((p, MaterialSlot::Corner));
                }
            }
        }

        let cells = planar
            .into_iter()
            .map(|(p, material)| {
                let height = self
                    .reference
                    .height_at(&p)
                    .ok_or_else(|| OperationError::Failed("elevation reference is empty".into()))?;
                Ok(PlacementCell {
                    position: point_to_voxel(&self.vertical.unproject(&p, height)),
                    material,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::trace!(
            runs = self.runs.len(),
            corners = self.corners.len(),
            cells = cells.len(),
            "projected surface"
        );
        Ok(cells)
    }
}

/// Unit left normal of a run. Lifts the run into a `Y`-up frame so the
/// offset comes from `segment::orthogonal`, then drops the height again.
fn band_normal(run: &StraightRun) -> Result<Vector2> {
    let lift = Axis::Y;
    let origin = lift.unproject(&run.start, 0.0);
    let towards = lift.unproject(&run.end, 0.0);
    let offset = orthogonal(&origin, &towards, 1.0, &UP)?;
    Ok(lift.project(&offset) - run.start)
}

#[allow(clippy::cast_possible_truncation)]
fn cell_key(p: &Point2) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

/// Integer cell centres inside the box `[min, max]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn grid(min: Point2, max: Point2) -> impl Iterator<Item = Point2> {
    let (x0, x1) = (min.x.floor() as i64, max.x.ceil() as i64);
    let (y0, y1) = (min.y.floor() as i64, max.y.ceil() as i64);
    (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| Point2::new(x as f64, y as f64)))
}

fn band_cells(run: &StraightRun, normal: &Vector2, lo: f64, hi: f64) -> Vec<Point2> {
    let length = run.length();
    let dir = run.vector() / length;
    let outline = [
        run.start + normal * lo,
        run.start + normal * hi,
        run.end + normal * lo,
        run.end + normal * hi,
    ];
    let (min, max) = bounds(&outline);

    grid(min, max)
        .filter(|p| {
            let d = p - run.start;
            let along = d.dot(&dir);
            let across = d.dot(normal);
            along >= -TOLERANCE
                && along <= length + TOLERANCE
                && in_offset_range(across, lo, hi)
        })
        .collect()
}

fn wedge_cells(corner: &Corner, lo: f64, hi: f64) -> Vec<Point2> {
    let arc = &corner.arc;
    let center = arc.center;
    let side = arc.sweep.signum();
    let outer = arc.radius + lo.abs().max(hi.abs());

    // The far edge of the wedge must clear the outer rim of the annulus.
    let rim = arc.radius * (arc.sweep.abs() * 0.5).cos();
    let extension = WEDGE_EXTENSION.max(outer / rim);
    let a = arc.start + (arc.start - center) * extension;
    let b = arc.end + (arc.end - center) * extension;

    let reach = Vector2::new(outer, outer);
    grid(center - reach, center + reach)
        .filter(|p| {
            let across = side * (arc.radius - (p - center).norm());
            in_offset_range(across, lo, hi) && point_in_triangle(p, &a, &center, &b)
        })
        .collect()
}

fn in_offset_range(offset: f64, lo: f64, hi: f64) -> bool {
    offset >= lo - TOLERANCE && offset < hi - TOLERANCE
}

fn bounds(points: &[Point2]) -> (Point2, Point2) {
    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::math::Point3;
    use crate::operations::{CurveParams, FilletPolyline2D, ThicknessMode};

    fn flat(height: f64) -> ElevationReference {
        let points: Vec<Point2> = (-20..=20)
            .flat_map(|x| (-20..=20).map(move |z| Point2::new(f64::from(x), f64::from(z))))
            .collect();
        let heights = vec![height; points.len()];
        ElevationReference::from_samples(&points, heights).unwrap()
    }

    fn style(width: f64, mode: ThicknessMode) -> SurfaceStyle {
        SurfaceStyle::new(width, mode).unwrap()
    }

    fn planar_set(cells: &[PlacementCell]) -> HashSet<(i64, i64)> {
        cells.iter().map(|c| (c.position.x, c.position.z)).collect()
    }

    #[test]
    fn straight_band_middle() {
        let reference = flat(64.0);
        let cells = ProjectSurface::segment(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            style(3.0, ThicknessMode::Middle),
            &reference,
            Axis::Y,
        )
        .execute()
        .unwrap();

        assert_eq!(cells.len(), 33);
        assert!(cells.iter().all(|c| c.position.y == 64));
        assert!(cells.iter().all(|c| c.material == MaterialSlot::Direct));
        let zs: HashSet<i64> = cells.iter().map(|c| c.position.z).collect();
        assert_eq!(zs, HashSet::from([-1, 0, 1]));
    }

    #[test]
    fn one_sided_bands() {
        let reference = flat(0.0);
        let left = ProjectSurface::segment(
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            style(2.0, ThicknessMode::Left),
            &reference,
            Axis::Y,
        )
        .execute()
        .unwrap();
        let zs: HashSet<i64> = left.iter().map(|c| c.position.z).collect();
        assert_eq!(zs, HashSet::from([0, 1]));

        let right = ProjectSurface::segment(
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            style(2.0, ThicknessMode::Right),
            &reference,
            Axis::Y,
        )
        .execute()
        .unwrap();
        let zs: HashSet<i64> = right.iter().map(|c| c.position.z).collect();
        assert_eq!(zs, HashSet::from([-2, -1]));
    }

    #[test]
    fn corner_fills_only_the_arc_wedge() {
        let polyline = FilletPolyline2D::new(
            vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)],
            CurveParams::default(),
        )
        .execute()
        .unwrap();
        let reference = flat(5.0);
        let cells = ProjectSurface::new(&polyline, style(1.0, ThicknessMode::Middle), &reference, Axis::Y)
            .execute()
            .unwrap();

        let corner: Vec<&PlacementCell> = cells
            .iter()
            .filter(|c| c.material == MaterialSlot::Corner)
            .collect();
        assert!(!corner.is_empty());
        for c in corner {
            let (x, z) = (c.position.x, c.position.z);
            assert!(x >= 5 && z <= 5, "corner cell ({x}, {z}) outside the wedge");
            let rho = Point2::new(x as f64 - 5.0, z as f64 - 5.0).coords.norm();
            assert!(rho > 4.5 - 1e-9 && rho <= 5.5 + 1e-9, "rho {rho}");
        }
        assert!(cells.iter().any(|c| c.material == MaterialSlot::Straight));
    }

    /// Radii of the corner cells around `(5, 5)` or `(5, -5)` for a turn of
    /// width 2 in `mode`.
    fn corner_radii(turn: f64, mode: ThicknessMode) -> Vec<f64> {
        let polyline = FilletPolyline2D::new(
            vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0 * turn)],
            CurveParams::default(),
        )
        .execute()
        .unwrap();
        let corner = &polyline.corners[0];
        assert_relative_eq!(corner.center(), Point2::new(5.0, 5.0 * turn), epsilon = 1e-9);
        assert_relative_eq!(corner.radius(), 5.0, epsilon = 1e-9);

        let reference = flat(0.0);
        let cells = ProjectSurface::new(&polyline, style(2.0, mode), &reference, Axis::Y)
            .execute()
            .unwrap();
        cells
            .iter()
            .filter(|c| c.material == MaterialSlot::Corner)
            .map(|c| (Point2::new(c.position.x as f64, c.position.z as f64) - corner.center()).norm())
            .collect()
    }

    #[test]
    fn one_sided_corners_follow_the_turn() {
        let (r, w, eps) = (5.0, 2.0, 1e-9);
        // Left turn: the left side is inside the arc.
        let inner = corner_radii(1.0, ThicknessMode::Left);
        let outer = corner_radii(1.0, ThicknessMode::Right);
        // Right turn: the left side is outside the arc.
        let right_outer = corner_radii(-1.0, ThicknessMode::Left);
        let right_inner = corner_radii(-1.0, ThicknessMode::Right);

        for radii in [&inner, &outer, &right_outer, &right_inner] {
            assert!(!radii.is_empty());
        }
        for &rho in inner.iter().chain(&right_inner) {
            assert!(rho > r - w + eps && rho <= r + eps, "inner rho {rho}");
        }
        for &rho in outer.iter().chain(&right_outer) {
            assert!(rho >= r - eps && rho <= r + w + eps, "outer rho {rho}");
        }
        assert!(inner.iter().any(|&rho| rho < r - eps));
        assert!(right_outer.iter().any(|&rho| rho > r + eps));
    }

    #[test]
    fn cells_are_unique() {
        let polyline = FilletPolyline2D::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(12.0, 0.0),
                Point2::new(12.0, 12.0),
                Point2::new(24.0, 16.0),
            ],
            CurveParams::default(),
        )
        .execute()
        .unwrap();
        let reference = flat(0.0);
        let cells = ProjectSurface::new(&polyline, style(4.0, ThicknessMode::Middle), &reference, Axis::Y)
            .execute()
            .unwrap();
        assert_eq!(planar_set(&cells).len(), cells.len());
    }

    #[test]
    fn heights_come_from_the_nearest_sample() {
        let points: Vec<Point3> = (0..=10).map(|x| Point3::new(f64::from(x), f64::from(x), 0.0)).collect();
        let reference = ElevationReference::from_points(&points, Axis::Y).unwrap();
        let cells = ProjectSurface::segment(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            style(1.0, ThicknessMode::Middle),
            &reference,
            Axis::Y,
        )
        .execute()
        .unwrap();
        assert_eq!(cells.len(), 11);
        for c in &cells {
            assert_eq!(c.position.y, c.position.x);
        }
    }

    #[test]
    fn vertical_axis_places_height() {
        let reference = flat(7.0);
        let cells = ProjectSurface::segment(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            style(1.0, ThicknessMode::Middle),
            &reference,
            Axis::Z,
        )
        .execute()
        .unwrap();
        assert!(cells.iter().all(|c| c.position.z == 7));
    }

    #[test]
    fn zero_length_segment_is_degenerate() {
        let reference = flat(0.0);
        let p = Point2::new(2.0, 2.0);
        let result = ProjectSurface::segment(p, p, style(2.0, ThicknessMode::Middle), &reference, Axis::Y).execute();
        assert!(matches!(
            result,
            Err(crate::RoadweaveError::Geometry(crate::error::GeometryError::Degenerate(_)))
        ));
    }
}
