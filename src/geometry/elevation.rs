use spade::{DelaunayTriangulation, HasPosition, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{GeometryError, OperationError, Result};
use crate::math::{Axis, Point2, Point3, TOLERANCE};

/// A reference sample: a planar position and its index in the input order.
#[derive(Debug, Clone, Copy)]
struct Sample {
    position: SpadePoint2<f64>,
    index: usize,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> SpadePoint2<f64> {
        self.position
    }
}

/// Ordered planar samples carrying heights, queried by nearest neighbour.
///
/// Samples sharing a position keep the first one. Among samples at the same
/// distance from a query, the one with the lowest index wins.
#[derive(Debug, Clone)]
pub struct ElevationReference {
    triangulation: DelaunayTriangulation<Sample>,
    heights: Vec<f64>,
}

impl ElevationReference {
    /// Builds a reference from planar `points` and their `heights`.
    ///
    /// # Errors
    ///
    /// - `GeometryError::InsufficientPoints` if `points` is empty
    /// - `OperationError::InvalidInput` if the two slices differ in length or
    ///   a point is not finite
    /// - `OperationError::Failed` if a point cannot be indexed
    pub fn from_samples(points: &[Point2], heights: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(GeometryError::InsufficientPoints {
                required: 1,
                found: 0,
            }
            .into());
        }
        if points.len() != heights.len() {
            return Err(OperationError::InvalidInput(format!(
                "{} points but {} heights",
                points.len(),
                heights.len()
            ))
            .into());
        }

        let mut triangulation = DelaunayTriangulation::<Sample>::new();
        for (index, p) in points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(OperationError::InvalidInput(format!(
                    "sample {index} has non-finite coordinates"
                ))
                .into());
            }
            let position = SpadePoint2::new(p.x, p.y);
            if triangulation.locate_vertex(position).is_some() {
                continue;
            }
            triangulation
                .insert(Sample { position, index })
                .map_err(|e: InsertionError| {
                    OperationError::Failed(format!("elevation index insert: {e}"))
                })?;
        }

        tracing::trace!(
            samples = points.len(),
            indexed = triangulation.num_vertices(),
            "built elevation reference"
        );
        Ok(Self {
            triangulation,
            heights,
        })
    }

    /// Builds a reference from 3D points, splitting each into its planar
    /// projection and its height along `axis`.
    ///
    /// # Errors
    ///
    /// See [`ElevationReference::from_samples`].
    pub fn from_points(points: &[Point3], axis: Axis) -> Result<Self> {
        let planar: Vec<Point2> = points.iter().map(|p| axis.project(p)).collect();
        let heights = points.iter().map(|p| axis.component(p)).collect();
        Self::from_samples(&planar, heights)
    }

    /// Number of samples, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Heights in sample order.
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Index of the sample nearest to `p`.
    #[must_use]
    pub fn nearest_index(&self, p: &Point2) -> Option<usize> {
        let query = SpadePoint2::new(p.x, p.y);
        let nearest = self.triangulation.nearest_neighbor(query)?;
        let best = distance_2(&nearest.position(), &query);

        // Equidistant samples lie on a common empty circle around the query
        // and are reachable from each other through equidistant neighbours.
        let mut index = nearest.data().index;
        let mut stack = vec![nearest];
        let mut seen = vec![nearest.fix()];
        while let Some(vertex) = stack.pop() {
            for edge in vertex.out_edges() {
                let other = edge.to();
                if seen.contains(&other.fix()) {
                    continue;
                }
                seen.push(other.fix());
                if (distance_2(&other.position(), &query) - best).abs() <= TOLERANCE * best.max(1.0) {
                    index = index.min(other.data().index);
                    stack.push(other);
                }
            }
        }
        Some(index)
    }

    /// Height of the sample nearest to `p`.
    #[must_use]
    pub fn height_at(&self, p: &Point2) -> Option<f64> {
        self.nearest_index(p)
            .and_then(|i| self.heights.get(i).copied())
    }
}

fn distance_2(a: &SpadePoint2<f64>, b: &SpadePoint2<f64>) -> f64 {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    dx * dx + dy * dy
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn nearest_height_along_a_line() {
        let points: Vec<Point2> = (0..10).map(|i| Point2::new(f64::from(i), 0.0)).collect();
        let heights = (0..10).map(|i| f64::from(i) * 2.0).collect();
        let reference = ElevationReference::from_samples(&points, heights).unwrap();

        assert_eq!(reference.len(), 10);
        assert_eq!(reference.nearest_index(&Point2::new(3.2, 5.0)), Some(3));
        assert_eq!(reference.height_at(&Point2::new(6.9, -1.0)), Some(14.0));
        assert_eq!(reference.height_at(&Point2::new(-50.0, 0.0)), Some(0.0));
    }

    #[test]
    fn ties_keep_the_earliest_sample() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, -1.0),
        ];
        let reference = ElevationReference::from_samples(&points, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        // (1, 0) is at distance 1 from all four samples.
        assert_eq!(reference.nearest_index(&Point2::new(1.0, 0.0)), Some(0));
        assert_eq!(reference.nearest_index(&Point2::new(1.5, 0.0)), Some(1));
    }

    #[test]
    fn duplicate_positions_keep_the_first() {
        let points = [Point2::new(1.0, 1.0), Point2::new(1.0, 1.0), Point2::new(5.0, 5.0)];
        let reference = ElevationReference::from_samples(&points, vec![7.0, 9.0, 0.0]).unwrap();
        assert_eq!(reference.height_at(&Point2::new(1.2, 0.9)), Some(7.0));
    }

    #[test]
    fn from_points_splits_height() {
        let points = [Point3::new(0.0, 64.0, 0.0), Point3::new(10.0, 70.0, 0.0)];
        let reference = ElevationReference::from_points(&points, Axis::Y).unwrap();
        assert_eq!(reference.height_at(&Point2::new(9.0, 0.0)), Some(70.0));
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert!(ElevationReference::from_samples(&[], Vec::new()).is_err());
        assert!(ElevationReference::from_samples(&[Point2::origin()], vec![1.0, 2.0]).is_err());
        assert!(ElevationReference::from_samples(&[Point2::new(f64::NAN, 0.0)], vec![1.0]).is_err());
    }
}
