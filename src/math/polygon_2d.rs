use super::{Point2, TOLERANCE};

/// Z component of `(a - o) x (b - o)`.
///
/// Positive when `o -> a -> b` turns counter-clockwise.
#[must_use]
pub fn cross_2d(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Exact collinearity test.
///
/// Intended for integer-valued coordinates (grid waypoints) where the
/// cross product is computed without rounding.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn collinear(a: &Point2, b: &Point2, c: &Point2) -> bool {
    cross_2d(a, b, c) == 0.0
}

/// Point-in-triangle containment, boundary inclusive.
///
/// Works for both windings. A degenerate triangle contains nothing.
#[must_use]
pub fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let area = cross_2d(a, b, c);
    if area.abs() < TOLERANCE {
        return false;
    }
    let d1 = cross_2d(a, b, p) * area.signum();
    let d2 = cross_2d(b, c, p) * area.signum();
    let d3 = cross_2d(c, a, p) * area.signum();
    let eps = -TOLERANCE * area.abs().max(1.0);
    d1 >= eps && d2 >= eps && d3 >= eps
}

/// Indices of the points kept after removing collinear interior points.
///
/// Each pass drops every interior point that is exactly collinear with its
/// two neighbours in that pass's input. Passes repeat until nothing changes,
/// so applying the result again keeps every point.
#[must_use]
pub fn non_collinear_indices(points: &[Point2]) -> Vec<usize> {
    let mut kept: Vec<usize> = (0..points.len()).collect();
    loop {
        if kept.len() < 3 {
            return kept;
        }
        let mut next = Vec::with_capacity(kept.len());
        next.push(kept[0]);
        for w in kept.windows(3) {
            if !collinear(&points[w[0]], &points[w[1]], &points[w[2]]) {
                next.push(w[1]);
            }
        }
        next.push(kept[kept.len() - 1]);
        if next.len() == kept.len() {
            return next;
        }
        kept = next;
    }
}
