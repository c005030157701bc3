pub mod arc_2d;
pub mod polygon_2d;
pub mod segment;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Integer grid position (pixel, voxel or placed block).
pub type Voxel = nalgebra::Point3<i64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// The vertical direction of the world.
pub const UP: Vector3 = Vector3::new(0.0, 1.0, 0.0);

/// A world axis, used to move between 3D points and their planar projection.
///
/// Projecting drops the axis and keeps the two remaining components in
/// `x, y, z` order; unprojecting inserts a value back at the axis position.
/// With the default vertical axis `Y`, the planar frame is `(x, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    /// Drops this axis from `p`.
    #[must_use]
    pub fn project(self, p: &Point3) -> Point2 {
        match self {
            Self::X => Point2::new(p.y, p.z),
            Self::Y => Point2::new(p.x, p.z),
            Self::Z => Point2::new(p.x, p.y),
        }
    }

    /// Inserts `value` at this axis position of the planar point `p`.
    #[must_use]
    pub fn unproject(self, p: &Point2, value: f64) -> Point3 {
        match self {
            Self::X => Point3::new(value, p.x, p.y),
            Self::Y => Point3::new(p.x, value, p.y),
            Self::Z => Point3::new(p.x, p.y, value),
        }
    }

    /// Returns the component of `p` along this axis.
    #[must_use]
    pub fn component(self, p: &Point3) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
            Self::Z => p.z,
        }
    }
}

/// Converts a grid position to a floating-point point.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn voxel_to_point(v: &Voxel) -> Point3 {
    Point3::new(v.x as f64, v.y as f64, v.z as f64)
}

/// Rounds a point to the nearest grid position.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn point_to_voxel(p: &Point3) -> Voxel {
    Voxel::new(p.x.round() as i64, p.y.round() as i64, p.z.round() as i64)
}
