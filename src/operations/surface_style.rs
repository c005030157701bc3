use crate::error::{GeometryError, Result};

/// How the surface width is placed relative to the centreline.
///
/// Offsets are signed distances along the left normal of the walking
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThicknessMode {
    /// Centred: offsets in `[-width / 2, width / 2)`.
    #[default]
    Middle,
    /// Entirely on the left: offsets in `[0, width)`.
    Left,
    /// Entirely on the right: offsets in `[-width, 0)`.
    Right,
}

/// Width and placement of a road surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    width: f64,
    mode: ThicknessMode,
}

impl SurfaceStyle {
    /// Creates a new surface style.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` is not positive.
    pub fn new(width: f64, mode: ThicknessMode) -> Result<Self> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "width",
                value: width,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        Ok(Self { width, mode })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn mode(&self) -> ThicknessMode {
        self.mode
    }

    /// The half-open range `[lo, hi)` of signed offsets the surface covers.
    #[must_use]
    pub fn offset_range(&self) -> (f64, f64) {
        let w = self.width;
        match self.mode {
            ThicknessMode::Middle => (-w * 0.5, w * 0.5),
            ThicknessMode::Left => (0.0, w),
            ThicknessMode::Right => (-w, 0.0),
        }
    }
}
