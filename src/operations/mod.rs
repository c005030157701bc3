mod build_road;
mod extract_network;
mod fillet_polyline;
mod project_surface;
mod render_overlay;
mod surface_style;

pub use build_road::{strip_collinear, BuildRoad, PlacementSink, Road};
pub use extract_network::{ExtractNetwork, ExtractParams, Extraction};
pub use fillet_polyline::FilletPolyline2D;
pub use project_surface::{MaterialSlot, PlacementCell, ProjectSurface};
pub use render_overlay::{Overlay, RenderOverlay};
pub use surface_style::{SurfaceStyle, ThicknessMode};

use crate::error::{GeometryError, Result};
use crate::math::Axis;

/// Largest allowed tangent fraction: arcs on both ends of a segment may
/// each use up to half of it without overlapping.
pub const MAX_TANGENT_FRACTION: f64 = 0.5;

/// Parameters of the corner-fillet curve engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParams {
    spacing: f64,
    max_tangent_fraction: f64,
    radius: Option<f64>,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            max_tangent_fraction: MAX_TANGENT_FRACTION,
            radius: None,
        }
    }
}

impl CurveParams {
    /// Creates curve parameters.
    ///
    /// `spacing` is the maximum distance between consecutive output samples.
    /// `max_tangent_fraction` bounds the distance from a corner to its
    /// tangent points as a fraction of the shorter adjacent segment.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `spacing` is not
    /// positive or `max_tangent_fraction` is outside `(0, 0.5]`.
    pub fn new(spacing: f64, max_tangent_fraction: f64) -> Result<Self> {
        if !(spacing > 0.0 && spacing.is_finite()) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "spacing",
                value: spacing,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        if !(max_tangent_fraction > 0.0 && max_tangent_fraction <= MAX_TANGENT_FRACTION) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "max_tangent_fraction",
                value: max_tangent_fraction,
                min: 0.0,
                max: MAX_TANGENT_FRACTION,
            }
            .into());
        }
        Ok(Self {
            spacing,
            max_tangent_fraction,
            radius: None,
        })
    }

    /// Sets a preferred corner radius. Corners too tight for it fall back to
    /// the largest radius the tangent bound allows.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `radius` is not
    /// positive.
    pub fn with_radius(self, radius: f64) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "radius",
                value: radius,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        Ok(Self {
            radius: Some(radius),
            ..self
        })
    }

    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    #[must_use]
    pub fn max_tangent_fraction(&self) -> f64 {
        self.max_tangent_fraction
    }

    #[must_use]
    pub fn radius(&self) -> Option<f64> {
        self.radius
    }
}

/// Parameters for building one road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadParams {
    pub style: SurfaceStyle,
    pub curve: CurveParams,
    /// The height axis of waypoints and output cells.
    pub vertical: Axis,
}

impl RoadParams {
    /// Road parameters with default curve settings and a `Y`-up world.
    #[must_use]
    pub fn new(style: SurfaceStyle) -> Self {
        Self {
            style,
            curve: CurveParams::default(),
            vertical: Axis::Y,
        }
    }

    #[must_use]
    pub fn with_curve(self, curve: CurveParams) -> Self {
        Self { curve, ..self }
    }

    #[must_use]
    pub fn with_vertical(self, vertical: Axis) -> Self {
        Self { vertical, ..self }
    }
}
