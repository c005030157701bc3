use thiserror::Error;

use crate::topology::NodeId;

/// Top-level error type for road network extraction and surface synthesis.
#[derive(Debug, Error)]
pub enum RoadweaveError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("at least {required} points are required, got {found}")]
    InsufficientPoints { required: usize, found: usize },
}

/// Errors related to skeleton topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("skeleton has no foreground pixels")]
    EmptyTopology,

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid raster: {0}")]
    InvalidRaster(String),
}

/// Errors related to road building operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`RoadweaveError`].
pub type Result<T> = std::result::Result<T, RoadweaveError>;
