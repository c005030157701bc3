pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod raster;
pub mod topology;

pub use error::{Result, RoadweaveError};
