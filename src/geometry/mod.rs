mod elevation;
mod polyline;

pub use elevation::ElevationReference;
pub use polyline::{Corner, Polyline, StraightRun};
