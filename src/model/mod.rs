//! Data models for GeoDesk.

mod point;
mod sample;

pub use point::{ControlPoint, GeoPoint, ImagePoint, LAT_RANGE, LON_RANGE};
pub use sample::Sample;
