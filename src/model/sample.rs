//! A value sampled at a georeferenced location.

use serde::{Deserialize, Serialize};

use super::point::{GeoPoint, ImagePoint};

/// One recorded data point: where it was clicked, where that is on the
/// ground, and the value attached to it (e.g. an isobath depth in meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Clicked position in the image
    pub image: ImagePoint,
    /// Georeferenced position of the click
    pub geo: GeoPoint,
    /// Value attached to the position
    pub value: f64,
}

impl Sample {
    /// Create a new sample.
    pub const fn new(image: ImagePoint, geo: GeoPoint, value: f64) -> Self {
        Self { image, geo, value }
    }
}
