//! Coordinate value types.
//!
//! Image-pixel space and geographic space get distinct types so a pixel
//! position can never be handed to code expecting longitude/latitude.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Valid longitude range in decimal degrees.
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

/// Valid latitude range in decimal degrees.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// A position in the original (unscaled) image, in pixels.
///
/// The origin is the top-left corner of the image, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    x: f64,
    y: f64,
}

impl ImagePoint {
    /// Create a new image point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Abscissa in pixels.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Ordinate in pixels.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether the point lies inside an image of the given size.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x < width && self.y < height
    }
}

impl From<(f64, f64)> for ImagePoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for ImagePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}) px", self.x, self.y)
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    ///
    /// No range check is performed, see [`GeoPoint::is_in_range`].
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Longitude in decimal degrees east.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in decimal degrees north.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Whether longitude and latitude lie in their valid ranges.
    pub fn is_in_range(&self) -> bool {
        (LON_RANGE.0..=LON_RANGE.1).contains(&self.lon)
            && (LAT_RANGE.0..=LAT_RANGE.1).contains(&self.lat)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}° E, {}° N", self.lon, self.lat)
    }
}

/// One correspondence between an image pixel and a geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Where the point was clicked in the image
    pub image: ImagePoint,
    /// Known geographic position of that pixel
    pub geo: GeoPoint,
}

impl ControlPoint {
    /// Create a new control point.
    pub const fn new(image: ImagePoint, geo: GeoPoint) -> Self {
        Self { image, geo }
    }
}
