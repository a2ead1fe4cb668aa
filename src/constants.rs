//! Global constants for GeoDesk

/// Affine solver constants.
pub mod solver {
    /// Sine of the smallest triangle angle under which three control points are treated as collinear
    pub const DEFAULT_SINGULAR_EPSILON: f64 = 1e-10;
}

/// Zoom constants for the image view.
pub mod zoom {
    /// Scale multiplier for one zoom-in step
    pub const IN_FACTOR: f64 = 1.25;
    /// Scale multiplier for one zoom-out step
    pub const OUT_FACTOR: f64 = 0.8;
    /// Zooming in is allowed while the scale factor is below this
    pub const MAX: f64 = 3.0;
    /// Zooming out is allowed while the scale factor is above this
    pub const MIN: f64 = 0.1;
}

/// Text file constants.
pub mod files {
    /// Extensions of world files, as offered by the load dialog
    pub const WORLD_FILE_EXTENSIONS: &[&str] =
        &["bpw", "gfw", "jgw", "pgw", "pmw", "tfw", "tfwx", "xmw"];
    /// Extension of data sample and reference point files
    pub const DATA_FILE_EXTENSION: &str = "txt";
}
