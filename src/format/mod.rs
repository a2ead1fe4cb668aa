//! Text file formats read and written by GeoDesk.
//!
//! ## Supported Formats
//!
//! - **World file**: six affine coefficients, the ESRI sidecar convention
//! - **Data file**: `imageX imageY lon lat value` per sampled point
//! - **Reference point file**: `imageX imageY lon lat` per control point
//!
//! All writes are all-or-nothing: a failed save leaves the previous file
//! untouched.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geodesk::format::{load_world_file, save_world_file, world_file_path};
//!
//! let world = world_file_path("scan.png").unwrap();
//! let transform = load_world_file(&world)?;
//! save_world_file("copy.pgw", &transform)?;
//! ```

mod error;
mod io;
mod reference_points;
mod samples;
mod text;
mod world_file;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use reference_points::{
    load_reference_points, parse_reference_points, save_reference_points,
    to_reference_points_string,
};
pub use samples::{SampleBuffer, load_samples, parse_samples, save_samples};
pub use world_file::{
    is_world_file_name, load_world_file, parse_world_file, read_world_file, save_world_file,
    save_world_file_with_precision, to_world_string, world_file_path, write_world_file,
};
