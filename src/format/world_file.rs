//! ESRI world file codec.
//!
//! A world file is a plain text sidecar holding the six affine coefficients,
//! one per line:
//!
//! ```text
//! a00   x-scale (longitude per pixel)
//! a10   rotation term
//! a01   rotation term
//! a11   y-scale (latitude per pixel, usually negative)
//! a02   longitude of pixel (0, 0)
//! a12   latitude of pixel (0, 0)
//! ```
//!
//! The reader accepts any whitespace between the numbers (blank lines
//! included) and ignores whatever follows the sixth one.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::error::FormatError;
use super::io::write_atomic;
use super::text::format_decimal;
use crate::constants::files::WORLD_FILE_EXTENSIONS;
use crate::transform::{AffineTransform, COEFFICIENT_COUNT};

/// Render a transform as world file text.
pub fn to_world_string(transform: &AffineTransform, precision: Option<usize>) -> String {
    let mut text = String::new();
    for c in transform.coefficients() {
        text.push_str(&format_decimal(c, precision));
        text.push('\n');
    }
    text
}

/// Write a transform as world file text to any writer.
pub fn write_world_file<W: Write>(
    writer: &mut W,
    transform: &AffineTransform,
    precision: Option<usize>,
) -> Result<(), FormatError> {
    writer.write_all(to_world_string(transform, precision).as_bytes())?;
    Ok(())
}

/// Parse world file text.
pub fn parse_world_file(text: &str) -> Result<AffineTransform, FormatError> {
    let mut coefficients = [0.0; COEFFICIENT_COUNT];
    let mut tokens = text.split_whitespace();

    for (index, coefficient) in coefficients.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or(FormatError::MissingCoefficients { found: index })?;
        *coefficient = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FormatError::invalid_number(index, token))?;
    }

    Ok(AffineTransform::from_coefficients(coefficients))
}

/// Read world file text from any reader.
pub fn read_world_file<R: Read>(reader: &mut R) -> Result<AffineTransform, FormatError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_world_file(&text)
}

/// Load a transform from a world file on disk.
pub fn load_world_file(path: impl AsRef<Path>) -> Result<AffineTransform, FormatError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let transform = parse_world_file(&text)?;
    log::info!("Loaded world file {:?}", path);
    Ok(transform)
}

/// Save a transform to a world file, printing the shortest exact decimals.
///
/// An existing file is replaced without asking; confirming the overwrite is
/// up to the caller.
pub fn save_world_file(
    path: impl AsRef<Path>,
    transform: &AffineTransform,
) -> Result<(), FormatError> {
    save_world_file_with_precision(path, transform, None)
}

/// Save a transform to a world file with a fixed number of fractional digits.
pub fn save_world_file_with_precision(
    path: impl AsRef<Path>,
    transform: &AffineTransform,
    precision: Option<usize>,
) -> Result<(), FormatError> {
    let path = path.as_ref();
    write_atomic(path, &to_world_string(transform, precision))?;
    log::info!("Saved world file {:?}", path);
    Ok(())
}

/// Sidecar world file path for an image.
///
/// The extension is the first and last letters of the image extension
/// followed by `w`: `map.png` → `map.pgw`, `scan.tiff` → `scan.tfw`.
/// Returns `None` when the image path has no usable extension.
pub fn world_file_path(image_path: impl AsRef<Path>) -> Option<PathBuf> {
    let image_path = image_path.as_ref();
    let extension = image_path.extension()?.to_str()?;
    let first = extension.chars().next()?;
    let last = extension.chars().next_back()?;
    Some(image_path.with_extension(format!("{}{}w", first, last)))
}

/// Whether `path` has one of the common world file extensions.
pub fn is_world_file_name(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORLD_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
