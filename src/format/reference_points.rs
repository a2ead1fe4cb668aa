//! Reference point files.
//!
//! Lists the control points used to georeference an image, one per line:
//!
//! ```text
//! imageX imageY lon lat
//! ```

use std::path::Path;

use super::error::FormatError;
use super::io::write_atomic;
use super::text::{format_decimal, numbered_lines, parse_fields};
use crate::model::{ControlPoint, GeoPoint, ImagePoint};

/// Render control points as reference point file text.
pub fn to_reference_points_string(points: &[ControlPoint], precision: Option<usize>) -> String {
    let mut text = String::new();
    for p in points {
        let fields = [p.image.x(), p.image.y(), p.geo.lon(), p.geo.lat()];
        let line = fields
            .iter()
            .map(|v| format_decimal(*v, precision))
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&line);
        text.push('\n');
    }
    text
}

/// Parse reference point file text, skipping blank lines.
pub fn parse_reference_points(text: &str) -> Result<Vec<ControlPoint>, FormatError> {
    numbered_lines(text)
        .map(|(line_number, line)| {
            let [x, y, lon, lat] = parse_fields::<4>(line, line_number)?;
            Ok(ControlPoint::new(
                ImagePoint::new(x, y),
                GeoPoint::new(lon, lat),
            ))
        })
        .collect()
}

/// Load control points from a reference point file.
pub fn load_reference_points(path: impl AsRef<Path>) -> Result<Vec<ControlPoint>, FormatError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let points = parse_reference_points(&text)?;
    log::info!("Loaded {} reference points from {:?}", points.len(), path);
    Ok(points)
}

/// Save control points to a reference point file.
pub fn save_reference_points(
    path: impl AsRef<Path>,
    points: &[ControlPoint],
    precision: Option<usize>,
) -> Result<(), FormatError> {
    let path = path.as_ref();
    write_atomic(path, &to_reference_points_string(points, precision))?;
    log::info!("Saved {} reference points to {:?}", points.len(), path);
    Ok(())
}
