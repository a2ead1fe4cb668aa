//! Georeferenced data sample files.
//!
//! One sample per line, space-separated, no header:
//!
//! ```text
//! imageX imageY lon lat value
//! ```

use std::path::Path;

use super::error::FormatError;
use super::io::write_atomic;
use super::text::{format_decimal, numbered_lines, parse_fields};
use crate::model::{GeoPoint, ImagePoint, Sample};

/// Growing text buffer of recorded samples.
///
/// Samples are rendered to text as they are recorded so the buffer can be
/// written out verbatim, and an existing data file can be loaded and
/// appended to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    text: String,
    lines: usize,
    precision: Option<usize>,
}

impl SampleBuffer {
    /// Create an empty buffer printing shortest exact decimals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many fractional digits new samples are printed with.
    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    /// Fractional digits used for new samples, `None` for shortest exact.
    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    /// Start from the contents of an existing data file.
    ///
    /// The text is kept as is; a missing final newline is added so the next
    /// sample starts on its own line.
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        let lines = numbered_lines(&text).count();
        Self {
            text,
            lines,
            precision: None,
        }
    }

    /// Append one sample as a new line.
    pub fn push(&mut self, sample: &Sample) {
        let fields = [
            sample.image.x(),
            sample.image.y(),
            sample.geo.lon(),
            sample.geo.lat(),
            sample.value,
        ];
        let line = fields
            .iter()
            .map(|v| format_decimal(*v, self.precision))
            .collect::<Vec<_>>()
            .join(" ");
        self.text.push_str(&line);
        self.text.push('\n');
        self.lines += 1;
    }

    /// The buffer contents, ready to be written to a file.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of non-blank lines in the buffer.
    pub fn len(&self) -> usize {
        self.lines
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.text.clear();
        self.lines = 0;
    }

    /// Parse the buffer back into samples.
    pub fn samples(&self) -> Result<Vec<Sample>, FormatError> {
        parse_samples(&self.text)
    }
}

/// Parse data file text into samples, skipping blank lines.
pub fn parse_samples(text: &str) -> Result<Vec<Sample>, FormatError> {
    numbered_lines(text)
        .map(|(line_number, line)| {
            let [x, y, lon, lat, value] = parse_fields::<5>(line, line_number)?;
            Ok(Sample::new(
                ImagePoint::new(x, y),
                GeoPoint::new(lon, lat),
                value,
            ))
        })
        .collect()
}

/// Load a data file into a buffer that new samples can be appended to.
///
/// The file is validated line by line before the buffer is built.
pub fn load_samples(path: impl AsRef<Path>) -> Result<SampleBuffer, FormatError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let samples = parse_samples(&text)?;
    log::info!("Loaded {} samples from {:?}", samples.len(), path);
    Ok(SampleBuffer::from_text(text))
}

/// Write the buffer verbatim to a data file.
pub fn save_samples(path: impl AsRef<Path>, buffer: &SampleBuffer) -> Result<(), FormatError> {
    let path = path.as_ref();
    write_atomic(path, buffer.as_str())?;
    log::info!("Saved {} samples to {:?}", buffer.len(), path);
    Ok(())
}
