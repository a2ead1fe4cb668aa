//! Error types for world file and data file operations.

use thiserror::Error;

/// Errors that can occur while reading or writing GeoDesk text files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The world file holds fewer than six numbers
    #[error("World file needs 6 coefficients, found {found}")]
    MissingCoefficients {
        /// Number of tokens read before the input ran out
        found: usize,
    },

    /// A world file token is not a decimal number
    #[error("World file coefficient {index} is not a number: '{token}'")]
    InvalidNumber {
        /// Zero-based position of the coefficient
        index: usize,
        /// The offending text
        token: String,
    },

    /// A line of a data or reference point file is malformed
    #[error("Invalid line {line}: {message}")]
    InvalidLine {
        /// One-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },
}

impl FormatError {
    /// Create an invalid number error.
    pub fn invalid_number(index: usize, token: impl Into<String>) -> Self {
        Self::InvalidNumber {
            index,
            token: token.into(),
        }
    }

    /// Create an invalid line error.
    pub fn invalid_line(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidLine {
            line,
            message: message.into(),
        }
    }
}
