//! Error types for the simulation core

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by every fallible core operation
pub type LifeResult<T> = Result<T, LifeError>;

/// Failures surfaced by grid construction, editing and persistence.
///
/// None of these abort the session; the caller decides whether to retry,
/// keep the previous state or ignore the failure.
#[derive(Debug, Error)]
pub enum LifeError {
    /// Cell size is zero or does not evenly divide the surface
    #[error("invalid dimensions: {width}x{height} surface with {cell_width}x{cell_height} cells")]
    InvalidDimensions {
        width: u32,
        height: u32,
        cell_width: u32,
        cell_height: u32,
    },

    #[error("invalid cell value {0}, expected 0 or 1")]
    InvalidCellValue(u8),

    #[error("coordinates ({row}, {col}) out of bounds for {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },

    #[error("I/O failure on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed snapshot; `name` identifies the file or buffer being read
    #[error("failed to parse {name}: {message}")]
    ParseError { name: String, message: String },
}

impl LifeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LifeError::InvalidCellValue(2);
        assert_eq!(err.to_string(), "invalid cell value 2, expected 0 or 1");

        let err = LifeError::OutOfBounds { row: -1, col: 4, rows: 3, cols: 3 };
        assert!(err.to_string().contains("(-1, 4)"));

        let err = LifeError::parse("saves/a.txt", "bad header");
        assert!(err.to_string().contains("saves/a.txt"));
        assert!(err.to_string().contains("bad header"));
    }
}
