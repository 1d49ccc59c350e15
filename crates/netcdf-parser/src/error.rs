//! Error types for NetCDF field extraction.

use geodetic_grid::GridError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing required variable, attribute or dimension
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// A field was present but held the wrong kind of value
    #[error("Field '{field}' expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Extracted values were rejected by the grid engine
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl NetCdfError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingData(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

/// Grid sources report failures through the engine's error type.
impl From<NetCdfError> for GridError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::Grid(inner) => inner,
            other => GridError::source_error(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_keep_message() {
        let err: GridError = NetCdfError::missing("variable x").into();
        assert_eq!(err, GridError::source_error("Missing required data: variable x"));
    }

    #[test]
    fn test_grid_errors_pass_through() {
        let inner = GridError::configuration("z", "one of: x, y");
        let err: GridError = NetCdfError::from(inner.clone()).into();
        assert_eq!(err, inner);
    }
}
