//! Error types for geodetic grid computation.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised before a grid is produced.
///
/// Off-disk pixels are never errors; they come back as NaN cells with the
/// mask set.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// An algorithm name, option, step or other configuration token was rejected.
    #[error("invalid configuration value '{token}': expected {accepted}")]
    Configuration { token: String, accepted: String },

    /// A library-backed backend was requested but not compiled in.
    #[error("backend '{backend}' requires the optional '{dependency}' dependency (enable the '{dependency}' cargo feature)")]
    MissingDependency {
        backend: String,
        dependency: String,
    },

    /// Projection parameters failed validation.
    #[error("invalid projection parameters: {0}")]
    InvalidParameters(String),

    /// Latitude and longitude inputs disagree in shape.
    #[error("latitude shape {latitude:?} does not match longitude shape {longitude:?}")]
    ShapeMismatch {
        latitude: (usize, usize),
        longitude: (usize, usize),
    },

    /// The external library failed to initialize the projection.
    #[error("backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    /// A grid source could not provide its inputs.
    #[error("grid source error: {0}")]
    Source(String),
}

impl GridError {
    /// Create a Configuration error.
    pub fn configuration(token: impl Into<String>, accepted: impl Into<String>) -> Self {
        Self::Configuration {
            token: token.into(),
            accepted: accepted.into(),
        }
    }

    /// Create a MissingDependency error.
    pub fn missing_dependency(backend: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            backend: backend.into(),
            dependency: dependency.into(),
        }
    }

    /// Create an InvalidParameters error.
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create a Source error.
    pub fn source_error(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// True for errors the caller may work around by picking another backend.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_names_token() {
        let err = GridError::configuration("bogus", "one of: direct, fast");
        let msg = err.to_string();
        assert!(msg.contains("'bogus'"), "message was {}", msg);
        assert!(msg.contains("direct, fast"));
    }

    #[test]
    fn test_missing_dependency_is_distinguishable() {
        let err = GridError::missing_dependency("proj_inverse", "proj");
        assert!(err.is_missing_dependency());
        assert!(!GridError::invalid_parameters("x").is_missing_dependency());
        assert!(err.to_string().contains("'proj'"));
    }
}
