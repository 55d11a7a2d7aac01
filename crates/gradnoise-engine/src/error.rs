//! Error types for the perturbation engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while perturbing scores or waveforms.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid parameter value.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Input carried nothing to process (no notes, no samples).
    #[error("empty input: {what}")]
    EmptyInput {
        /// Description of the empty input.
        what: String,
    },

    /// A ratio was requested whose denominator is exactly zero.
    #[error("numerically degenerate: {message}")]
    NumericDegenerate {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates an invalid argument error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an empty input error.
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyInput { what: what.into() }
    }

    /// Creates a numeric degeneracy error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::NumericDegenerate {
            message: message.into(),
        }
    }

    /// Stable error code, used in batch reports.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidArgument { .. } => "ENGINE_001",
            EngineError::EmptyInput { .. } => "ENGINE_002",
            EngineError::NumericDegenerate { .. } => "ENGINE_003",
            EngineError::Io(_) => "ENGINE_004",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_helper() {
        let err = EngineError::invalid_param("noise_level", "must be within [0, 1]");
        assert!(err.to_string().contains("noise_level"));
        assert!(err.to_string().contains("within [0, 1]"));
        assert_eq!(err.code(), "ENGINE_001");
    }

    #[test]
    fn test_empty_helper() {
        let err = EngineError::empty("score has no notes");
        assert!(err.to_string().contains("score has no notes"));
        assert_eq!(err.code(), "ENGINE_002");
    }

    #[test]
    fn test_degenerate_helper() {
        let err = EngineError::degenerate("noise power is zero");
        assert!(err.to_string().starts_with("numerically degenerate"));
        assert_eq!(err.code(), "ENGINE_003");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        let err: EngineError = io.into();
        assert_eq!(err.code(), "ENGINE_004");
        assert!(err.to_string().contains("missing.wav"));
    }
}
