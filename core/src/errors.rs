use crate::types::BuildKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("RESOLUTION FAILED: {key} - {message}")]
    ResolutionFailed {
        key: BuildKey,
        path: Vec<BuildKey>,
        message: String,
    },

    #[error("INVALID CONFIGURATION: {code} - {message}")]
    InvalidConfiguration { code: String, message: String },

    #[error("CIRCULAR DEPENDENCY: {key} exceeded resolution depth {depth}")]
    CircularDependency {
        key: BuildKey,
        depth: usize,
        path: Vec<BuildKey>,
    },

    #[error("TYPE MISMATCH: {key} is not a {expected}")]
    TypeMismatch { key: BuildKey, expected: String },
}

impl ResolveError {
    pub fn resolution_failed(key: BuildKey, message: impl Into<String>) -> Self {
        ResolveError::ResolutionFailed {
            key,
            path: Vec::new(),
            message: message.into(),
        }
    }

    pub fn invalid_configuration(code: &str, message: impl Into<String>) -> Self {
        ResolveError::InvalidConfiguration {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Fills in the resolution path of a `ResolutionFailed` raised by a
    /// collaborator that had no view of the frame stack. Other variants and
    /// errors that already carry a path are returned untouched.
    pub(crate) fn with_path(self, frames: impl FnOnce() -> Vec<BuildKey>) -> Self {
        match self {
            ResolveError::ResolutionFailed { key, path, message } if path.is_empty() => {
                ResolveError::ResolutionFailed {
                    key,
                    path: frames(),
                    message,
                }
            }
            other => other,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ResolveError::ResolutionFailed { .. } => error_codes::RESOLUTION_FAILED,
            ResolveError::InvalidConfiguration { code, .. } => code,
            ResolveError::CircularDependency { .. } => error_codes::CIRCULAR_DEPENDENCY,
            ResolveError::TypeMismatch { .. } => error_codes::TYPE_MISMATCH,
        }
    }
}

/// **RESOLUTION ERROR CODES**
///
/// **MANDATE**: Use these standardized error codes for consistent error reporting.
pub mod error_codes {
    pub const RESOLUTION_FAILED: &str = "RUST_CORE_RESOLUTION_FAILED";
    pub const CIRCULAR_DEPENDENCY: &str = "RUST_CORE_RESOLUTION_CIRCULAR_DEPENDENCY";
    pub const TYPE_MISMATCH: &str = "RUST_CORE_RESOLUTION_TYPE_MISMATCH";
    pub const OPEN_GENERIC_ELEMENT: &str = "RUST_CORE_CONFIGURATION_OPEN_GENERIC_ELEMENT";
    pub const NOT_A_SEQUENCE: &str = "RUST_CORE_CONFIGURATION_NOT_A_SEQUENCE";
    pub const GENERIC_ARITY: &str = "RUST_CORE_CONFIGURATION_GENERIC_ARITY";
    pub const RESOLVER_UNAVAILABLE: &str = "RUST_CORE_CONFIGURATION_RESOLVER_UNAVAILABLE";
    pub const MISSING_ARGUMENT: &str = "RUST_CORE_CONFIGURATION_MISSING_ARGUMENT";
    pub const INVALID_CONFIG: &str = "RUST_CORE_CONFIGURATION_INVALID_CONFIG";
}
