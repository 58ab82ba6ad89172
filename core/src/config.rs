//! # RESOLVER CONFIGURATION
//!
//! **PURPOSE**: Runtime knobs of the resolution engine, loadable from JSON.

use crate::errors::{error_codes, ResolveError};
use serde::{Deserialize, Serialize};

/// Default bound on the frame stack of one resolve call tree.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// **RESOLVER CONFIGURATION**
///
/// **USAGE**: Handed to a `Container`; every resolve call tree reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// **MAXIMUM DEPTH** - Frames allowed on one call tree before the
    /// resolution is reported as a circular dependency
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolverConfig {
    pub fn from_json(text: &str) -> Result<Self, ResolveError> {
        let config: ResolverConfig = serde_json::from_str(text).map_err(|e| {
            ResolveError::invalid_configuration(
                error_codes::INVALID_CONFIG,
                format!("Invalid resolver configuration: {}", e),
            )
        })?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ResolveError> {
        if self.max_depth == 0 {
            return Err(ResolveError::invalid_configuration(
                error_codes::INVALID_CONFIG,
                "max_depth must be at least 1",
            ));
        }
        Ok(self)
    }
}
