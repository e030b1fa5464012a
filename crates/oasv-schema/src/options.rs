//! # Validator Options
//!
//! Tunables for the validation engine. Loadable from a YAML file so the
//! CLI and services can share one configuration:
//!
//! ```yaml
//! max_depth: 32
//! default_discriminator: typeName
//! one_of_fallback: false
//! ```
//!
//! Every key is optional; absent keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on schema nesting during one validation.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Discriminator property read when a `oneOf` schema names none.
pub const DEFAULT_DISCRIMINATOR: &str = "typeName";

/// Error loading an options file.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// The file could not be read.
    #[error("cannot read validator options '{path}': {source}")]
    Io {
        /// Options file path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid options document.
    #[error("invalid validator options '{path}': {source}")]
    Parse {
        /// Options file path.
        path: String,
        /// YAML diagnostic.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Maximum schema nesting before `RecursionLimit` is reported.
    pub max_depth: usize,
    /// Discriminator property used when a `oneOf` declares none.
    pub default_discriminator: String,
    /// When the discriminator property is missing, try every `oneOf`
    /// branch in order and accept the first that produces no violations.
    pub one_of_fallback: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_discriminator: DEFAULT_DISCRIMINATOR.to_string(),
            one_of_fallback: false,
        }
    }
}

impl ValidatorOptions {
    /// Load options from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| OptionsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse options from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ValidatorOptions::default();
        assert_eq!(opts.max_depth, 64);
        assert_eq!(opts.default_discriminator, "typeName");
        assert!(!opts.one_of_fallback);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let opts = ValidatorOptions::from_yaml_str("one_of_fallback: true\n").unwrap();
        assert!(opts.one_of_fallback);
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(ValidatorOptions::from_yaml_str("max_dept: 3\n").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ValidatorOptions::from_yaml_file("/nonexistent/oasv.yaml").unwrap_err();
        assert!(matches!(err, OptionsError::Io { .. }));
    }
}
