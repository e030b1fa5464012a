//! # Contract State
//!
//! Configuration and shared state for the contract middleware.
//!
//! ## Environment
//!
//! | Variable                  | Default   | Meaning                              |
//! |---------------------------|-----------|--------------------------------------|
//! | `OASV_SPEC_PATH`          | (none)    | OpenAPI document to enforce          |
//! | `OASV_VALIDATE_RESPONSES` | `true`    | Also check handler response bodies   |
//! | `OASV_MAX_BODY_BYTES`     | `2097152` | Largest request body buffered        |

use std::path::PathBuf;

use oasv_core::SchemaLoadError;
use oasv_schema::{OpenApiValidator, ValidatorOptions};
use thiserror::Error;

/// Default limit for buffered request bodies (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Middleware configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Document to load when the state is built from configuration.
    pub spec_path: Option<PathBuf>,
    /// Check response bodies as well as request bodies.
    pub validate_responses: bool,
    /// Request bodies larger than this are rejected with 413.
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spec_path: None,
            validate_responses: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unparseable values fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            spec_path: lookup("OASV_SPEC_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            validate_responses: lookup("OASV_VALIDATE_RESPONSES")
                .map(|v| parse_flag(&v, defaults.validate_responses))
                .unwrap_or(defaults.validate_responses),
            max_body_bytes: lookup("OASV_MAX_BODY_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        }
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Failure building [`ContractState`] from configuration.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("OASV_SPEC_PATH is not set")]
    MissingSpecPath,

    #[error(transparent)]
    Load(#[from] SchemaLoadError),
}

/// State shared by every invocation of the contract middleware.
#[derive(Debug, Clone)]
pub struct ContractState {
    pub validator: OpenApiValidator,
    pub config: AppConfig,
}

impl ContractState {
    pub fn new(validator: OpenApiValidator, config: AppConfig) -> Self {
        Self { validator, config }
    }

    /// Load the document named by `config.spec_path`.
    pub fn load(config: AppConfig, options: ValidatorOptions) -> Result<Self, StartupError> {
        let path = config
            .spec_path
            .as_ref()
            .ok_or(StartupError::MissingSpecPath)?;
        let validator = OpenApiValidator::from_file(path)?.with_options(options);

        tracing::info!(
            spec = %path.display(),
            validate_responses = config.validate_responses,
            max_body_bytes = config.max_body_bytes,
            "contract enforcement configured"
        );

        Ok(Self::new(validator, config))
    }
}
