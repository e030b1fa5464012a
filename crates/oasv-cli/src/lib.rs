//! # oasv-cli: Command-Line Contract Checks
//!
//! Provides the `oasv` command-line interface over `oasv-schema`.
//!
//! ## Subcommands
//!
//! - `oasv check <SPEC>`: load a document and print its summary.
//! - `oasv routes <SPEC>`: list every declared operation.
//! - `oasv validate <SPEC> ...`: validate a request or response payload.
//!
//! ```bash
//! oasv check specs/fish.openapi.yaml
//! oasv validate specs/fish.openapi.yaml --operation createCarp \
//!     --method POST --path /Carp carp.json
//! curl -s localhost:8080/list | oasv validate specs/fish.openapi.yaml \
//!     --operation getFishLists --method GET --path /list --status 200 -
//! ```
//!
//! ## Exit Codes
//!
//! `0` valid, `1` invalid payload, `2` operational error (unreadable
//! document, unknown operation, unreadable payload).

pub mod check;
pub mod routes;
pub mod validate;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use oasv_schema::{OpenApiValidator, ValidatorOptions};

/// Exit code for a conforming payload or a successful command.
pub const EXIT_OK: u8 = 0;
/// Exit code for a payload with violations.
pub const EXIT_INVALID: u8 = 1;
/// Exit code for operational failures.
pub const EXIT_ERROR: u8 = 2;

/// Load `spec` with options from `config` (defaults when absent).
pub fn load_validator(spec: &Path, config: Option<&Path>) -> Result<OpenApiValidator> {
    let options = match config {
        Some(path) => ValidatorOptions::from_yaml_file(path)
            .with_context(|| format!("failed to load validator options from {}", path.display()))?,
        None => ValidatorOptions::default(),
    };

    let validator = OpenApiValidator::from_file(spec)
        .with_context(|| format!("failed to load OpenAPI document {}", spec.display()))?;

    Ok(validator.with_options(options))
}

/// Read a payload from a file, or from stdin when `source` is `-` or absent.
pub fn read_payload(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display())),
        _ => {
            let mut payload = String::new();
            std::io::stdin()
                .read_to_string(&mut payload)
                .context("failed to read payload from stdin")?;
            Ok(payload)
        }
    }
}
