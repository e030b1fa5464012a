//! # Validate Subcommand
//!
//! Validates one payload against the operation named on the command line:
//! the request body by default, or the response body for `--status`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use oasv_core::ValidationOutcome;

use crate::{load_validator, read_payload, EXIT_INVALID, EXIT_OK};

/// Arguments for the `oasv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// OpenAPI document (JSON or YAML).
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,

    /// Expected operationId of the addressed operation.
    #[arg(long)]
    pub operation: String,

    /// HTTP method of the call.
    #[arg(long)]
    pub method: String,

    /// Concrete request path, e.g. `/Carp/42`.
    #[arg(long)]
    pub path: String,

    /// Validate a response sent with this status instead of the request.
    #[arg(long)]
    pub status: Option<u16>,

    /// Payload file; `-` or absent reads stdin.
    #[arg(value_name = "PAYLOAD")]
    pub payload: Option<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when valid, 1 when the payload has violations.
/// Load and resolution failures are errors.
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<u8> {
    let validator = load_validator(&args.spec, config)?;
    let payload = read_payload(args.payload.as_deref())?;

    let outcome = match args.status {
        Some(status) => validator.validate_response(
            &args.operation,
            &args.method,
            &args.path,
            &payload,
            status,
        ),
        None => validator.validate_request(&args.operation, &args.method, &args.path, &payload),
    }
    .with_context(|| {
        format!(
            "cannot bind {} {} to operation '{}'",
            args.method, args.path, args.operation
        )
    })?;

    let subject = match args.status {
        Some(status) => format!("response {status} of {}", args.operation),
        None => format!("request of {}", args.operation),
    };
    for line in report(&subject, &outcome) {
        println!("{line}");
    }

    Ok(if outcome.is_valid() { EXIT_OK } else { EXIT_INVALID })
}

/// Lines printed for an outcome.
pub fn report(subject: &str, outcome: &ValidationOutcome) -> Vec<String> {
    match outcome {
        ValidationOutcome::Valid => vec![format!("OK: {subject}")],
        ValidationOutcome::Invalid(violations) => {
            let mut lines = vec![format!(
                "FAIL: {subject} ({} violation(s))",
                violations.len()
            )];
            lines.extend(violations.iter().map(|v| format!("  {v}")));
            lines
        }
    }
}
