//! # Check Subcommand
//!
//! Loads a document and prints what was found. Any load problem is an
//! operational error, reported with every problem the loader collected.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use oasv_schema::SchemaDocument;

use crate::{load_validator, EXIT_OK};

/// Arguments for the `oasv check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// OpenAPI document (JSON or YAML).
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, config: Option<&Path>) -> Result<u8> {
    let validator = load_validator(&args.spec, config)?;
    println!("OK: {}", args.spec.display());
    for line in summary(validator.document()) {
        println!("  {line}");
    }
    Ok(EXIT_OK)
}

/// Human-readable summary lines for a loaded document.
pub fn summary(document: &SchemaDocument) -> Vec<String> {
    vec![
        format!("title:      {}", document.title().unwrap_or("(untitled)")),
        format!("version:    {}", document.version().unwrap_or("(unversioned)")),
        format!("openapi:    {}", document.openapi_version()),
        format!("paths:      {}", document.path_count()),
        format!("operations: {}", document.operation_count()),
        format!("components: {}", document.component_names().count()),
    ]
}
