//! # Routes Subcommand
//!
//! Lists every declared operation as `METHOD template operationId`, in
//! document order.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use oasv_schema::SchemaDocument;

use crate::{load_validator, EXIT_OK};

/// Arguments for the `oasv routes` subcommand.
#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// OpenAPI document (JSON or YAML).
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,
}

/// Execute the routes subcommand.
pub fn run_routes(args: &RoutesArgs, config: Option<&Path>) -> Result<u8> {
    let validator = load_validator(&args.spec, config)?;
    for line in route_lines(validator.document()) {
        println!("{line}");
    }
    Ok(EXIT_OK)
}

/// One line per operation.
pub fn route_lines(document: &SchemaDocument) -> Vec<String> {
    document
        .paths()
        .flat_map(|(template, item)| {
            item.operations.iter().map(move |(method, op)| {
                format!(
                    "{:<7} {} {}",
                    method.to_string(),
                    template,
                    op.operation_id.as_deref().unwrap_or("-")
                )
            })
        })
        .collect()
}
