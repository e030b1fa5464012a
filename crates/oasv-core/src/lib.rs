//! # oasv-core: Foundational Types for Contract Validation
//!
//! The leaf crate of the oasv workspace. It defines the vocabulary every
//! other crate speaks when a JSON payload is checked against an OpenAPI
//! document:
//!
//! - [`ValidationOutcome`] and [`SchemaViolation`]: the result of checking a
//!   value against a schema node. Structural failures are always data, never
//!   an `Err`.
//! - [`InstancePath`]: the locator of an offending value inside the payload
//!   (`carps[2].weight`).
//! - [`SchemaLoadError`] and [`ResolveError`]: hard failures, where the document
//!   could not be loaded, or a call could not be bound to an operation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oasv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod outcome;
pub mod path;

pub use error::{ResolveError, SchemaLoadError};
pub use outcome::{SchemaViolation, ValidationOutcome, ViolationKind};
pub use path::{InstancePath, PathSegment};
