//! # oasv-schema
//!
//! Checks JSON payloads against the request and response bodies an OpenAPI
//! document declares.
//!
//! ## Flow
//!
//! ```text
//! loader::load ──▶ SchemaDocument (arena of SchemaNode)
//!                        │
//! (method, path) ─▶ resolver::resolve ─▶ locator::find_operation
//!                        │
//! payload ───────▶ engine::SchemaValidator ─▶ ValidationOutcome
//! ```
//!
//! [`OpenApiValidator`] wraps the whole flow for callers that only have an
//! operation id, a method, a path and a payload.
//!
//! ## Supported Schema Subset
//!
//! `type` (including `nullable` and `[<type>, "null"]`), `properties`,
//! `required`, `items`, `minLength`/`maxLength`, `minimum`/`maximum`,
//! `enum`, `allOf`, `oneOf` with `discriminator`, and local
//! `#/components/...` references. `anyOf` and `not` are ignored with a
//! warning at load time; `format`, `pattern` and `additionalProperties` are
//! not enforced.

pub mod document;
pub mod engine;
pub mod loader;
pub mod locator;
pub mod options;
pub mod resolver;
pub mod validate;

pub use document::{
    HttpMethod, Operation, PathItem, SchemaDocument, SchemaId, SchemaKind, SchemaNode,
};
pub use engine::SchemaValidator;
pub use loader::{load, load_str, load_value, DocumentFormat};
pub use locator::{find_operation, find_response_schema, locate, LocatedOperation};
pub use options::{OptionsError, ValidatorOptions};
pub use resolver::resolve;
pub use validate::OpenApiValidator;
