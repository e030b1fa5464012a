//! # Error Types: Load and Resolution Failures
//!
//! Two error families exist, and both are hard failures:
//!
//! - [`SchemaLoadError`]: the OpenAPI document is missing, unreadable,
//!   unparseable, or structurally broken. Fatal at startup; there is no
//!   partially usable document.
//! - [`ResolveError`]: a call could not be bound to a declared operation.
//!   These indicate a contract/deployment mismatch rather than bad user data.
//!
//! Payload problems are never represented here. They travel as
//! [`crate::ValidationOutcome`] values.

use std::fmt;

use thiserror::Error;

/// The OpenAPI document could not be turned into a usable schema document.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The document file does not exist.
    #[error("OpenAPI document not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },

    /// The document file exists but could not be read.
    #[error("cannot read OpenAPI document '{path}': {source}")]
    Io {
        /// Path of the document.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document text is not valid JSON/YAML.
    #[error("cannot parse OpenAPI document '{path}': {reason}")]
    Parse {
        /// Path (or `<memory>`) of the document.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The document parsed but reports structural errors.
    #[error("OpenAPI document '{path}' is invalid:\n{}", Problems(.problems))]
    Invalid {
        /// Path (or `<memory>`) of the document.
        path: String,
        /// Every structural problem found, each prefixed by its document pointer.
        problems: Vec<String>,
    },
}

struct Problems<'a>(&'a [String]);

impl fmt::Display for Problems<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {p}")?;
        }
        Ok(())
    }
}

/// A call could not be bound to a declared operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No declared path template matches the request path.
    #[error("path '{path}' not found in OpenAPI document")]
    PathNotFound {
        /// The concrete request path.
        path: String,
    },

    /// The method string is not an HTTP method this document can declare.
    #[error("unsupported HTTP method: {method}")]
    UnsupportedMethod {
        /// The method string as supplied by the caller.
        method: String,
    },

    /// The path template exists but declares no operation for the method.
    #[error("operation {method} not found for path '{template}'")]
    OperationNotFound {
        /// Upper-cased method.
        method: String,
        /// The resolved path template.
        template: String,
    },

    /// The operation bound to method + path carries another identifier.
    #[error("operation id mismatch for {method} '{template}': expected '{expected}', actual '{actual}'")]
    OperationIdMismatch {
        /// Upper-cased method.
        method: String,
        /// The resolved path template.
        template: String,
        /// Identifier the caller expected.
        expected: String,
        /// Identifier declared in the document (empty when absent).
        actual: String,
    },
}
