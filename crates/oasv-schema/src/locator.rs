//! # Operation Locator
//!
//! Binds a call (method + concrete path, optionally an operation id) to the
//! declared [`Operation`], and picks the response schema for a status code.

use oasv_core::ResolveError;

use crate::document::{HttpMethod, Operation, SchemaDocument, SchemaId};
use crate::resolver;

/// An operation bound to the template that served the request path.
#[derive(Debug, Clone, Copy)]
pub struct LocatedOperation<'d> {
    pub template: &'d str,
    pub method: HttpMethod,
    pub operation: &'d Operation,
}

/// Locate the operation serving `method` on `request_path`.
///
/// The path is resolved before the method is parsed, so an unknown path is
/// reported as `PathNotFound` whatever the method string is.
pub fn locate<'d>(
    document: &'d SchemaDocument,
    method: &str,
    request_path: &str,
) -> Result<LocatedOperation<'d>, ResolveError> {
    let template = resolver::resolve(document, request_path).ok_or_else(|| {
        ResolveError::PathNotFound {
            path: request_path.to_string(),
        }
    })?;
    let method: HttpMethod = method.parse()?;

    let operation = document
        .path_item(template)
        .and_then(|item| item.operation(method))
        .ok_or_else(|| ResolveError::OperationNotFound {
            method: method.to_string(),
            template: template.to_string(),
        })?;

    Ok(LocatedOperation {
        template,
        method,
        operation,
    })
}

/// Locate the operation and check that it carries `operation_id`.
///
/// An operation without a declared id never matches.
pub fn find_operation<'d>(
    document: &'d SchemaDocument,
    operation_id: &str,
    method: &str,
    request_path: &str,
) -> Result<LocatedOperation<'d>, ResolveError> {
    let located = locate(document, method, request_path)?;

    match located.operation.operation_id.as_deref() {
        Some(actual) if actual == operation_id => Ok(located),
        actual => Err(ResolveError::OperationIdMismatch {
            method: located.method.to_string(),
            template: located.template.to_string(),
            expected: operation_id.to_string(),
            actual: actual.unwrap_or("<none>").to_string(),
        }),
    }
}

/// Response body schema for `status`.
///
/// Lookup order is the exact code, then its range key (`2XX`), then
/// `default`. `None` when no key applies or the chosen response has no JSON
/// content.
pub fn find_response_schema(operation: &Operation, status: u16) -> Option<SchemaId> {
    let exact = status.to_string();
    let range = format!("{}XX", status / 100);

    let key = operation
        .responses
        .keys()
        .find(|k| **k == exact)
        .or_else(|| {
            operation
                .responses
                .keys()
                .find(|k| k.eq_ignore_ascii_case(&range))
        })
        .or_else(|| operation.responses.keys().find(|k| *k == "default"));

    match key {
        Some(key) => operation.responses.get(key).copied().flatten(),
        None => {
            tracing::debug!(status, "no response declared for status code");
            None
        }
    }
}
