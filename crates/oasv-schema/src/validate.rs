//! # Validator Facade
//!
//! [`OpenApiValidator`] ties loader, locator and engine together behind the
//! two calls a service makes: check an inbound request payload and check an
//! outbound response payload for a named operation.
//!
//! Resolution failures (unknown path, method or operation id) are returned
//! as `Err`; payload problems are always an `Ok(ValidationOutcome)`.

use std::path::Path;
use std::sync::Arc;

use oasv_core::{
    InstancePath, ResolveError, SchemaLoadError, SchemaViolation, ValidationOutcome, ViolationKind,
};
use serde_json::Value;

use crate::document::{Operation, SchemaDocument, SchemaId};
use crate::engine::SchemaValidator;
use crate::loader;
use crate::locator::{self, LocatedOperation};
use crate::options::ValidatorOptions;

/// Validates payloads against one loaded document.
///
/// Cheap to clone; clones share the document.
#[derive(Debug, Clone)]
pub struct OpenApiValidator {
    document: Arc<SchemaDocument>,
    options: ValidatorOptions,
}

impl OpenApiValidator {
    /// Load the document at `path` with default options.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        Ok(Self::new(loader::load(path)?))
    }

    pub fn new(document: impl Into<Arc<SchemaDocument>>) -> Self {
        Self {
            document: document.into(),
            options: ValidatorOptions::default(),
        }
    }

    /// Replace the engine options.
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Locate an operation by method and concrete path, without an id check.
    pub fn locate(
        &self,
        method: &str,
        request_path: &str,
    ) -> Result<LocatedOperation<'_>, ResolveError> {
        locator::locate(&self.document, method, request_path)
    }

    /// Validate a raw request body for `operation_id`.
    pub fn validate_request(
        &self,
        operation_id: &str,
        method: &str,
        request_path: &str,
        payload: &str,
    ) -> Result<ValidationOutcome, ResolveError> {
        let located = locator::find_operation(&self.document, operation_id, method, request_path)?;
        Ok(self.check_request(located.operation, payload))
    }

    /// Validate an already parsed request body for `operation_id`.
    pub fn validate_request_value(
        &self,
        operation_id: &str,
        method: &str,
        request_path: &str,
        payload: &Value,
    ) -> Result<ValidationOutcome, ResolveError> {
        let located = locator::find_operation(&self.document, operation_id, method, request_path)?;
        Ok(self.check_optional(payload, located.operation.request_body))
    }

    /// Validate a raw response body sent with `status` for `operation_id`.
    pub fn validate_response(
        &self,
        operation_id: &str,
        method: &str,
        request_path: &str,
        payload: &str,
        status: u16,
    ) -> Result<ValidationOutcome, ResolveError> {
        let located = locator::find_operation(&self.document, operation_id, method, request_path)?;
        Ok(self.check_response(located.operation, status, payload))
    }

    /// Validate an already parsed response body sent with `status`.
    pub fn validate_response_value(
        &self,
        operation_id: &str,
        method: &str,
        request_path: &str,
        payload: &Value,
        status: u16,
    ) -> Result<ValidationOutcome, ResolveError> {
        let located = locator::find_operation(&self.document, operation_id, method, request_path)?;
        let schema = locator::find_response_schema(located.operation, status);
        Ok(self.check_optional(payload, schema))
    }

    /// Check a raw request body against an operation already located.
    pub fn check_request(&self, operation: &Operation, payload: &str) -> ValidationOutcome {
        self.check_request_bytes(operation, payload.as_bytes())
    }

    /// Check a request body as received on the wire.
    ///
    /// Bytes that are not UTF-8 are malformed JSON.
    pub fn check_request_bytes(&self, operation: &Operation, payload: &[u8]) -> ValidationOutcome {
        self.check_raw(payload, operation.request_body)
    }

    /// Check a raw response body against an operation already located.
    pub fn check_response(
        &self,
        operation: &Operation,
        status: u16,
        payload: &str,
    ) -> ValidationOutcome {
        self.check_response_bytes(operation, status, payload.as_bytes())
    }

    /// Check a response body as produced by a handler.
    pub fn check_response_bytes(
        &self,
        operation: &Operation,
        status: u16,
        payload: &[u8],
    ) -> ValidationOutcome {
        self.check_raw(payload, locator::find_response_schema(operation, status))
    }

    /// Check a parsed value against one schema node.
    pub fn check_value(&self, value: &Value, schema: SchemaId) -> ValidationOutcome {
        let violations = SchemaValidator::new(&self.document, &self.options).validate(
            value,
            schema,
            &InstancePath::root(),
        );
        ValidationOutcome::from_violations(violations)
    }

    fn check_optional(&self, value: &Value, schema: Option<SchemaId>) -> ValidationOutcome {
        match schema {
            Some(schema) => self.check_value(value, schema),
            None => ValidationOutcome::Valid,
        }
    }

    fn check_raw(&self, payload: &[u8], schema: Option<SchemaId>) -> ValidationOutcome {
        // No declared body: the payload is not inspected at all.
        let Some(schema) = schema else {
            return ValidationOutcome::Valid;
        };

        match serde_json::from_slice::<Value>(payload) {
            Ok(value) => self.check_value(&value, schema),
            Err(e) => ValidationOutcome::Invalid(vec![SchemaViolation::new(
                ViolationKind::MalformedJson,
                InstancePath::root(),
                format!("payload is not valid JSON: {e}"),
            )]),
        }
    }
}
