//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Contract failures on the request side are the client's fault and are
//! returned with every violation; contract failures on the response side
//! are the server's fault and are logged, never echoed back.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oasv_core::SchemaViolation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "CONTRACT_VIOLATION").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Violations, present only for request contract failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request body does not conform to the declared schema (400).
    #[error("request body violates the API contract ({} violation(s))", .0.len())]
    RequestContract(Vec<SchemaViolation>),

    /// The handler produced a body that does not conform (500).
    #[error("response of {operation} violates the API contract ({} violation(s))", .violations.len())]
    ResponseContract {
        /// `METHOD template` of the offending operation.
        operation: String,
        violations: Vec<SchemaViolation>,
    },

    /// The request body exceeds the configured limit (413).
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The request body could not be read (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::RequestContract(_) => (StatusCode::BAD_REQUEST, "CONTRACT_VIOLATION"),
            Self::ResponseContract { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::ResponseContract { .. } | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        match &self {
            Self::ResponseContract {
                operation,
                violations,
            } => {
                for violation in violations {
                    tracing::error!(
                        operation = %operation,
                        kind = %violation.kind,
                        path = %violation.path,
                        "response contract violation: {}",
                        violation.message
                    );
                }
            }
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            _ => {}
        }

        let details = match &self {
            Self::RequestContract(violations) => serde_json::to_value(violations).ok(),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasv_core::{InstancePath, ViolationKind};

    fn violation() -> SchemaViolation {
        SchemaViolation::new(
            ViolationKind::MissingRequiredProperty,
            InstancePath::root().key("weight"),
            "missing required property 'weight'",
        )
    }

    #[test]
    fn request_contract_status_code() {
        let err = AppError::RequestContract(vec![violation()]);
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "CONTRACT_VIOLATION");
        assert_eq!(
            err.to_string(),
            "request body violates the API contract (1 violation(s))"
        );
    }

    #[test]
    fn response_contract_status_code() {
        let err = AppError::ResponseContract {
            operation: "GET /Carp/{id}".into(),
            violations: vec![violation()],
        };
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }

    #[test]
    fn payload_too_large_status_code() {
        let (status, _) = AppError::PayloadTooLarge { limit: 8 }.status_and_code();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn request_contract_response_carries_details() {
        let response = AppError::RequestContract(vec![violation()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body_omits_empty_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "INTERNAL_ERROR".into(),
                message: "An internal error occurred".into(),
                details: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["error"].get("details").is_none());
    }
}
