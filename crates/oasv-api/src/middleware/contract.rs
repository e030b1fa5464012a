//! # Contract Enforcement Middleware
//!
//! Checks each request body against the operation it addresses before the
//! handler runs, and optionally the handler's response body before it
//! leaves the service.
//!
//! Requests for a path or method the document does not declare pass
//! through untouched; routing them (or returning 404/405) is the router's
//! job.

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use oasv_core::ValidationOutcome;

use super::metrics::{record_check, record_violations, Direction};
use crate::error::AppError;
use crate::state::ContractState;

/// Middleware enforcing the loaded contract; install with
/// [`crate::enforce_contract`].
pub async fn contract_middleware(
    State(state): State<ContractState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();

    let located = match state.validator.locate(&method, &path) {
        Ok(located) => located,
        Err(e) => {
            tracing::debug!(
                %method,
                %path,
                reason = %e,
                "no contract for request, passing through"
            );
            return next.run(request).await;
        }
    };
    let operation = format!("{} {}", located.method, located.template);

    let (parts, body) = request.into_parts();
    let limit = state.config.max_body_bytes;
    let bytes = match buffer_request(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => return e.into_response(),
    };

    record_check(Direction::Request);
    let outcome = state.validator.check_request_bytes(located.operation, &bytes);
    if let ValidationOutcome::Invalid(violations) = outcome {
        record_violations(Direction::Request, violations.len());
        tracing::info!(
            operation = %operation,
            violations = violations.len(),
            "request rejected by contract"
        );
        return AppError::RequestContract(violations).into_response();
    }

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;
    if !state.config.validate_responses {
        return response;
    }

    let status = response.status().as_u16();
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::Internal(format!("failed to buffer response of {operation}: {e}"))
                .into_response()
        }
    };

    record_check(Direction::Response);
    let outcome = state.validator.check_response_bytes(located.operation, status, &bytes);
    if let ValidationOutcome::Invalid(violations) = outcome {
        record_violations(Direction::Response, violations.len());
        return AppError::ResponseContract {
            operation,
            violations,
        }
        .into_response();
    }

    Response::from_parts(parts, Body::from(bytes))
}

async fn buffer_request(body: Body, limit: usize) -> Result<Bytes, AppError> {
    // Declared sizes over the limit are rejected before reading anything.
    if body.size_hint().lower() > limit as u64 {
        return Err(AppError::PayloadTooLarge { limit });
    }

    axum::body::to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            return AppError::PayloadTooLarge { limit };
        }
        tracing::warn!(limit, error = %e, "failed to buffer request body");
        AppError::BadRequest(format!("failed to read request body: {e}"))
    })
}

/// Streamed bodies only reveal their size while being read.
fn exceeds_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
