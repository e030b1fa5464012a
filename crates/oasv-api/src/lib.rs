//! # oasv-api: OpenAPI Contract Enforcement for Axum
//!
//! Wraps an existing `axum::Router` so every request body is checked
//! against the OpenAPI document before the handler sees it, and every
//! response body (optionally) before the client does.
//!
//! ## Behavior
//!
//! | Situation                                  | Result                         |
//! |--------------------------------------------|--------------------------------|
//! | path/method not declared in the document   | passed through untouched       |
//! | request body violates its schema           | `400` with violation details   |
//! | request body larger than `max_body_bytes`  | `413`                          |
//! | response body violates its schema          | `500`, violations logged       |
//!
//! ## Usage
//!
//! ```ignore
//! let state = ContractState::load(AppConfig::from_env(), ValidatorOptions::default())?;
//! let app = oasv_api::enforce_contract(routes(), state);
//! ```

pub mod error;
pub mod middleware;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::Router;

pub use crate::error::{AppError, ErrorBody, ErrorDetail};
pub use crate::state::{AppConfig, ContractState, StartupError};

/// Layer contract enforcement over every route of `router`.
pub fn enforce_contract<S>(router: Router<S>, state: ContractState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(
        state,
        middleware::contract::contract_middleware,
    ))
}
