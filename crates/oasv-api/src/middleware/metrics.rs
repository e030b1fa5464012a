//! # Contract Metrics
//!
//! Counters emitted through the `metrics` facade. Without an installed
//! recorder the calls are no-ops.

/// Payloads checked against the contract.
pub const CHECKS_TOTAL: &str = "oasv_contract_checks_total";

/// Violations found, counted individually.
pub const VIOLATIONS_TOTAL: &str = "oasv_contract_violations_total";

/// Which side of the exchange was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

/// Count one checked payload.
pub fn record_check(direction: Direction) {
    metrics::counter!(CHECKS_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Count `violations` found in one payload.
pub fn record_violations(direction: Direction, violations: usize) {
    metrics::counter!(VIOLATIONS_TOTAL, "direction" => direction.as_str())
        .increment(violations as u64);
}
