//! Error types for the quote-lock-and-settlement engine.

use crate::domain::{CurrencyCode, CurrencyPair, PayoutStatus};

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        got: CurrencyCode,
    },

    #[error("No corridor configured for {0}")]
    CorridorNotFound(CurrencyPair),

    #[error("Corridor {0} is disabled")]
    CorridorDisabled(CurrencyPair),

    #[error("Cannot {action} a payout in status {from}")]
    InvalidTransition {
        from: PayoutStatus,
        action: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Rate provider errors.
///
/// `UnsupportedPair` is permanent (no rate path exists); `Unavailable`
/// is a transient provider fault the caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("No rate available for {0}")]
    UnsupportedPair(CurrencyPair),

    #[error("Rate provider unavailable: {0}")]
    Unavailable(String),
}

/// TTL store errors.
///
/// `Expired` is distinct from `NotFound`: callers must be able to tell
/// "existed and lapsed" (re-lock required) from "never existed".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Entry not found")]
    NotFound,

    #[error("Entry expired")]
    Expired,

    #[error("Refusing to store an already-expired record")]
    AlreadyExpired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Disbursement provider errors.
///
/// A provider-level business failure (declined payout) is NOT an error:
/// it comes back as a receipt with a FAILED status. These variants are
/// for the call itself going wrong.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider call cancelled before completion")]
    Cancelled,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Payout orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    #[error("Payout not found")]
    NotFound,

    #[error("Cannot {action} a payout in status {status}")]
    InvalidState {
        status: PayoutStatus,
        action: &'static str,
    },

    #[error("Retry limit exceeded: {count} of {max} retries used")]
    RetryLimitExceeded { count: u32, max: u32 },

    #[error("Pickup code not issued yet")]
    PickupNotReady,

    #[error("Payout method is not cash pickup")]
    NotCashPickup,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for PayoutError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidTransition { from, action } => PayoutError::InvalidState {
                status: from,
                action,
            },
            other => PayoutError::Domain(other),
        }
    }
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Gone: {0}")]
    Gone(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::CorridorNotFound(pair) => {
                AppError::NotFound(format!("No corridor for {}", pair))
            }
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::UnsupportedPair(pair) => {
                AppError::NotFound(format!("No rate available for {}", pair))
            }
            RateError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Resource not found".into()),
            StoreError::Expired => AppError::Gone("Rate lock expired".into()),
            StoreError::AlreadyExpired => {
                AppError::BadRequest("Lock duration already elapsed".into())
            }
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl From<PayoutError> for AppError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::NotFound => AppError::NotFound("Payout not found".into()),
            PayoutError::InvalidState { .. } => AppError::BadRequest(err.to_string()),
            PayoutError::RetryLimitExceeded { .. } => AppError::Conflict(err.to_string()),
            PayoutError::PickupNotReady | PayoutError::NotCashPickup => {
                AppError::BadRequest(err.to_string())
            }
            PayoutError::Store(e) => e.into(),
            PayoutError::Domain(e) => e.into(),
        }
    }
}
