//! # Remit Types
//!
//! Domain types and port traits for the quote-lock-and-settlement engine.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, ExchangeRate, LockedRate, Payout)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Corridor, CurrencyCode, CurrencyPair, ExchangeRate, LockId, LockedRate, Money, Payout,
    PayoutId, PayoutMethod, PayoutStatus, RecipientDetails, TransferId,
};
pub use dto::*;
pub use error::{AppError, DomainError, PayoutError, ProviderError, RateError, StoreError};
pub use ports::{
    EventLog, EventRecord, LockStore, PayoutProvider, PayoutReceipt, PayoutStore, RateCache,
    RateProvider,
};
