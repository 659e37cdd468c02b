//! # Remit Hex
//!
//! Application service layer and HTTP adapter for the
//! quote-lock-and-settlement engine.
//!
//! ## Architecture
//!
//! - `service/` - Application services (quote/lock orchestration and the
//!   payout state machine)
//! - `ingress/` - Event stream consumer that turns funded transfers into
//!   payouts
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The services are generic over the port traits in `remit-types`
//! (`RateProvider`, `RateCache`, `LockStore`, `PayoutStore`,
//! `PayoutProvider`, `EventLog`), allowing different adapter
//! implementations to be injected.

pub mod inbound;
pub mod ingress;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use ingress::{EventIngress, IngressConfig, UnknownMethodPolicy};
pub use service::{PayoutPolicy, PayoutService, QuotePolicy, QuoteService};
