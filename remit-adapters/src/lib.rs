//! # Remit Adapters
//!
//! Concrete adapter implementations for the quote-lock-and-settlement
//! engine's outbound ports: in-memory TTL stores for rates, locks and
//! payouts, the simulated disbursement provider, and an in-memory
//! partitioned event log.
//!
//! All stores are process-local. A production deployment would back
//! the same ports with Redis (TTL stores) and a relational database
//! (payouts) without touching the application layer.

mod event_log;
mod lock_store;
mod payout_provider;
mod payout_store;
mod rate_cache;

pub use event_log::InMemoryEventLog;
pub use lock_store::InMemoryLockStore;
pub use payout_provider::{PayoutSimConfig, SimulatedPayoutProvider};
pub use payout_store::InMemoryPayoutStore;
pub use rate_cache::InMemoryRateCache;
