//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod locks;
mod payouts;
mod rates;
mod stream;

pub use locks::LockStore;
pub use payouts::{PayoutProvider, PayoutReceipt, PayoutStore};
pub use rates::{RateCache, RateProvider};
pub use stream::{EventLog, EventRecord};
