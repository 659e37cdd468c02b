//! Domain models for the quote-lock-and-settlement engine.

pub mod corridor;
pub mod currency;
pub mod payout;
pub mod rate;

pub use corridor::Corridor;
pub use currency::{CurrencyCode, CurrencyPair, Money};
pub use payout::{Payout, PayoutId, PayoutMethod, PayoutStatus, RecipientDetails, TransferId};
pub use rate::{ExchangeRate, LockId, LockedRate};
