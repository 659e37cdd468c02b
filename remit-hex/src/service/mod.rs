//! Application services.
//!
//! Orchestrate domain operations over the outbound ports. All IO goes
//! through the injected port implementations; the services themselves
//! hold no connections.

mod payouts;
mod quotes;

pub use payouts::{PayoutPolicy, PayoutService};
pub use quotes::{QuotePolicy, QuoteService};
