//! Rate provider and rate cache ports.

use std::time::Duration;

use crate::domain::{CurrencyPair, ExchangeRate};
use crate::error::{RateError, StoreError};

/// Port trait for exchange rate providers.
///
/// Implementations can be market-data integrations or the built-in
/// simulated provider.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Produces a fresh quote for the pair.
    async fn get_rate(&self, pair: &CurrencyPair) -> Result<ExchangeRate, RateError>;

    /// Quotes several pairs at once. Unsupported pairs are skipped
    /// silently; any other failure propagates.
    async fn get_rates(&self, pairs: &[CurrencyPair]) -> Result<Vec<ExchangeRate>, RateError>;
}

/// Port trait for the TTL rate cache in front of a `RateProvider`.
///
/// Cache-aside: the cache never calls the provider itself. An entry
/// whose validity has lapsed must be deleted on read and reported as a
/// plain miss - a stale rate is never returned.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync + 'static {
    /// Returns the cached quote, or `None` on miss or expired-on-read.
    async fn get(&self, pair: &CurrencyPair) -> Result<Option<ExchangeRate>, StoreError>;

    /// Stores a quote for `ttl`.
    async fn put(&self, rate: &ExchangeRate, ttl: Duration) -> Result<(), StoreError>;
}
