//! In-memory TTL cache for exchange rate quotes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use remit_types::domain::{CurrencyPair, ExchangeRate};
use remit_types::error::StoreError;
use remit_types::ports::RateCache;

#[derive(Debug, Clone)]
struct CacheEntry {
    rate: ExchangeRate,
    expires_at: DateTime<Utc>,
}

/// Cache-aside TTL store keyed `rate:{source}:{target}`.
///
/// A read that finds a lapsed entry deletes it and reports a plain
/// miss - unlike the lock store, "expired" and "absent" are
/// indistinguishable to rate-cache callers.
#[derive(Default)]
pub struct InMemoryRateCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(pair: &CurrencyPair) -> String {
        format!("rate:{}:{}", pair.source, pair.target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RateCache for InMemoryRateCache {
    async fn get(&self, pair: &CurrencyPair) -> Result<Option<ExchangeRate>, StoreError> {
        let key = Self::key(pair);
        let now = Utc::now();
        let expired = match self.entries.get(&key) {
            None => return Ok(None),
            Some(entry) => now > entry.expires_at || entry.rate.is_expired(now),
        };
        if expired {
            self.entries.remove(&key);
            tracing::debug!(%pair, "evicted expired rate cache entry");
            return Ok(None);
        }
        Ok(self.entries.get(&key).map(|e| e.rate.clone()))
    }

    async fn put(&self, rate: &ExchangeRate, ttl: Duration) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Storage(format!("invalid ttl: {}", e)))?;
        let pair = CurrencyPair::new(rate.source_currency.clone(), rate.target_currency.clone());
        self.entries.insert(
            Self::key(&pair),
            CacheEntry {
                rate: rate.clone(),
                expires_at: Utc::now() + ttl,
            },
        );
        Ok(())
    }
}
