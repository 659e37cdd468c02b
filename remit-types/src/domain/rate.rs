//! Exchange rate quotes and time-bound rate locks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::CurrencyCode;

/// A provider-computed exchange rate quote with bid/ask spread and an expiry.
///
/// Quotes are immutable once produced - a newer quote supersedes an
/// older one, it never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub source_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    #[schema(value_type = String, example = "39.75")]
    pub mid_rate: Decimal,
    #[schema(value_type = String, example = "39.6506")]
    pub bid_rate: Decimal,
    #[schema(value_type = String, example = "39.8494")]
    pub ask_rate: Decimal,
    #[schema(value_type = String, example = "0.5")]
    pub spread_percent: Decimal,
    pub provider_name: String,
    pub fetched_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl ExchangeRate {
    /// True once the quote's validity window has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }
}

/// Opaque unique identifier for a rate lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "123e4567-e89b-12d3-a456-426614174000")]
pub struct LockId(Uuid);

impl LockId {
    /// Creates a new random LockId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A quote frozen under an opaque id for a bounded duration.
///
/// The embedded rate snapshot never changes after creation; the lock
/// store owns the record from creation to expiry or deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockedRate {
    pub lock_id: LockId,
    pub rate: ExchangeRate,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LockedRate {
    /// Wraps a fresh quote under a new lock id held for `duration`.
    pub fn new(rate: ExchangeRate, duration: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            lock_id: LockId::new(),
            rate,
            locked_at: now,
            expires_at: now + duration,
        }
    }

    /// Derived expiry state.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote() -> ExchangeRate {
        let now = Utc::now();
        ExchangeRate {
            source_currency: CurrencyCode::parse("SGD").unwrap(),
            target_currency: CurrencyCode::parse("PHP").unwrap(),
            mid_rate: dec!(39.75),
            bid_rate: dec!(39.650625),
            ask_rate: dec!(39.849375),
            spread_percent: dec!(0.5),
            provider_name: "simulated".into(),
            fetched_at: now,
            valid_until: now + chrono::Duration::seconds(30),
        }
    }

    #[test]
    fn test_lock_expiry_is_locked_at_plus_duration() {
        let lock = LockedRate::new(quote(), chrono::Duration::seconds(30));
        assert_eq!(lock.expires_at, lock.locked_at + chrono::Duration::seconds(30));
        assert!(!lock.is_expired(Utc::now()));
        assert!(lock.is_expired(lock.expires_at + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_rate_serializes_camel_case_decimal_strings() {
        let json = serde_json::to_value(quote()).unwrap();
        assert_eq!(json["midRate"], "39.75");
        assert_eq!(json["sourceCurrency"], "SGD");
        assert!(json.get("validUntil").is_some());
    }
}
