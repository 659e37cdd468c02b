//! In-memory TTL store for rate locks.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use remit_types::domain::{LockId, LockedRate};
use remit_types::error::StoreError;
use remit_types::ports::LockStore;

/// TTL store keyed `locked:{lockId}`.
///
/// Expiry is enforced at read time so that "existed and lapsed"
/// (`Expired`) stays distinguishable from "never existed" (`NotFound`).
#[derive(Default)]
pub struct InMemoryLockStore {
    locks: DashMap<String, LockedRate>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(lock_id: LockId) -> String {
        format!("locked:{}", lock_id)
    }
}

#[async_trait::async_trait]
impl LockStore for InMemoryLockStore {
    async fn save(&self, locked: &LockedRate) -> Result<(), StoreError> {
        if locked.expires_at <= Utc::now() {
            return Err(StoreError::AlreadyExpired);
        }
        self.locks.insert(Self::key(locked.lock_id), locked.clone());
        tracing::debug!(lock_id = %locked.lock_id, expires_at = %locked.expires_at, "saved rate lock");
        Ok(())
    }

    async fn get(&self, lock_id: LockId) -> Result<LockedRate, StoreError> {
        let key = Self::key(lock_id);
        let now = Utc::now();
        let lock = match self.locks.get(&key) {
            None => return Err(StoreError::NotFound),
            Some(entry) => entry.clone(),
        };
        if lock.is_expired(now) {
            self.locks.remove(&key);
            tracing::debug!(%lock_id, "rate lock lapsed, deleting");
            return Err(StoreError::Expired);
        }
        Ok(lock)
    }

    async fn delete(&self, lock_id: LockId) -> Result<(), StoreError> {
        self.locks
            .remove(&Self::key(lock_id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn extend(
        &self,
        lock_id: LockId,
        new_expiry: DateTime<Utc>,
    ) -> Result<LockedRate, StoreError> {
        // Entry-based read-modify-write: a concurrent writer to the same
        // key cannot interleave with the expiry check.
        match self.locks.entry(Self::key(lock_id)) {
            Entry::Vacant(_) => Err(StoreError::NotFound),
            Entry::Occupied(mut entry) => {
                if entry.get().is_expired(Utc::now()) {
                    entry.remove();
                    return Err(StoreError::NotFound);
                }
                entry.get_mut().expires_at = new_expiry;
                Ok(entry.get().clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_types::domain::{CurrencyCode, ExchangeRate};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn locked(duration: chrono::Duration) -> LockedRate {
        let now = Utc::now();
        let rate = ExchangeRate {
            source_currency: CurrencyCode::parse("SGD").unwrap(),
            target_currency: CurrencyCode::parse("PHP").unwrap(),
            mid_rate: dec!(39.75),
            bid_rate: dec!(39.650625),
            ask_rate: dec!(39.849375),
            spread_percent: dec!(0.5),
            provider_name: "simulated".into(),
            fetched_at: now,
            valid_until: now + chrono::Duration::seconds(30),
        };
        LockedRate::new(rate, duration)
    }

    #[tokio::test]
    async fn test_round_trip_preserves_rate_snapshot() {
        let store = InMemoryLockStore::new();
        let lock = locked(chrono::Duration::seconds(30));
        store.save(&lock).await.unwrap();
        let read = store.get(lock.lock_id).await.unwrap();
        assert_eq!(read.rate, lock.rate);
        assert_eq!(read.expires_at, lock.expires_at);
    }

    #[tokio::test]
    async fn test_save_rejects_already_expired_lock() {
        let store = InMemoryLockStore::new();
        let lock = locked(chrono::Duration::seconds(-1));
        assert!(matches!(
            store.save(&lock).await,
            Err(StoreError::AlreadyExpired)
        ));
    }

    #[tokio::test]
    async fn test_expired_is_distinct_from_not_found() {
        let store = InMemoryLockStore::new();
        let lock = locked(chrono::Duration::milliseconds(40));
        store.save(&lock).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        // First read observes the lapse and deletes the record.
        assert!(matches!(store.get(lock.lock_id).await, Err(StoreError::Expired)));
        // The record is gone now, so a further read is NotFound.
        assert!(matches!(store.get(lock.lock_id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_lock_is_not_found() {
        let store = InMemoryLockStore::new();
        assert!(matches!(
            store.delete(LockId::new()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_extend_moves_expiry() {
        let store = InMemoryLockStore::new();
        let lock = locked(chrono::Duration::seconds(30));
        store.save(&lock).await.unwrap();

        let new_expiry = lock.expires_at + chrono::Duration::seconds(30);
        let extended = store.extend(lock.lock_id, new_expiry).await.unwrap();
        assert_eq!(extended.expires_at, new_expiry);
    }

    #[tokio::test]
    async fn test_extend_lapsed_lock_is_not_found() {
        let store = InMemoryLockStore::new();
        let lock = locked(chrono::Duration::milliseconds(40));
        store.save(&lock).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let result = store
            .extend(lock.lock_id, Utc::now() + chrono::Duration::seconds(30))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
