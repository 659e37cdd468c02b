//! Lock store port.

use chrono::{DateTime, Utc};

use crate::domain::{LockId, LockedRate};
use crate::error::StoreError;

/// Port trait for the TTL store that owns rate locks from creation to
/// expiry or explicit deletion.
///
/// Unlike the rate cache, a lapsed lock is surfaced as a distinct
/// `Expired` failure rather than a miss, so callers can tell "existed
/// and lapsed" (re-lock required) from "never existed".
#[async_trait::async_trait]
pub trait LockStore: Send + Sync + 'static {
    /// Persists a lock. Fails with `AlreadyExpired` if `expires_at` is
    /// not in the future; the stored record must not outlive
    /// `expires_at`.
    async fn save(&self, locked: &LockedRate) -> Result<(), StoreError>;

    /// Reads a lock. A record found past its expiry is deleted and
    /// reported as `Expired`; an absent record is `NotFound`.
    async fn get(&self, lock_id: LockId) -> Result<LockedRate, StoreError>;

    /// Removes a lock, failing with `NotFound` if nothing was removed.
    async fn delete(&self, lock_id: LockId) -> Result<(), StoreError>;

    /// Moves a live lock's expiry. Fails with `NotFound` if the lock is
    /// absent or already lapsed. The read-modify-write must be atomic
    /// per key so a concurrent writer cannot be silently overwritten.
    async fn extend(&self, lock_id: LockId, new_expiry: DateTime<Utc>)
    -> Result<LockedRate, StoreError>;
}
