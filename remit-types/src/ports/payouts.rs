//! Payout store and disbursement provider ports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Payout, PayoutId, PayoutStatus, TransferId};
use crate::error::{ProviderError, StoreError};

/// Port trait for payout persistence, keyed by id and secondarily
/// indexed by originating transfer id.
#[async_trait::async_trait]
pub trait PayoutStore: Send + Sync + 'static {
    /// Inserts a new payout. Fails with `Conflict` if a payout for the
    /// same transfer id already exists - one payout per transfer is a
    /// correctness requirement, enforced at insert time.
    async fn insert(&self, payout: &Payout) -> Result<(), StoreError>;

    /// Overwrites an existing payout. Fails with `NotFound` if absent.
    async fn update(&self, payout: &Payout) -> Result<(), StoreError>;

    async fn get(&self, id: PayoutId) -> Result<Payout, StoreError>;

    async fn find_by_transfer(&self, transfer_id: TransferId) -> Result<Payout, StoreError>;
}

/// Outcome of a disbursement attempt as reported by the provider.
///
/// A declined payout is a normal business outcome and arrives here with
/// `status == FAILED`, not as an `Err` - only the call itself failing
/// (cancellation, outage) is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub provider_reference: String,
    pub status: PayoutStatus,
    pub failure_reason: Option<String>,
    pub pickup_code: Option<String>,
    pub pickup_expires_at: Option<DateTime<Utc>>,
}

/// Port trait for the external disbursement rail (bank transfer,
/// mobile wallet, cash pickup).
///
/// Calls block on the rail and must honor the caller's deadline: the
/// future is dropped when the deadline fires and the orchestration
/// layer observes `ProviderError::Cancelled`.
#[async_trait::async_trait]
pub trait PayoutProvider: Send + Sync + 'static {
    /// Attempts the disbursement described by `payout`.
    async fn process_payout(&self, payout: &Payout) -> Result<PayoutReceipt, ProviderError>;

    /// Queries the provider-side status for a reference. Idempotent.
    async fn check_status(&self, provider_reference: &str)
    -> Result<PayoutStatus, ProviderError>;

    /// Asks the provider to abandon a disbursement. Idempotent.
    async fn cancel_payout(&self, provider_reference: &str) -> Result<(), ProviderError>;
}
