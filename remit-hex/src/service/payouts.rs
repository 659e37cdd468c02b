//! Payout orchestration service.

use std::time::Duration;

use remit_types::domain::{CurrencyCode, Money, Payout, PayoutId, PayoutMethod, PayoutStatus, TransferId};
use remit_types::dto::{InitiatePayoutRequest, PickupCodeResponse};
use remit_types::error::{DomainError, PayoutError, ProviderError, StoreError};
use remit_types::ports::{PayoutProvider, PayoutReceipt, PayoutStore};
use rust_decimal::Decimal;

/// Retry and deadline policy for disbursement attempts.
#[derive(Debug, Clone)]
pub struct PayoutPolicy {
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Deadline for a single provider call. When it fires the call's
    /// future is dropped and the attempt is recorded as failed.
    pub provider_timeout: Duration,
}

impl Default for PayoutPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            provider_timeout: Duration::from_secs(5),
        }
    }
}

/// Drives payouts through their state machine against an unreliable
/// disbursement provider.
///
/// Every attempt ends in a stored state: a declined disbursement, a
/// provider outage, and a timed-out call all land the payout in FAILED
/// with a reason, from where it can be retried or cancelled.
pub struct PayoutService<S, P>
where
    S: PayoutStore,
    P: PayoutProvider,
{
    store: S,
    provider: P,
    policy: PayoutPolicy,
}

impl<S, P> PayoutService<S, P>
where
    S: PayoutStore,
    P: PayoutProvider,
{
    pub fn new(store: S, provider: P) -> Self {
        Self::with_policy(store, provider, PayoutPolicy::default())
    }

    pub fn with_policy(store: S, provider: P, policy: PayoutPolicy) -> Self {
        Self {
            store,
            provider,
            policy,
        }
    }

    /// Initiates a payout for a funded transfer and runs the first
    /// disbursement attempt.
    ///
    /// Idempotent per transfer: a second initiation for the same
    /// transfer id returns the existing payout untouched instead of
    /// disbursing twice.
    #[tracing::instrument(skip(self, req), fields(transfer_id = %req.transfer_id, method = %req.method))]
    pub async fn initiate(&self, req: InitiatePayoutRequest) -> Result<Payout, PayoutError> {
        if req.amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount.into());
        }
        let currency = CurrencyCode::parse(&req.currency)?;
        let amount = Money::new(currency, req.amount);

        let payout = Payout::new(req.transfer_id, req.method, amount, req.recipient);

        if let Err(err) = self.store.insert(&payout).await {
            return match err {
                StoreError::Conflict(_) => {
                    tracing::info!("payout already exists for transfer, returning existing");
                    self.by_transfer(req.transfer_id).await
                }
                other => Err(other.into()),
            };
        }

        tracing::info!(payout_id = %payout.id, "payout created");
        self.attempt(payout).await
    }

    /// Runs one disbursement attempt for a PENDING payout and persists
    /// the outcome.
    async fn attempt(&self, mut payout: Payout) -> Result<Payout, PayoutError> {
        payout.begin_processing()?;
        self.store.update(&payout).await?;

        let outcome =
            match tokio::time::timeout(self.policy.provider_timeout, self.provider.process_payout(&payout))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Cancelled),
            };

        match outcome {
            Ok(receipt) => self.apply_receipt(&mut payout, receipt)?,
            Err(err) => {
                tracing::warn!(payout_id = %payout.id, error = %err, "disbursement attempt failed");
                payout.fail(None, err.to_string())?;
            }
        }

        self.store.update(&payout).await?;
        tracing::info!(payout_id = %payout.id, status = %payout.status, "disbursement attempt settled");
        Ok(payout)
    }

    /// Maps a provider receipt onto the payout's state machine. The
    /// provider reference is recorded on every outcome, including
    /// failures - a later cancel notifies the provider by reference.
    fn apply_receipt(&self, payout: &mut Payout, receipt: PayoutReceipt) -> Result<(), PayoutError> {
        let PayoutReceipt {
            provider_reference,
            status,
            failure_reason,
            pickup_code,
            pickup_expires_at,
        } = receipt;

        match status {
            PayoutStatus::Completed => {
                payout.complete(provider_reference)?;
            }
            PayoutStatus::ReadyForPickup => match (pickup_code, pickup_expires_at) {
                (Some(code), Some(expires_at)) => {
                    payout.ready_for_pickup(provider_reference, code, expires_at)?;
                }
                _ => {
                    payout.fail(
                        Some(provider_reference),
                        "provider reported pickup-ready without a pickup code".into(),
                    )?;
                }
            },
            PayoutStatus::Failed => {
                let reason = failure_reason
                    .unwrap_or_else(|| "provider reported failure without a reason".into());
                payout.fail(Some(provider_reference), reason)?;
            }
            other => {
                payout.fail(
                    Some(provider_reference),
                    format!("provider reported unexpected status {}", other),
                )?;
            }
        }
        Ok(())
    }

    /// Retries a FAILED payout, bounded by the retry policy.
    #[tracing::instrument(skip(self), fields(payout_id = %id))]
    pub async fn retry(&self, id: PayoutId) -> Result<Payout, PayoutError> {
        let mut payout = self.load(id).await?;

        if payout.status == PayoutStatus::Failed && payout.retry_count >= self.policy.max_retries {
            return Err(PayoutError::RetryLimitExceeded {
                count: payout.retry_count,
                max: self.policy.max_retries,
            });
        }

        payout.prepare_retry()?;
        self.store.update(&payout).await?;
        tracing::info!(retry_count = payout.retry_count, "payout retry started");
        self.attempt(payout).await
    }

    /// Cancels a PENDING or FAILED payout. Provider-side cancellation
    /// is best effort: the local record is cancelled even if the
    /// provider call fails.
    #[tracing::instrument(skip(self, reason), fields(payout_id = %id))]
    pub async fn cancel(&self, id: PayoutId, reason: String) -> Result<Payout, PayoutError> {
        let mut payout = self.load(id).await?;

        if !matches!(payout.status, PayoutStatus::Pending | PayoutStatus::Failed) {
            return Err(PayoutError::InvalidState {
                status: payout.status,
                action: "cancel",
            });
        }

        if let Some(reference) = payout.provider_reference.clone() {
            if let Err(err) = self.provider.cancel_payout(&reference).await {
                tracing::warn!(error = %err, "provider-side cancel failed, recording local cancellation");
            }
        }

        payout.cancel(reason)?;
        self.store.update(&payout).await?;
        tracing::info!("payout cancelled");
        Ok(payout)
    }

    pub async fn get(&self, id: PayoutId) -> Result<Payout, PayoutError> {
        self.load(id).await
    }

    pub async fn by_transfer(&self, transfer_id: TransferId) -> Result<Payout, PayoutError> {
        self.store
            .find_by_transfer(transfer_id)
            .await
            .map_err(Self::map_store_miss)
    }

    /// Returns the pickup code for a cash-pickup payout that has one
    /// issued.
    pub async fn pickup_code(&self, id: PayoutId) -> Result<PickupCodeResponse, PayoutError> {
        let payout = self.load(id).await?;

        if payout.method != PayoutMethod::CashPickup {
            return Err(PayoutError::NotCashPickup);
        }
        match (payout.pickup_code, payout.pickup_expires_at) {
            (Some(pickup_code), Some(pickup_expires_at)) => Ok(PickupCodeResponse {
                pickup_code,
                pickup_expires_at,
            }),
            _ => Err(PayoutError::PickupNotReady),
        }
    }

    async fn load(&self, id: PayoutId) -> Result<Payout, PayoutError> {
        self.store.get(id).await.map_err(Self::map_store_miss)
    }

    fn map_store_miss(err: StoreError) -> PayoutError {
        match err {
            StoreError::NotFound => PayoutError::NotFound,
            other => PayoutError::Store(other),
        }
    }
}
