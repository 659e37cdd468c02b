//! Simulated disbursement provider.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use remit_types::domain::{Payout, PayoutMethod, PayoutStatus};
use remit_types::error::ProviderError;
use remit_types::ports::{PayoutProvider, PayoutReceipt};

/// Tunables for the simulated disbursement rail.
#[derive(Debug, Clone)]
pub struct PayoutSimConfig {
    /// Simulated network/processing latency per call.
    pub latency: Duration,
    /// Percent of calls that come back as a FAILED receipt.
    pub failure_rate: f64,
    /// How long an issued pickup code stays collectable.
    pub pickup_validity: chrono::Duration,
}

impl Default for PayoutSimConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(100),
            failure_rate: 10.0,
            pickup_validity: chrono::Duration::hours(72),
        }
    }
}

/// Simulates an unreliable partner rail: latency, uniform random
/// failure, and pickup-code issuance for cash pickup.
///
/// An injected failure is a *returned receipt* with status FAILED - a
/// declined disbursement is a normal business outcome that needs a
/// state transition, not an exceptional control-flow event.
pub struct SimulatedPayoutProvider {
    config: PayoutSimConfig,
}

impl SimulatedPayoutProvider {
    pub fn new(config: PayoutSimConfig) -> Self {
        Self { config }
    }

    fn reference() -> String {
        format!("SIM-{}", Uuid::new_v4().simple())
    }

    /// 8-digit numeric pickup code from the thread-local CSPRNG.
    fn pickup_code() -> String {
        format!("{:08}", rand::rng().random_range(0..100_000_000u32))
    }
}

impl Default for SimulatedPayoutProvider {
    fn default() -> Self {
        Self::new(PayoutSimConfig::default())
    }
}

#[async_trait::async_trait]
impl PayoutProvider for SimulatedPayoutProvider {
    async fn process_payout(&self, payout: &Payout) -> Result<PayoutReceipt, ProviderError> {
        // Cancellable: if the caller's deadline elapses during this
        // sleep, the future is dropped and the call never completes.
        tokio::time::sleep(self.config.latency).await;

        let reference = Self::reference();

        let failed = self.config.failure_rate > 0.0
            && rand::rng().random_range(0.0..100.0) < self.config.failure_rate;
        if failed {
            tracing::info!(payout_id = %payout.id, %reference, "simulated disbursement failure");
            return Ok(PayoutReceipt {
                provider_reference: reference,
                status: PayoutStatus::Failed,
                failure_reason: Some("disbursement rejected by partner network".to_string()),
                pickup_code: None,
                pickup_expires_at: None,
            });
        }

        let receipt = match payout.method {
            PayoutMethod::CashPickup => PayoutReceipt {
                provider_reference: reference,
                status: PayoutStatus::ReadyForPickup,
                failure_reason: None,
                pickup_code: Some(Self::pickup_code()),
                pickup_expires_at: Some(Utc::now() + self.config.pickup_validity),
            },
            PayoutMethod::BankAccount | PayoutMethod::MobileWallet => PayoutReceipt {
                provider_reference: reference,
                status: PayoutStatus::Completed,
                failure_reason: None,
                pickup_code: None,
                pickup_expires_at: None,
            },
        };
        tracing::info!(
            payout_id = %payout.id,
            reference = %receipt.provider_reference,
            status = %receipt.status,
            "simulated disbursement processed"
        );
        Ok(receipt)
    }

    async fn check_status(&self, provider_reference: &str) -> Result<PayoutStatus, ProviderError> {
        // The simulator settles everything it accepted.
        tracing::debug!(%provider_reference, "simulated status check");
        Ok(PayoutStatus::Completed)
    }

    async fn cancel_payout(&self, provider_reference: &str) -> Result<(), ProviderError> {
        tracing::info!(%provider_reference, "simulated provider-side cancel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_types::domain::{CurrencyCode, Money, RecipientDetails, TransferId};
    use rust_decimal_macros::dec;

    fn config(failure_rate: f64) -> PayoutSimConfig {
        PayoutSimConfig {
            latency: Duration::from_millis(1),
            failure_rate,
            ..Default::default()
        }
    }

    fn pickup_payout() -> Payout {
        Payout::new(
            TransferId::new(),
            PayoutMethod::CashPickup,
            Money::new(CurrencyCode::parse("PHP").unwrap(), dec!(5000)),
            RecipientDetails::CashPickup {
                first_name: "Maria".into(),
                last_name: "Santos".into(),
                country: "PH".into(),
            },
        )
    }

    fn bank_payout() -> Payout {
        Payout::new(
            TransferId::new(),
            PayoutMethod::BankAccount,
            Money::new(CurrencyCode::parse("PHP").unwrap(), dec!(5000)),
            RecipientDetails::BankAccount {
                bank_name: "BDO".into(),
                bank_code: "010530667".into(),
                account_number: "001234567890".into(),
                account_name: "Maria Santos".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_cash_pickup_issues_eight_digit_code_with_72h_expiry() {
        let provider = SimulatedPayoutProvider::new(config(0.0));
        let before = Utc::now();
        let receipt = provider.process_payout(&pickup_payout()).await.unwrap();

        assert_eq!(receipt.status, PayoutStatus::ReadyForPickup);
        let code = receipt.pickup_code.unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let expires = receipt.pickup_expires_at.unwrap();
        let hours = (expires - before).num_hours();
        assert!((71..=72).contains(&hours), "pickup expiry {} hours out", hours);
    }

    #[tokio::test]
    async fn test_bank_payout_completes() {
        let provider = SimulatedPayoutProvider::new(config(0.0));
        let receipt = provider.process_payout(&bank_payout()).await.unwrap();
        assert_eq!(receipt.status, PayoutStatus::Completed);
        assert!(receipt.provider_reference.starts_with("SIM-"));
        assert!(receipt.pickup_code.is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_is_a_receipt_not_an_error() {
        let provider = SimulatedPayoutProvider::new(config(100.0));
        let receipt = provider.process_payout(&bank_payout()).await.unwrap();
        assert_eq!(receipt.status, PayoutStatus::Failed);
        assert!(!receipt.failure_reason.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_elapsing_cancels_the_call() {
        let provider = SimulatedPayoutProvider::new(PayoutSimConfig {
            latency: Duration::from_secs(5),
            failure_rate: 0.0,
            ..Default::default()
        });
        let result = tokio::time::timeout(
            Duration::from_millis(20),
            provider.process_payout(&bank_payout()),
        )
        .await;
        assert!(result.is_err(), "call should not complete before the deadline");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let provider = SimulatedPayoutProvider::new(config(0.0));
        provider.cancel_payout("SIM-x").await.unwrap();
        provider.cancel_payout("SIM-x").await.unwrap();
    }
}
