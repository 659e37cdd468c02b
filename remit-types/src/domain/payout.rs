//! Payout domain model and its retryable state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::Money;
use crate::error::DomainError;

/// Unique identifier for a Payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "123e4567-e89b-12d3-a456-426614174000")]
pub struct PayoutId(Uuid);

impl PayoutId {
    /// Creates a new random PayoutId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PayoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PayoutId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of the transfer a payout settles. One payout per transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "123e4567-e89b-12d3-a456-426614174000")]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransferId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How funds are disbursed to the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutMethod {
    BankAccount,
    MobileWallet,
    CashPickup,
}

impl std::fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutMethod::BankAccount => write!(f, "BANK_ACCOUNT"),
            PayoutMethod::MobileWallet => write!(f, "MOBILE_WALLET"),
            PayoutMethod::CashPickup => write!(f, "CASH_PICKUP"),
        }
    }
}

/// Lifecycle states of a payout.
///
/// PENDING -> PROCESSING -> {COMPLETED, READY_FOR_PICKUP, FAILED};
/// FAILED -> PENDING (retry); {PENDING, FAILED} -> CANCELLED.
/// COMPLETED, READY_FOR_PICKUP and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    ReadyForPickup,
    Failed,
    Cancelled,
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PayoutStatus::Pending => "PENDING",
            PayoutStatus::Processing => "PROCESSING",
            PayoutStatus::Completed => "COMPLETED",
            PayoutStatus::ReadyForPickup => "READY_FOR_PICKUP",
            PayoutStatus::Failed => "FAILED",
            PayoutStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// Immutable snapshot of the destination details, taken when the payout
/// is created so later edits to a recipient profile don't rewrite
/// payout history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum RecipientDetails {
    BankAccount {
        bank_name: String,
        bank_code: String,
        account_number: String,
        account_name: String,
    },
    MobileWallet {
        wallet_provider: String,
        mobile_number: String,
    },
    CashPickup {
        first_name: String,
        last_name: String,
        country: String,
    },
}

/// A disbursement to a recipient, tracked through a retryable state machine.
///
/// Mutated only through the transition methods below; every transition
/// stamps `updated_at` and completion additionally stamps `completed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: PayoutId,
    pub transfer_id: TransferId,
    pub status: PayoutStatus,
    pub method: PayoutMethod,
    pub amount: Money,
    pub recipient: RecipientDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payout {
    /// Creates a new payout in PENDING.
    pub fn new(
        transfer_id: TransferId,
        method: PayoutMethod,
        amount: Money,
        recipient: RecipientDetails,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PayoutId::new(),
            transfer_id,
            status: PayoutStatus::Pending,
            method,
            amount,
            recipient,
            provider_reference: None,
            pickup_code: None,
            pickup_expires_at: None,
            failure_reason: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn transition(&mut self, from: &[PayoutStatus], to: PayoutStatus, action: &'static str)
    -> Result<(), DomainError> {
        if !from.contains(&self.status) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// PENDING -> PROCESSING.
    pub fn begin_processing(&mut self) -> Result<(), DomainError> {
        self.transition(&[PayoutStatus::Pending], PayoutStatus::Processing, "process")
    }

    /// PROCESSING -> COMPLETED.
    pub fn complete(&mut self, provider_reference: String) -> Result<(), DomainError> {
        self.transition(&[PayoutStatus::Processing], PayoutStatus::Completed, "complete")?;
        self.provider_reference = Some(provider_reference);
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// PROCESSING -> READY_FOR_PICKUP, recording the issued pickup code.
    pub fn ready_for_pickup(
        &mut self,
        provider_reference: String,
        pickup_code: String,
        pickup_expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(
            &[PayoutStatus::Processing],
            PayoutStatus::ReadyForPickup,
            "ready_for_pickup",
        )?;
        self.provider_reference = Some(provider_reference);
        self.pickup_code = Some(pickup_code);
        self.pickup_expires_at = Some(pickup_expires_at);
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// PROCESSING -> FAILED with a diagnostic reason, keeping the
    /// provider's reference when the attempt got far enough to be
    /// assigned one. A referenceless failure (timeout, outage) never
    /// clears a reference recorded by an earlier attempt.
    pub fn fail(
        &mut self,
        provider_reference: Option<String>,
        reason: String,
    ) -> Result<(), DomainError> {
        self.transition(&[PayoutStatus::Processing], PayoutStatus::Failed, "fail")?;
        if provider_reference.is_some() {
            self.provider_reference = provider_reference;
        }
        self.failure_reason = Some(reason);
        Ok(())
    }

    /// FAILED -> PENDING, incrementing the retry counter and clearing
    /// the previous failure reason.
    pub fn prepare_retry(&mut self) -> Result<(), DomainError> {
        self.transition(&[PayoutStatus::Failed], PayoutStatus::Pending, "retry")?;
        self.retry_count += 1;
        self.failure_reason = None;
        Ok(())
    }

    /// {PENDING, FAILED} -> CANCELLED (terminal).
    pub fn cancel(&mut self, reason: String) -> Result<(), DomainError> {
        self.transition(
            &[PayoutStatus::Pending, PayoutStatus::Failed],
            PayoutStatus::Cancelled,
            "cancel",
        )?;
        self.failure_reason = Some(reason);
        Ok(())
    }

    /// True for states this engine never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            PayoutStatus::Completed | PayoutStatus::ReadyForPickup | PayoutStatus::Cancelled
        )
    }
}
