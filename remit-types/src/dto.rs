//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Corridor, CurrencyCode, ExchangeRate, LockId, LockedRate, Money, PayoutMethod,
    RecipientDetails, TransferId,
};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Rate & lock DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to lock the current rate for a bounded window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockRateRequest {
    #[schema(example = "SGD")]
    pub source_currency: String,
    #[schema(example = "PHP")]
    pub target_currency: String,
    /// How long the locked rate stays valid.
    #[schema(example = 30)]
    pub duration_seconds: u32,
}

/// A locked rate as returned to callers, with the derived expiry flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockedRateResponse {
    pub lock_id: LockId,
    pub rate: ExchangeRate,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

impl From<LockedRate> for LockedRateResponse {
    fn from(lock: LockedRate) -> Self {
        let expired = lock.is_expired(Utc::now());
        Self {
            lock_id: lock.lock_id,
            rate: lock.rate,
            locked_at: lock.locked_at,
            expires_at: lock.expires_at,
            expired,
        }
    }
}

/// Request to extend a live lock.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendLockRequest {
    /// Seconds to add beyond the current expiry.
    #[schema(example = 30)]
    pub additional_seconds: u32,
}

/// Corridor listing envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorridorsResponse {
    pub corridors: Vec<Corridor>,
}

/// Query parameters for a total-cost quote.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuoteParams {
    pub from: String,
    pub to: String,
    /// Source amount as a decimal string.
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
}

/// A total-cost quote combining a fresh rate with corridor fees and margin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub source_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    #[schema(value_type = String, example = "150.00")]
    pub source_amount: Decimal,
    /// Provider mid-rate the quote is based on.
    #[schema(value_type = String, example = "39.75")]
    pub mid_rate: Decimal,
    /// Mid-rate after the corridor margin is applied.
    #[schema(value_type = String, example = "39.551250")]
    pub effective_rate: Decimal,
    pub fee: Money,
    /// Source amount plus fee.
    pub total_cost: Money,
    /// What the recipient receives at the effective rate.
    pub recipient_gets: Money,
    pub valid_until: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payout DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to initiate a payout for a funded transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePayoutRequest {
    pub transfer_id: TransferId,
    #[schema(value_type = String, example = "5000.00")]
    pub amount: Decimal,
    #[schema(example = "PHP")]
    pub currency: String,
    pub method: PayoutMethod,
    pub recipient: RecipientDetails,
}

/// Request to cancel a payout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancelPayoutRequest {
    #[schema(example = "sender requested cancellation")]
    pub reason: String,
}

/// Pickup code details for a cash-pickup payout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupCodeResponse {
    #[schema(example = "48201937")]
    pub pickup_code: String,
    pub pickup_expires_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Event stream schema
// ─────────────────────────────────────────────────────────────────────────────

/// The "transfer funded" message consumed from the event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFundedEvent {
    pub transfer_id: TransferId,
    pub amount: Decimal,
    pub currency: String,
    /// Raw method string; mapping to the enum is a consumer policy.
    pub payout_method: String,
    pub recipient: EventRecipient,
}

/// Flat recipient payload from the event stream; the shape used depends
/// on the payout method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecipient {
    #[serde(rename = "type")]
    pub recipient_type: Option<String>,
    pub bank_name: Option<String>,
    pub bank_code: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub wallet_provider: Option<String>,
    pub mobile_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
}

impl EventRecipient {
    /// Builds the immutable recipient snapshot for `method`, failing if
    /// the fields that method requires are missing.
    pub fn into_details(self, method: PayoutMethod) -> Result<RecipientDetails, DomainError> {
        fn require(field: Option<String>, name: &str) -> Result<String, DomainError> {
            field.ok_or_else(|| DomainError::Validation(format!("recipient.{} is required", name)))
        }
        match method {
            PayoutMethod::BankAccount => Ok(RecipientDetails::BankAccount {
                bank_name: require(self.bank_name, "bankName")?,
                bank_code: require(self.bank_code, "bankCode")?,
                account_number: require(self.account_number, "accountNumber")?,
                account_name: require(self.account_name, "accountName")?,
            }),
            PayoutMethod::MobileWallet => Ok(RecipientDetails::MobileWallet {
                wallet_provider: require(self.wallet_provider, "walletProvider")?,
                mobile_number: require(self.mobile_number, "mobileNumber")?,
            }),
            PayoutMethod::CashPickup => Ok(RecipientDetails::CashPickup {
                first_name: require(self.first_name, "firstName")?,
                last_name: require(self.last_name, "lastName")?,
                country: require(self.country, "country")?,
            }),
        }
    }
}
