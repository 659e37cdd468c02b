//! Service-level tests using in-memory adapters and mock providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fx_rates::RateTable;
use remit_adapters::{
    InMemoryEventLog, InMemoryLockStore, InMemoryPayoutStore, InMemoryRateCache, PayoutSimConfig,
    SimulatedPayoutProvider,
};
use remit_types::domain::{
    CurrencyPair, ExchangeRate, Payout, PayoutMethod, PayoutStatus, RecipientDetails, TransferId,
};
use remit_types::dto::{ExtendLockRequest, InitiatePayoutRequest, LockRateRequest, QuoteParams};
use remit_types::error::{AppError, PayoutError, ProviderError, RateError, StoreError};
use remit_types::ports::{EventLog, PayoutProvider, PayoutReceipt, RateCache, RateProvider};

use crate::ingress::{EventIngress, IngressConfig, UnknownMethodPolicy};
use crate::service::{PayoutPolicy, PayoutService, QuoteService};

// ─────────────────────────────────────────────────────────────────────────────
// Mock providers
// ─────────────────────────────────────────────────────────────────────────────

/// Rate provider with a fixed mid-rate and a call counter, so tests can
/// prove whether a read hit the cache or the provider.
struct FixedRateProvider {
    mid: Decimal,
    validity: chrono::Duration,
    calls: Arc<AtomicUsize>,
}

impl FixedRateProvider {
    fn new(mid: Decimal, validity: chrono::Duration) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                mid,
                validity,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn quote(&self, pair: &CurrencyPair) -> ExchangeRate {
        let now = Utc::now();
        ExchangeRate {
            source_currency: pair.source.clone(),
            target_currency: pair.target.clone(),
            mid_rate: self.mid,
            bid_rate: self.mid * dec!(0.9975),
            ask_rate: self.mid * dec!(1.0025),
            spread_percent: dec!(0.5),
            provider_name: "fixed".into(),
            fetched_at: now,
            valid_until: now + self.validity,
        }
    }
}

#[async_trait::async_trait]
impl RateProvider for FixedRateProvider {
    async fn get_rate(&self, pair: &CurrencyPair) -> Result<ExchangeRate, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.quote(pair))
    }

    async fn get_rates(&self, pairs: &[CurrencyPair]) -> Result<Vec<ExchangeRate>, RateError> {
        pairs.iter().map(|p| Ok(self.quote(p))).collect()
    }
}

/// Provider that never answers, for exercising the call deadline.
struct HangingPayoutProvider;

#[async_trait::async_trait]
impl PayoutProvider for HangingPayoutProvider {
    async fn process_payout(&self, _payout: &Payout) -> Result<PayoutReceipt, ProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(ProviderError::Unavailable("unreachable".into()))
    }

    async fn check_status(&self, _reference: &str) -> Result<PayoutStatus, ProviderError> {
        Ok(PayoutStatus::Processing)
    }

    async fn cancel_payout(&self, _reference: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Cache whose reads always fail, for exercising store-fault handling.
struct FailingRateCache;

#[async_trait::async_trait]
impl RateCache for FailingRateCache {
    async fn get(&self, _pair: &CurrencyPair) -> Result<Option<ExchangeRate>, StoreError> {
        Err(StoreError::Storage("cache backend unreachable".into()))
    }

    async fn put(&self, _rate: &ExchangeRate, _ttl: Duration) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Provider that declines every disbursement, reporting a reference
/// and counting provider-side cancellations.
struct DecliningPayoutProvider {
    reference: String,
    cancels: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl PayoutProvider for DecliningPayoutProvider {
    async fn process_payout(&self, _payout: &Payout) -> Result<PayoutReceipt, ProviderError> {
        Ok(PayoutReceipt {
            provider_reference: self.reference.clone(),
            status: PayoutStatus::Failed,
            failure_reason: Some("insufficient partner float".into()),
            pickup_code: None,
            pickup_expires_at: None,
        })
    }

    async fn check_status(&self, _reference: &str) -> Result<PayoutStatus, ProviderError> {
        Ok(PayoutStatus::Failed)
    }

    async fn cancel_payout(&self, _reference: &str) -> Result<(), ProviderError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

type TestQuoteService = QuoteService<FixedRateProvider, InMemoryRateCache, InMemoryLockStore>;

fn quote_service(validity: chrono::Duration) -> (TestQuoteService, Arc<AtomicUsize>) {
    let (provider, calls) = FixedRateProvider::new(dec!(39.75), validity);
    let service = QuoteService::new(
        provider,
        InMemoryRateCache::new(),
        InMemoryLockStore::new(),
        remit_types::domain::Corridor::builtin(),
    );
    (service, calls)
}

fn sim_payout_service(
    failure_rate: f64,
) -> Arc<PayoutService<InMemoryPayoutStore, SimulatedPayoutProvider>> {
    let provider = SimulatedPayoutProvider::new(PayoutSimConfig {
        latency: Duration::from_millis(1),
        failure_rate,
        pickup_validity: chrono::Duration::hours(72),
    });
    Arc::new(PayoutService::new(InMemoryPayoutStore::new(), provider))
}

fn bank_request() -> InitiatePayoutRequest {
    InitiatePayoutRequest {
        transfer_id: TransferId::new(),
        amount: dec!(5000.00),
        currency: "PHP".into(),
        method: PayoutMethod::BankAccount,
        recipient: RecipientDetails::BankAccount {
            bank_name: "BDO".into(),
            bank_code: "010530667".into(),
            account_number: "001234567890".into(),
            account_name: "Maria Santos".into(),
        },
    }
}

fn pickup_request() -> InitiatePayoutRequest {
    InitiatePayoutRequest {
        transfer_id: TransferId::new(),
        amount: dec!(5000.00),
        currency: "PHP".into(),
        method: PayoutMethod::CashPickup,
        recipient: RecipientDetails::CashPickup {
            first_name: "Maria".into(),
            last_name: "Santos".into(),
            country: "PH".into(),
        },
    }
}

fn lock_request(duration_seconds: u32) -> LockRateRequest {
    LockRateRequest {
        source_currency: "SGD".into(),
        target_currency: "PHP".into(),
        duration_seconds,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates and caching
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_rate_serves_second_read_from_cache() {
    let (service, calls) = quote_service(chrono::Duration::seconds(30));

    let first = service.get_rate("SGD", "PHP").await.unwrap();
    let second = service.get_rate("SGD", "PHP").await.unwrap();

    assert_eq!(first.mid_rate, second.mid_rate);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_rate_goes_back_to_provider_after_validity_lapses() {
    let (service, calls) = quote_service(chrono::Duration::milliseconds(50));

    service.get_rate("SGD", "PHP").await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    service.get_rate("SGD", "PHP").await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_get_rate_rejects_invalid_currency_code() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));
    let err = service.get_rate("SG", "PHP").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_cache_read_failure_is_fatal() {
    let (provider, _) = FixedRateProvider::new(dec!(39.75), chrono::Duration::seconds(30));
    let service = QuoteService::new(
        provider,
        FailingRateCache,
        InMemoryLockStore::new(),
        remit_types::domain::Corridor::builtin(),
    );

    let err = service.get_rate("SGD", "PHP").await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate locks
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lock_rate_bypasses_the_cache() {
    let (service, calls) = quote_service(chrono::Duration::seconds(30));

    service.get_rate("SGD", "PHP").await.unwrap();
    let lock = service.lock_rate(lock_request(60)).await.unwrap();

    // A cached quote would have kept the count at 1.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!lock.expired);

    let read_back = service.get_locked_rate(lock.lock_id).await.unwrap();
    assert_eq!(read_back.rate.mid_rate, lock.rate.mid_rate);
}

#[tokio::test]
async fn test_lock_duration_bounds_enforced() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));

    let zero = service.lock_rate(lock_request(0)).await.unwrap_err();
    assert!(matches!(zero, AppError::BadRequest(_)));

    let oversized = service.lock_rate(lock_request(301)).await.unwrap_err();
    assert!(matches!(oversized, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_expired_lock_is_gone_then_not_found() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));
    let lock = service.lock_rate(lock_request(1)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    // First read observes the lapse and deletes the record.
    let first = service.get_locked_rate(lock.lock_id).await.unwrap_err();
    assert!(matches!(first, AppError::Gone(_)));

    let second = service.get_locked_rate(lock.lock_id).await.unwrap_err();
    assert!(matches!(second, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_release_lock_removes_it() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));
    let lock = service.lock_rate(lock_request(60)).await.unwrap();

    service.release_lock(lock.lock_id).await.unwrap();

    let err = service.get_locked_rate(lock.lock_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_extend_lock_moves_expiry_out() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));
    let lock = service.lock_rate(lock_request(30)).await.unwrap();

    let extended = service
        .extend_lock(lock.lock_id, ExtendLockRequest {
            additional_seconds: 30,
        })
        .await
        .unwrap();

    assert_eq!(
        extended.expires_at,
        lock.expires_at + chrono::Duration::seconds(30)
    );
    assert_eq!(extended.rate.mid_rate, lock.rate.mid_rate);
}

// ─────────────────────────────────────────────────────────────────────────────
// Corridors and quotes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_corridors_filter_by_source_currency() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));

    let usd = service.corridors(Some("USD")).unwrap();
    assert!(!usd.corridors.is_empty());
    assert!(usd.corridors.iter().all(|c| c.source_currency.as_str() == "USD"));

    let all = service.corridors(None).unwrap();
    assert!(all.corridors.len() > usd.corridors.len());
}

#[tokio::test]
async fn test_quote_applies_fee_floor_and_margin() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));

    let quote = service
        .quote(QuoteParams {
            from: "SGD".into(),
            to: "PHP".into(),
            amount: dec!(150.00),
        })
        .await
        .unwrap();

    // 1% of 150.00 is 1.50, below the 2.00 corridor floor.
    assert_eq!(quote.fee.amount, dec!(2.00));
    assert_eq!(quote.total_cost.amount, dec!(152.00));
    assert_eq!(quote.mid_rate, dec!(39.75));
    // 0.5% margin off the mid.
    assert_eq!(quote.effective_rate, dec!(39.55125));
    assert_eq!(quote.recipient_gets.amount, dec!(150.00) * dec!(39.55125));
    assert_eq!(quote.recipient_gets.currency.as_str(), "PHP");
}

#[tokio::test]
async fn test_quote_percentage_fee_when_above_floor() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));

    let quote = service
        .quote(QuoteParams {
            from: "SGD".into(),
            to: "PHP".into(),
            amount: dec!(1000.00),
        })
        .await
        .unwrap();

    assert_eq!(quote.fee.amount, dec!(10.00));
    assert_eq!(quote.total_cost.amount, dec!(1010.00));
}

#[tokio::test]
async fn test_quote_rejects_unknown_and_disabled_corridors() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));

    let unknown = service
        .quote(QuoteParams {
            from: "PHP".into(),
            to: "SGD".into(),
            amount: dec!(100),
        })
        .await
        .unwrap_err();
    assert!(matches!(unknown, AppError::NotFound(_)));

    let disabled = service
        .quote(QuoteParams {
            from: "SGD".into(),
            to: "MMK".into(),
            amount: dec!(100),
        })
        .await
        .unwrap_err();
    assert!(matches!(disabled, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_quote_rejects_non_positive_amount() {
    let (service, _) = quote_service(chrono::Duration::seconds(30));

    let err = service
        .quote(QuoteParams {
            from: "SGD".into(),
            to: "PHP".into(),
            amount: dec!(0),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Payout lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bank_payout_completes() {
    let service = sim_payout_service(0.0);

    let payout = service.initiate(bank_request()).await.unwrap();

    assert_eq!(payout.status, PayoutStatus::Completed);
    assert!(payout.provider_reference.as_deref().unwrap().starts_with("SIM-"));
    assert!(payout.completed_at.is_some());
}

#[tokio::test]
async fn test_cash_pickup_issues_a_code() {
    let service = sim_payout_service(0.0);

    let payout = service.initiate(pickup_request()).await.unwrap();
    assert_eq!(payout.status, PayoutStatus::ReadyForPickup);

    let code = service.pickup_code(payout.id).await.unwrap();
    assert_eq!(code.pickup_code.len(), 8);
    assert!(code.pickup_code.chars().all(|c| c.is_ascii_digit()));
    assert!(code.pickup_expires_at > Utc::now());
}

#[tokio::test]
async fn test_declined_disbursement_lands_in_failed_with_reason() {
    let service = sim_payout_service(100.0);

    let payout = service.initiate(bank_request()).await.unwrap();

    assert_eq!(payout.status, PayoutStatus::Failed);
    assert!(payout.failure_reason.is_some());
    assert_eq!(payout.retry_count, 0);
}

#[tokio::test]
async fn test_declined_payout_keeps_reference_and_cancel_notifies_provider() {
    let cancels = Arc::new(AtomicUsize::new(0));
    let service = PayoutService::new(
        InMemoryPayoutStore::new(),
        DecliningPayoutProvider {
            reference: "SIM-declined-7".into(),
            cancels: cancels.clone(),
        },
    );

    let payout = service.initiate(bank_request()).await.unwrap();
    assert_eq!(payout.status, PayoutStatus::Failed);
    assert_eq!(payout.provider_reference.as_deref(), Some("SIM-declined-7"));

    let cancelled = service
        .cancel(payout.id, "sender gave up".into())
        .await
        .unwrap();
    assert_eq!(cancelled.status, PayoutStatus::Cancelled);
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_initiate_is_idempotent_per_transfer() {
    let service = sim_payout_service(0.0);
    let request = bank_request();

    let first = service.initiate(request.clone()).await.unwrap();
    let second = service.initiate(request).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.status, PayoutStatus::Completed);
}

#[tokio::test]
async fn test_retry_limit_enforced() {
    let service = sim_payout_service(100.0);

    let payout = service.initiate(bank_request()).await.unwrap();
    assert_eq!(payout.status, PayoutStatus::Failed);

    for expected_count in 1..=3 {
        let retried = service.retry(payout.id).await.unwrap();
        assert_eq!(retried.status, PayoutStatus::Failed);
        assert_eq!(retried.retry_count, expected_count);
    }

    let err = service.retry(payout.id).await.unwrap_err();
    assert!(matches!(
        err,
        PayoutError::RetryLimitExceeded { count: 3, max: 3 }
    ));
}

#[tokio::test]
async fn test_retry_rejected_for_completed_payout() {
    let service = sim_payout_service(0.0);
    let payout = service.initiate(bank_request()).await.unwrap();

    let err = service.retry(payout.id).await.unwrap_err();
    assert!(matches!(
        err,
        PayoutError::InvalidState {
            status: PayoutStatus::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_cancel_failed_payout_is_terminal() {
    let service = sim_payout_service(100.0);
    let payout = service.initiate(bank_request()).await.unwrap();

    let cancelled = service
        .cancel(payout.id, "sender requested cancellation".into())
        .await
        .unwrap();
    assert_eq!(cancelled.status, PayoutStatus::Cancelled);
    assert_eq!(
        cancelled.failure_reason.as_deref(),
        Some("sender requested cancellation")
    );

    let err = service.cancel(payout.id, "again".into()).await.unwrap_err();
    assert!(matches!(err, PayoutError::InvalidState { .. }));
}

#[tokio::test]
async fn test_provider_deadline_records_a_failed_attempt() {
    let service = PayoutService::with_policy(
        InMemoryPayoutStore::new(),
        HangingPayoutProvider,
        PayoutPolicy {
            max_retries: 3,
            provider_timeout: Duration::from_millis(50),
        },
    );

    let payout = service.initiate(bank_request()).await.unwrap();

    assert_eq!(payout.status, PayoutStatus::Failed);
    assert!(
        payout
            .failure_reason
            .as_deref()
            .unwrap()
            .contains("cancelled")
    );
}

#[tokio::test]
async fn test_pickup_code_rejected_for_bank_payout() {
    let service = sim_payout_service(0.0);
    let payout = service.initiate(bank_request()).await.unwrap();

    let err = service.pickup_code(payout.id).await.unwrap_err();
    assert!(matches!(err, PayoutError::NotCashPickup));
}

#[tokio::test]
async fn test_pickup_code_not_ready_before_disbursement_succeeds() {
    let service = sim_payout_service(100.0);
    let payout = service.initiate(pickup_request()).await.unwrap();
    assert_eq!(payout.status, PayoutStatus::Failed);

    let err = service.pickup_code(payout.id).await.unwrap_err();
    assert!(matches!(err, PayoutError::PickupNotReady));
}

#[tokio::test]
async fn test_unknown_payout_returns_not_found() {
    let service = sim_payout_service(0.0);
    let err = service
        .get(remit_types::domain::PayoutId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PayoutError::NotFound));
}

// ─────────────────────────────────────────────────────────────────────────────
// Event ingress
// ─────────────────────────────────────────────────────────────────────────────

fn funded_event(transfer_id: TransferId, method: &str) -> Vec<u8> {
    serde_json::json!({
        "transferId": transfer_id.to_string(),
        "amount": "5000.00",
        "currency": "PHP",
        "payoutMethod": method,
        "recipient": {
            "type": "BANK_ACCOUNT",
            "bankName": "BDO",
            "bankCode": "010530667",
            "accountNumber": "001234567890",
            "accountName": "Maria Santos"
        }
    })
    .to_string()
    .into_bytes()
}

fn ingress_with_policy(
    policy: UnknownMethodPolicy,
) -> (
    Arc<InMemoryEventLog>,
    Arc<PayoutService<InMemoryPayoutStore, SimulatedPayoutProvider>>,
    EventIngress<InMemoryEventLog, InMemoryPayoutStore, SimulatedPayoutProvider>,
) {
    let log = Arc::new(InMemoryEventLog::new(4));
    let payouts = sim_payout_service(0.0);
    let ingress = EventIngress::new(
        log.clone(),
        payouts.clone(),
        IngressConfig {
            unknown_method_policy: policy,
            ..IngressConfig::default()
        },
    );
    (log, payouts, ingress)
}

#[tokio::test]
async fn test_ingress_turns_funded_transfer_into_payout() {
    let (log, payouts, ingress) = ingress_with_policy(UnknownMethodPolicy::DefaultToBankAccount);

    let transfer_id = TransferId::new();
    log.append(&transfer_id.to_string(), funded_event(transfer_id, "BANK_ACCOUNT"))
        .await
        .unwrap();

    assert_eq!(ingress.drain_once().await, 1);

    let payout = payouts.by_transfer(transfer_id).await.unwrap();
    assert_eq!(payout.status, PayoutStatus::Completed);
    assert_eq!(payout.method, PayoutMethod::BankAccount);
}

#[tokio::test]
async fn test_ingress_drops_malformed_event_and_keeps_going() {
    let (log, payouts, ingress) = ingress_with_policy(UnknownMethodPolicy::DefaultToBankAccount);

    log.append("bad", b"{not json".to_vec()).await.unwrap();
    let transfer_id = TransferId::new();
    log.append(&transfer_id.to_string(), funded_event(transfer_id, "BANK_ACCOUNT"))
        .await
        .unwrap();

    assert_eq!(ingress.drain_once().await, 2);

    // The malformed record is gone, the good one went through.
    assert!(payouts.by_transfer(transfer_id).await.is_ok());
    assert_eq!(ingress.drain_once().await, 0);
}

#[tokio::test]
async fn test_ingress_unknown_method_defaults_to_bank_account() {
    let (log, payouts, ingress) = ingress_with_policy(UnknownMethodPolicy::DefaultToBankAccount);

    let transfer_id = TransferId::new();
    log.append(&transfer_id.to_string(), funded_event(transfer_id, "CARRIER_PIGEON"))
        .await
        .unwrap();
    ingress.drain_once().await;

    let payout = payouts.by_transfer(transfer_id).await.unwrap();
    assert_eq!(payout.method, PayoutMethod::BankAccount);
}

#[tokio::test]
async fn test_ingress_unknown_method_rejected_under_strict_policy() {
    let (log, payouts, ingress) = ingress_with_policy(UnknownMethodPolicy::Reject);

    let transfer_id = TransferId::new();
    log.append(&transfer_id.to_string(), funded_event(transfer_id, "CARRIER_PIGEON"))
        .await
        .unwrap();
    ingress.drain_once().await;

    let err = payouts.by_transfer(transfer_id).await.unwrap_err();
    assert!(matches!(err, PayoutError::NotFound));
}

// Keep the table type exercised here so the fixture stays aligned with
// the simulated provider's built-in pairs.
#[tokio::test]
async fn test_builtin_rate_table_covers_builtin_corridors() {
    let table = RateTable::builtin();
    for corridor in remit_types::domain::Corridor::builtin() {
        if !corridor.enabled {
            continue;
        }
        let pair = CurrencyPair::new(corridor.source_currency, corridor.target_currency);
        assert!(
            table.pairs().any(|p| *p == pair) || table.pairs().any(|p| *p == pair.inverse()),
            "no direct or inverse base rate for corridor {}",
            pair
        );
    }
}
