//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use remit_types::domain::{
    Corridor, CurrencyCode, ExchangeRate, LockId, Money, Payout, PayoutId, PayoutMethod,
    PayoutStatus, RecipientDetails, TransferId,
};
use remit_types::dto::{
    CancelPayoutRequest, CorridorsResponse, ExtendLockRequest, InitiatePayoutRequest,
    LockRateRequest, LockedRateResponse, PickupCodeResponse, QuoteParams, QuoteResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Get the current exchange rate for a currency pair
#[utoipa::path(
    get,
    path = "/api/rates/{from}/{to}",
    tag = "rates",
    params(
        ("from" = String, Path, description = "Source currency code (ISO 4217)"),
        ("to" = String, Path, description = "Target currency code (ISO 4217)")
    ),
    responses(
        (status = 200, description = "Current rate with bid/ask spread", body = ExchangeRate),
        (status = 400, description = "Invalid currency code"),
        (status = 404, description = "No rate available for the pair"),
        (status = 503, description = "Rate provider unavailable")
    )
)]
async fn get_rate() {}

/// Lock the current rate for a bounded window
#[utoipa::path(
    post,
    path = "/api/rates/lock",
    tag = "rates",
    request_body = LockRateRequest,
    responses(
        (status = 200, description = "Rate locked", body = LockedRateResponse),
        (status = 400, description = "Invalid currency code or lock duration"),
        (status = 404, description = "No rate available for the pair"),
        (status = 503, description = "Rate provider unavailable")
    )
)]
async fn lock_rate() {}

/// Get a locked rate by id
#[utoipa::path(
    get,
    path = "/api/rates/locked/{id}",
    tag = "rates",
    params(
        ("id" = LockId, Path, description = "Lock ID (UUID)")
    ),
    responses(
        (status = 200, description = "Locked rate", body = LockedRateResponse),
        (status = 404, description = "Lock not found"),
        (status = 410, description = "Lock expired")
    )
)]
async fn get_locked_rate() {}

/// Release a lock before its expiry
#[utoipa::path(
    delete,
    path = "/api/rates/locked/{id}",
    tag = "rates",
    params(
        ("id" = LockId, Path, description = "Lock ID (UUID)")
    ),
    responses(
        (status = 204, description = "Lock released"),
        (status = 404, description = "Lock not found")
    )
)]
async fn release_lock() {}

/// Extend a live lock
#[utoipa::path(
    post,
    path = "/api/rates/locked/{id}/extend",
    tag = "rates",
    request_body = ExtendLockRequest,
    params(
        ("id" = LockId, Path, description = "Lock ID (UUID)")
    ),
    responses(
        (status = 200, description = "Extended lock", body = LockedRateResponse),
        (status = 400, description = "Invalid extension window"),
        (status = 404, description = "Lock not found or already lapsed"),
        (status = 410, description = "Lock expired")
    )
)]
async fn extend_lock() {}

/// List configured corridors
#[utoipa::path(
    get,
    path = "/api/corridors",
    tag = "quotes",
    params(
        ("source" = Option<String>, Query, description = "Restrict to a source currency")
    ),
    responses(
        (status = 200, description = "Configured corridors", body = CorridorsResponse),
        (status = 400, description = "Invalid currency code")
    )
)]
async fn list_corridors() {}

/// Total-cost quote for a corridor and amount
#[utoipa::path(
    get,
    path = "/api/quote",
    tag = "quotes",
    params(
        ("from" = String, Query, description = "Source currency code"),
        ("to" = String, Query, description = "Target currency code"),
        ("amount" = String, Query, description = "Source amount as a decimal string")
    ),
    responses(
        (status = 200, description = "Quote with fee, margin and recipient amount", body = QuoteResponse),
        (status = 400, description = "Invalid input or disabled corridor"),
        (status = 404, description = "No corridor or rate for the pair"),
        (status = 503, description = "Rate provider unavailable")
    )
)]
async fn quote() {}

/// Initiate a payout for a funded transfer
#[utoipa::path(
    post,
    path = "/api/payouts",
    tag = "payouts",
    request_body = InitiatePayoutRequest,
    responses(
        (status = 201, description = "Payout after its first disbursement attempt", body = Payout),
        (status = 400, description = "Invalid request")
    )
)]
async fn initiate_payout() {}

/// Get a payout by id
#[utoipa::path(
    get,
    path = "/api/payouts/{id}",
    tag = "payouts",
    params(
        ("id" = PayoutId, Path, description = "Payout ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payout details", body = Payout),
        (status = 404, description = "Payout not found")
    )
)]
async fn get_payout() {}

/// Retry a failed payout
#[utoipa::path(
    post,
    path = "/api/payouts/{id}/retry",
    tag = "payouts",
    params(
        ("id" = PayoutId, Path, description = "Payout ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payout after the retry attempt", body = Payout),
        (status = 400, description = "Payout is not in a retryable state"),
        (status = 404, description = "Payout not found"),
        (status = 409, description = "Retry limit exceeded")
    )
)]
async fn retry_payout() {}

/// Cancel a pending or failed payout
#[utoipa::path(
    post,
    path = "/api/payouts/{id}/cancel",
    tag = "payouts",
    request_body = CancelPayoutRequest,
    params(
        ("id" = PayoutId, Path, description = "Payout ID (UUID)")
    ),
    responses(
        (status = 200, description = "Cancelled payout", body = Payout),
        (status = 400, description = "Payout is not cancellable"),
        (status = 404, description = "Payout not found")
    )
)]
async fn cancel_payout() {}

/// Pickup code for a cash-pickup payout
#[utoipa::path(
    get,
    path = "/api/payouts/{id}/pickup-code",
    tag = "payouts",
    params(
        ("id" = PayoutId, Path, description = "Payout ID (UUID)")
    ),
    responses(
        (status = 200, description = "Pickup code and its expiry", body = PickupCodeResponse),
        (status = 400, description = "Not a cash pickup, or no code issued yet"),
        (status = 404, description = "Payout not found")
    )
)]
async fn pickup_code() {}

/// OpenAPI documentation for the remittance API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quote Lock and Settlement API",
        version = "1.0.0",
        description = "Cross-border remittance engine: exchange rates with bid/ask spread, bounded rate locks, total-cost quotes, and payout disbursement with retries.",
        license(name = "MIT"),
    ),
    paths(
        health,
        get_rate,
        lock_rate,
        get_locked_rate,
        release_lock,
        extend_lock,
        list_corridors,
        quote,
        initiate_payout,
        get_payout,
        retry_payout,
        cancel_payout,
        pickup_code,
    ),
    components(
        schemas(
            ExchangeRate,
            LockId,
            LockRateRequest,
            LockedRateResponse,
            ExtendLockRequest,
            Corridor,
            CorridorsResponse,
            QuoteParams,
            QuoteResponse,
            Money,
            CurrencyCode,
            Payout,
            PayoutId,
            TransferId,
            PayoutMethod,
            PayoutStatus,
            RecipientDetails,
            InitiatePayoutRequest,
            CancelPayoutRequest,
            PickupCodeResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Exchange rates and rate locks"),
        (name = "quotes", description = "Corridors and total-cost quotes"),
        (name = "payouts", description = "Payout initiation and lifecycle"),
    )
)]
pub struct ApiDoc;
