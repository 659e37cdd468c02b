//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use remit_types::domain::{LockId, PayoutId};
use remit_types::dto::{
    CancelPayoutRequest, ExtendLockRequest, InitiatePayoutRequest, LockRateRequest, QuoteParams,
};
use remit_types::error::{AppError, DomainError, PayoutError};
use remit_types::ports::{LockStore, PayoutProvider, PayoutStore, RateCache, RateProvider};

use crate::service::{PayoutService, QuoteService};

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        ApiError(err.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Gone(msg) => (StatusCode::GONE, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let mut body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });
        // 410 callers re-lock rather than re-check; flag it explicitly.
        if status == StatusCode::GONE {
            body["expired"] = serde_json::Value::Bool(true);
        }

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates, locks, corridors, quotes
// ─────────────────────────────────────────────────────────────────────────────

/// Current rate for a currency pair.
#[tracing::instrument(skip(service))]
pub async fn get_rate<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Path((from, to)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let rate = service.get_rate(&from, &to).await?;
    Ok(Json(rate))
}

/// Lock the current rate for a bounded window.
#[tracing::instrument(skip(service, req), fields(source = %req.source_currency, target = %req.target_currency))]
pub async fn lock_rate<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Json(req): Json<LockRateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lock = service.lock_rate(req).await?;
    Ok(Json(lock))
}

/// Read a lock back by id.
#[tracing::instrument(skip(service), fields(lock_id = %id))]
pub async fn get_locked_rate<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lock_id = parse_lock_id(&id)?;
    let lock = service.get_locked_rate(lock_id).await?;
    Ok(Json(lock))
}

/// Release a lock before its expiry.
#[tracing::instrument(skip(service), fields(lock_id = %id))]
pub async fn release_lock<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lock_id = parse_lock_id(&id)?;
    service.release_lock(lock_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Extend a live lock.
#[tracing::instrument(skip(service, req), fields(lock_id = %id))]
pub async fn extend_lock<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Path(id): Path<String>,
    Json(req): Json<ExtendLockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lock_id = parse_lock_id(&id)?;
    let lock = service.extend_lock(lock_id, req).await?;
    Ok(Json(lock))
}

#[derive(Debug, Deserialize)]
pub struct CorridorsQuery {
    pub source: Option<String>,
}

/// List configured corridors, optionally filtered by source currency.
#[tracing::instrument(skip(service))]
pub async fn list_corridors<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Query(query): Query<CorridorsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let corridors = service.corridors(query.source.as_deref())?;
    Ok(Json(corridors))
}

/// Total-cost quote for a corridor and amount.
#[tracing::instrument(skip(service, params), fields(from = %params.from, to = %params.to))]
pub async fn quote<P: RateProvider, C: RateCache, L: LockStore>(
    State(service): State<Arc<QuoteService<P, C, L>>>,
    Query(params): Query<QuoteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = service.quote(params).await?;
    Ok(Json(quote))
}

fn parse_lock_id(raw: &str) -> Result<LockId, ApiError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid lock ID".into()).into())
}

// ─────────────────────────────────────────────────────────────────────────────
// Payouts
// ─────────────────────────────────────────────────────────────────────────────

/// Initiate a payout for a funded transfer.
#[tracing::instrument(skip(service, req), fields(transfer_id = %req.transfer_id))]
pub async fn initiate_payout<S: PayoutStore, P: PayoutProvider>(
    State(service): State<Arc<PayoutService<S, P>>>,
    Json(req): Json<InitiatePayoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payout = service.initiate(req).await?;
    Ok((StatusCode::CREATED, Json(payout)))
}

/// Get a payout by id.
#[tracing::instrument(skip(service), fields(payout_id = %id))]
pub async fn get_payout<S: PayoutStore, P: PayoutProvider>(
    State(service): State<Arc<PayoutService<S, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payout_id = parse_payout_id(&id)?;
    let payout = service.get(payout_id).await?;
    Ok(Json(payout))
}

/// Retry a failed payout.
#[tracing::instrument(skip(service), fields(payout_id = %id))]
pub async fn retry_payout<S: PayoutStore, P: PayoutProvider>(
    State(service): State<Arc<PayoutService<S, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payout_id = parse_payout_id(&id)?;
    let payout = service.retry(payout_id).await?;
    Ok(Json(payout))
}

/// Cancel a pending or failed payout.
#[tracing::instrument(skip(service, req), fields(payout_id = %id))]
pub async fn cancel_payout<S: PayoutStore, P: PayoutProvider>(
    State(service): State<Arc<PayoutService<S, P>>>,
    Path(id): Path<String>,
    Json(req): Json<CancelPayoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payout_id = parse_payout_id(&id)?;
    let payout = service.cancel(payout_id, req.reason).await?;
    Ok(Json(payout))
}

/// Pickup code for a cash-pickup payout.
#[tracing::instrument(skip(service), fields(payout_id = %id))]
pub async fn pickup_code<S: PayoutStore, P: PayoutProvider>(
    State(service): State<Arc<PayoutService<S, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payout_id = parse_payout_id(&id)?;
    let code = service.pickup_code(payout_id).await?;
    Ok(Json(code))
}

fn parse_payout_id(raw: &str) -> Result<PayoutId, ApiError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid payout ID".into()).into())
}
