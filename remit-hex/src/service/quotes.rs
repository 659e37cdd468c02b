//! Quote and rate-lock service.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use remit_types::domain::{Corridor, CurrencyPair, ExchangeRate, LockId, LockedRate, Money};
use remit_types::dto::{
    CorridorsResponse, ExtendLockRequest, LockRateRequest, LockedRateResponse, QuoteParams,
    QuoteResponse,
};
use remit_types::error::{AppError, DomainError};
use remit_types::ports::{LockStore, RateCache, RateProvider};

/// Bounds on caller-chosen lock windows.
#[derive(Debug, Clone)]
pub struct QuotePolicy {
    /// Longest a single lock or extension may run, in seconds.
    pub max_lock_seconds: u32,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        Self {
            max_lock_seconds: 300,
        }
    }
}

/// Orchestrates rate reads, rate locks, and total-cost quotes.
///
/// Rate reads are cache-aside over the provider. Locks are always taken
/// against a fresh provider quote - a cached rate may be up to its TTL
/// old, and a lock is a commitment the engine honors for its full
/// window.
pub struct QuoteService<P, C, L>
where
    P: RateProvider,
    C: RateCache,
    L: LockStore,
{
    provider: P,
    cache: C,
    locks: L,
    corridors: Vec<Corridor>,
    policy: QuotePolicy,
}

impl<P, C, L> QuoteService<P, C, L>
where
    P: RateProvider,
    C: RateCache,
    L: LockStore,
{
    pub fn new(provider: P, cache: C, locks: L, corridors: Vec<Corridor>) -> Self {
        Self::with_policy(provider, cache, locks, corridors, QuotePolicy::default())
    }

    pub fn with_policy(
        provider: P,
        cache: C,
        locks: L,
        corridors: Vec<Corridor>,
        policy: QuotePolicy,
    ) -> Self {
        Self {
            provider,
            cache,
            locks,
            corridors,
            policy,
        }
    }

    /// Returns the current rate for a pair, serving from the cache when
    /// a live entry exists. A cache read failure is a store fault and
    /// propagates.
    pub async fn get_rate(&self, source: &str, target: &str) -> Result<ExchangeRate, AppError> {
        let pair = CurrencyPair::parse(source, target)?;

        if let Some(rate) = self.cache.get(&pair).await? {
            tracing::debug!(%pair, "rate served from cache");
            return Ok(rate);
        }

        let rate = self.provider.get_rate(&pair).await?;
        self.cache_quote(&rate).await;
        Ok(rate)
    }

    /// Caches a quote for the remainder of its validity. The quote is
    /// already in hand here, so a cache write failure degrades to
    /// uncached reads instead of failing the request.
    async fn cache_quote(&self, rate: &ExchangeRate) {
        let ttl = (rate.valid_until - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        if ttl.is_zero() {
            return;
        }
        if let Err(err) = self.cache.put(rate, ttl).await {
            tracing::warn!(error = %err, "rate cache write failed");
        }
    }

    /// Locks a fresh quote for the requested window.
    pub async fn lock_rate(&self, req: LockRateRequest) -> Result<LockedRateResponse, AppError> {
        let pair = CurrencyPair::parse(&req.source_currency, &req.target_currency)?;
        self.check_window(req.duration_seconds)?;

        // Never lock a cached rate: the caller is buying a guarantee,
        // so the quote underneath it must be current.
        let rate = self.provider.get_rate(&pair).await?;
        let lock = LockedRate::new(rate, chrono::Duration::seconds(i64::from(req.duration_seconds)));
        self.locks.save(&lock).await?;

        tracing::info!(
            lock_id = %lock.lock_id,
            %pair,
            expires_at = %lock.expires_at,
            "rate locked"
        );
        Ok(lock.into())
    }

    /// Reads a lock back. A lapsed lock surfaces as `Gone`, an unknown
    /// one as `NotFound`.
    pub async fn get_locked_rate(&self, lock_id: LockId) -> Result<LockedRateResponse, AppError> {
        let lock = self.locks.get(lock_id).await?;
        Ok(lock.into())
    }

    /// Releases a live lock before its expiry.
    pub async fn release_lock(&self, lock_id: LockId) -> Result<(), AppError> {
        self.locks.delete(lock_id).await?;
        tracing::info!(%lock_id, "rate lock released");
        Ok(())
    }

    /// Pushes a live lock's expiry further out.
    pub async fn extend_lock(
        &self,
        lock_id: LockId,
        req: ExtendLockRequest,
    ) -> Result<LockedRateResponse, AppError> {
        self.check_window(req.additional_seconds)?;

        let current = self.locks.get(lock_id).await?;
        let new_expiry =
            current.expires_at + chrono::Duration::seconds(i64::from(req.additional_seconds));
        let extended = self.locks.extend(lock_id, new_expiry).await?;

        tracing::info!(%lock_id, expires_at = %extended.expires_at, "rate lock extended");
        Ok(extended.into())
    }

    fn check_window(&self, seconds: u32) -> Result<(), AppError> {
        if seconds == 0 {
            return Err(AppError::BadRequest(
                "Lock duration must be at least 1 second".into(),
            ));
        }
        if seconds > self.policy.max_lock_seconds {
            return Err(AppError::BadRequest(format!(
                "Lock duration exceeds maximum of {} seconds",
                self.policy.max_lock_seconds
            )));
        }
        Ok(())
    }

    /// Lists configured corridors, optionally restricted to a source
    /// currency. Disabled corridors are included with `enabled: false`.
    pub fn corridors(&self, source: Option<&str>) -> Result<CorridorsResponse, AppError> {
        let corridors = match source {
            Some(code) => {
                let source = remit_types::domain::CurrencyCode::parse(code)?;
                self.corridors
                    .iter()
                    .filter(|c| c.source_currency == source)
                    .cloned()
                    .collect()
            }
            None => self.corridors.clone(),
        };
        Ok(CorridorsResponse { corridors })
    }

    /// Produces a total-cost quote for sending `amount` along a
    /// corridor: fresh mid-rate, corridor margin applied, percentage
    /// fee with a floor.
    pub async fn quote(&self, params: QuoteParams) -> Result<QuoteResponse, AppError> {
        let pair = CurrencyPair::parse(&params.from, &params.to)?;
        if params.amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount.into());
        }
        let corridor = self.corridor_for(&pair)?;

        let rate = self.provider.get_rate(&pair).await?;
        self.cache_quote(&rate).await;

        let source_amount = Money::new(pair.source.clone(), params.amount);
        let fee = source_amount
            .percent(corridor.fee_percent)
            .max(&corridor.fee_minimum)?;
        let total_cost = source_amount.checked_add(&fee)?;

        let margin_fraction = corridor.margin_percent / Decimal::ONE_HUNDRED;
        let effective_rate = rate.mid_rate * (Decimal::ONE - margin_fraction);
        let recipient_gets = Money::new(pair.target.clone(), params.amount * effective_rate);

        Ok(QuoteResponse {
            source_currency: pair.source,
            target_currency: pair.target,
            source_amount: params.amount,
            mid_rate: rate.mid_rate,
            effective_rate,
            fee,
            total_cost,
            recipient_gets,
            valid_until: rate.valid_until,
        })
    }

    fn corridor_for(&self, pair: &CurrencyPair) -> Result<&Corridor, AppError> {
        let corridor = self
            .corridors
            .iter()
            .find(|c| c.source_currency == pair.source && c.target_currency == pair.target)
            .ok_or_else(|| DomainError::CorridorNotFound(pair.clone()))?;
        if !corridor.enabled {
            return Err(DomainError::CorridorDisabled(pair.clone()).into());
        }
        Ok(corridor)
    }
}
