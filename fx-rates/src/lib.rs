//! Simulated FX rate provider.
//!
//! A `SimulatedRateProvider` answers quote requests from a static table
//! of base mid-rates, perturbed by a per-pair random drift that is
//! redrawn on a fixed interval and held constant between redraws. This
//! bounds rate volatility for reproducible testing while still
//! exercising cache miss/hit behaviour downstream.
//!
//! Pair resolution order:
//! 1. direct table lookup,
//! 2. inverse lookup (`1 / rate(target, source)`),
//! 3. triangulation through the pivot currency.
//!
//! The base-rate table and every tunable are injected at construction -
//! there is no process-wide mutable state. The drift map is the only
//! shared mutable state and always sits behind its own lock: reads take
//! the shared side, the periodic redraw takes the exclusive side.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use remit_types::domain::{CurrencyCode, CurrencyPair, ExchangeRate};
use remit_types::error::RateError;
use remit_types::ports::RateProvider;

// ─────────────────────────────────────────────────────────────────────────────
// Base-rate table
// ─────────────────────────────────────────────────────────────────────────────

/// Static table of base mid-rates for ordered currency pairs, plus the
/// pivot currency used for triangulation. Read-only after construction.
#[derive(Debug, Clone)]
pub struct RateTable {
    base_rates: HashMap<CurrencyPair, Decimal>,
    pivot: CurrencyCode,
    provider_name: String,
}

impl RateTable {
    pub fn new(pivot: CurrencyCode, provider_name: impl Into<String>) -> Self {
        Self {
            base_rates: HashMap::new(),
            pivot,
            provider_name: provider_name.into(),
        }
    }

    /// Adds a base mid-rate for an ordered pair.
    pub fn with_rate(mut self, source: CurrencyCode, target: CurrencyCode, mid: Decimal) -> Self {
        self.base_rates
            .insert(CurrencyPair::new(source, target), mid);
        self
    }

    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn pairs(&self) -> impl Iterator<Item = &CurrencyPair> {
        self.base_rates.keys()
    }

    fn base(&self, pair: &CurrencyPair) -> Option<Decimal> {
        self.base_rates.get(pair).copied()
    }

    /// The built-in development table. Pivot is USD; pairs without a
    /// direct or inverse entry triangulate through it.
    pub fn builtin() -> Self {
        fn code(c: &str) -> CurrencyCode {
            CurrencyCode::parse(c).expect("builtin table currency code")
        }
        fn dec(s: &str) -> Decimal {
            s.parse().expect("builtin table rate")
        }
        Self::new(code("USD"), "simulated")
            .with_rate(code("SGD"), code("PHP"), dec("39.75"))
            .with_rate(code("SGD"), code("INR"), dec("62.50"))
            .with_rate(code("SGD"), code("IDR"), dec("11850"))
            .with_rate(code("SGD"), code("MYR"), dec("3.35"))
            .with_rate(code("SGD"), code("USD"), dec("0.74"))
            .with_rate(code("USD"), code("PHP"), dec("53.70"))
            .with_rate(code("USD"), code("INR"), dec("83.10"))
            .with_rate(code("EUR"), code("USD"), dec("1.09"))
            .with_rate(code("GBP"), code("USD"), dec("1.27"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulation tunables
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for the simulated provider.
#[derive(Debug, Clone)]
pub struct RateSimConfig {
    /// Full bid/ask spread, in percent of mid (0.5 -> bid = mid * 0.9975).
    pub spread_percent: Decimal,
    /// Drift bound in percent; each pair's drift is drawn uniformly
    /// from +/- this.
    pub max_drift_percent: Decimal,
    /// How long a drawn drift is held before the next redraw.
    pub drift_interval: Duration,
    /// Quote validity window (`valid_until - fetched_at`).
    pub validity: Duration,
    /// Percent chance per call of a transient `Unavailable` failure.
    pub unavailable_rate: f64,
}

impl Default for RateSimConfig {
    fn default() -> Self {
        Self {
            spread_percent: Decimal::new(5, 1),     // 0.5
            max_drift_percent: Decimal::new(2, 0),  // 2.0
            drift_interval: Duration::from_secs(5),
            validity: Duration::from_secs(30),
            unavailable_rate: 0.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

struct DriftState {
    rng: StdRng,
    drifts: HashMap<CurrencyPair, Decimal>,
    last_redraw: Instant,
}

/// The simulated rate provider.
pub struct SimulatedRateProvider {
    table: RateTable,
    config: RateSimConfig,
    drift: RwLock<DriftState>,
}

impl SimulatedRateProvider {
    pub fn new(table: RateTable, config: RateSimConfig) -> Self {
        Self::with_rng(table, config, StdRng::from_os_rng())
    }

    /// Provider with a caller-supplied RNG, for deterministic drift in
    /// tests.
    pub fn with_rng(table: RateTable, config: RateSimConfig, rng: StdRng) -> Self {
        let mut state = DriftState {
            rng,
            drifts: HashMap::new(),
            last_redraw: Instant::now(),
        };
        Self::redraw(&mut state, &table, &config);
        Self {
            table,
            config,
            drift: RwLock::new(state),
        }
    }

    /// Redraws every pair's drift uniformly from the configured bound,
    /// as an exact decimal fraction in millionths.
    fn redraw(state: &mut DriftState, table: &RateTable, config: &RateSimConfig) {
        let bound = (config.max_drift_percent * Decimal::new(10_000, 0))
            .to_i64()
            .unwrap_or(0);
        for pair in table.pairs() {
            let drift = if bound == 0 {
                Decimal::ZERO
            } else {
                Decimal::new(state.rng.random_range(-bound..=bound), 6)
            };
            state.drifts.insert(pair.clone(), drift);
        }
        state.last_redraw = Instant::now();
    }

    /// Snapshot of the current drift map, redrawing first if the hold
    /// interval has elapsed.
    fn current_drifts(&self) -> HashMap<CurrencyPair, Decimal> {
        let stale = {
            let state = self.drift.read().expect("drift lock poisoned");
            state.last_redraw.elapsed() >= self.config.drift_interval
        };
        if stale {
            let mut state = self.drift.write().expect("drift lock poisoned");
            // Another writer may have redrawn while we waited.
            if state.last_redraw.elapsed() >= self.config.drift_interval {
                Self::redraw(&mut state, &self.table, &self.config);
                tracing::debug!(pairs = state.drifts.len(), "redrew rate drift");
            }
            return state.drifts.clone();
        }
        self.drift
            .read()
            .expect("drift lock poisoned")
            .drifts
            .clone()
    }

    fn drifted(&self, pair: &CurrencyPair, drifts: &HashMap<CurrencyPair, Decimal>)
    -> Option<Decimal> {
        let base = self.table.base(pair)?;
        let drift = drifts.get(pair).copied().unwrap_or(Decimal::ZERO);
        Some(base * (Decimal::ONE + drift))
    }

    /// Direct then inverse resolution only - the two rules a
    /// triangulation leg may use.
    fn resolve_leg(&self, pair: &CurrencyPair, drifts: &HashMap<CurrencyPair, Decimal>)
    -> Option<Decimal> {
        if let Some(mid) = self.drifted(pair, drifts) {
            return Some(mid);
        }
        let inverse = pair.inverse();
        let reverse = self.drifted(&inverse, drifts)?;
        Decimal::ONE.checked_div(reverse)
    }

    fn resolve_mid(&self, pair: &CurrencyPair) -> Option<Decimal> {
        if pair.source == pair.target {
            return Some(Decimal::ONE);
        }
        let drifts = self.current_drifts();
        if let Some(mid) = self.resolve_leg(pair, &drifts) {
            return Some(mid);
        }
        // Triangulate through the pivot.
        let pivot = self.table.pivot().clone();
        if pair.source == pivot || pair.target == pivot {
            return None;
        }
        let to_pivot = self.resolve_leg(&CurrencyPair::new(pair.source.clone(), pivot.clone()), &drifts)?;
        let from_pivot = self.resolve_leg(&CurrencyPair::new(pivot, pair.target.clone()), &drifts)?;
        Some(to_pivot * from_pivot)
    }

    fn quote(&self, pair: &CurrencyPair, mid: Decimal) -> ExchangeRate {
        let now = Utc::now();
        let half_spread = self.config.spread_percent / Decimal::new(200, 0);
        ExchangeRate {
            source_currency: pair.source.clone(),
            target_currency: pair.target.clone(),
            mid_rate: mid,
            bid_rate: mid * (Decimal::ONE - half_spread),
            ask_rate: mid * (Decimal::ONE + half_spread),
            spread_percent: self.config.spread_percent,
            provider_name: self.table.provider_name().to_string(),
            fetched_at: now,
            valid_until: now
                + chrono::Duration::from_std(self.config.validity)
                    .unwrap_or_else(|_| chrono::Duration::seconds(30)),
        }
    }

    fn maybe_inject_outage(&self) -> Result<(), RateError> {
        if self.config.unavailable_rate > 0.0
            && rand::rng().random_range(0.0..100.0) < self.config.unavailable_rate
        {
            return Err(RateError::Unavailable(
                "simulated provider outage".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RateProvider for SimulatedRateProvider {
    async fn get_rate(&self, pair: &CurrencyPair) -> Result<ExchangeRate, RateError> {
        self.maybe_inject_outage()?;
        let mid = self
            .resolve_mid(pair)
            .ok_or_else(|| RateError::UnsupportedPair(pair.clone()))?;
        Ok(self.quote(pair, mid))
    }

    async fn get_rates(&self, pairs: &[CurrencyPair]) -> Result<Vec<ExchangeRate>, RateError> {
        let mut rates = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match self.get_rate(pair).await {
                Ok(rate) => rates.push(rate),
                Err(RateError::UnsupportedPair(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(rates)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
