//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use remit_hex::{IngressConfig, PayoutPolicy, QuotePolicy, UnknownMethodPolicy};

/// Application configuration. Every simulation tunable has a default so
/// the server runs with no environment at all.
pub struct Config {
    pub port: u16,
    pub rate_spread_percent: Decimal,
    pub rate_max_drift_percent: Decimal,
    pub rate_drift_interval: Duration,
    pub rate_validity: Duration,
    pub max_lock_seconds: u32,
    pub payout_latency: Duration,
    pub payout_failure_rate: f64,
    pub payout_max_retries: u32,
    pub payout_provider_timeout: Duration,
    pub event_partitions: u32,
    pub ingress_poll_interval: Duration,
    pub ingress_strict_methods: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: parse_var("PORT", 3000)?,
            rate_spread_percent: parse_var("RATE_SPREAD_PERCENT", Decimal::new(5, 1))?,
            rate_max_drift_percent: parse_var("RATE_MAX_DRIFT_PERCENT", Decimal::new(2, 0))?,
            rate_drift_interval: secs_var("RATE_DRIFT_INTERVAL_SECONDS", 5)?,
            rate_validity: secs_var("RATE_VALIDITY_SECONDS", 30)?,
            max_lock_seconds: parse_var("MAX_LOCK_SECONDS", 300)?,
            payout_latency: millis_var("PAYOUT_LATENCY_MS", 100)?,
            payout_failure_rate: parse_var("PAYOUT_FAILURE_RATE", 10.0)?,
            payout_max_retries: parse_var("PAYOUT_MAX_RETRIES", 3)?,
            payout_provider_timeout: secs_var("PAYOUT_PROVIDER_TIMEOUT_SECONDS", 5)?,
            event_partitions: parse_var("EVENT_PARTITIONS", 4)?,
            ingress_poll_interval: millis_var("INGRESS_POLL_INTERVAL_MS", 500)?,
            ingress_strict_methods: parse_var("INGRESS_STRICT_METHODS", false)?,
        })
    }

    pub fn quote_policy(&self) -> QuotePolicy {
        QuotePolicy {
            max_lock_seconds: self.max_lock_seconds,
        }
    }

    pub fn payout_policy(&self) -> PayoutPolicy {
        PayoutPolicy {
            max_retries: self.payout_max_retries,
            provider_timeout: self.payout_provider_timeout,
        }
    }

    pub fn ingress_config(&self) -> IngressConfig {
        IngressConfig {
            poll_interval: self.ingress_poll_interval,
            unknown_method_policy: if self.ingress_strict_methods {
                UnknownMethodPolicy::Reject
            } else {
                UnknownMethodPolicy::DefaultToBankAccount
            },
            ..IngressConfig::default()
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {name}: {e}")),
        Err(_) => Ok(default),
    }
}

fn secs_var(name: &str, default: u64) -> anyhow::Result<Duration> {
    Ok(Duration::from_secs(parse_var(name, default)?))
}

fn millis_var(name: &str, default: u64) -> anyhow::Result<Duration> {
    Ok(Duration::from_millis(parse_var(name, default)?))
}
