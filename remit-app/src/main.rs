//! # Remit Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the simulated rate provider and in-memory adapters
//! - Create the quote and payout services
//! - Spawn the event ingress task
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_rates::{RateSimConfig, RateTable, SimulatedRateProvider};
use remit_adapters::{
    InMemoryEventLog, InMemoryLockStore, InMemoryPayoutStore, InMemoryRateCache, PayoutSimConfig,
    SimulatedPayoutProvider,
};
use remit_hex::{EventIngress, PayoutService, QuoteService, inbound::HttpServer};
use remit_types::domain::Corridor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,remit_app=debug,remit_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting remit server on port {}", config.port);

    // Rate side: simulated provider behind a TTL cache, plus the lock store
    let rate_provider = SimulatedRateProvider::new(RateTable::builtin(), RateSimConfig {
        spread_percent: config.rate_spread_percent,
        max_drift_percent: config.rate_max_drift_percent,
        drift_interval: config.rate_drift_interval,
        validity: config.rate_validity,
        ..RateSimConfig::default()
    });
    let quotes = Arc::new(QuoteService::with_policy(
        rate_provider,
        InMemoryRateCache::new(),
        InMemoryLockStore::new(),
        Corridor::builtin(),
        config.quote_policy(),
    ));

    // Payout side: simulated rail behind the orchestration service
    let payout_provider = SimulatedPayoutProvider::new(PayoutSimConfig {
        latency: config.payout_latency,
        failure_rate: config.payout_failure_rate,
        ..PayoutSimConfig::default()
    });
    let payouts = Arc::new(PayoutService::with_policy(
        InMemoryPayoutStore::new(),
        payout_provider,
        config.payout_policy(),
    ));

    // Event ingress shares the payout service with the HTTP surface
    let event_log = Arc::new(InMemoryEventLog::new(config.event_partitions));
    let ingress = EventIngress::new(event_log, payouts.clone(), config.ingress_config());
    tokio::spawn(ingress.run());

    // Create and run the HTTP server
    let server = HttpServer::new(quotes, payouts);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
