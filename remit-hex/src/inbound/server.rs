//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use remit_types::ports::{LockStore, PayoutProvider, PayoutStore, RateCache, RateProvider};

use super::handlers;
use crate::openapi::ApiDoc;
use crate::service::{PayoutService, QuoteService};

/// HTTP Server for the remittance API.
///
/// Takes both services behind `Arc` so the payout service can be shared
/// with the event ingress task.
pub struct HttpServer<RP, RC, LS, PS, PP>
where
    RP: RateProvider,
    RC: RateCache,
    LS: LockStore,
    PS: PayoutStore,
    PP: PayoutProvider,
{
    quotes: Arc<QuoteService<RP, RC, LS>>,
    payouts: Arc<PayoutService<PS, PP>>,
}

impl<RP, RC, LS, PS, PP> HttpServer<RP, RC, LS, PS, PP>
where
    RP: RateProvider,
    RC: RateCache,
    LS: LockStore,
    PS: PayoutStore,
    PP: PayoutProvider,
{
    pub fn new(
        quotes: Arc<QuoteService<RP, RC, LS>>,
        payouts: Arc<PayoutService<PS, PP>>,
    ) -> Self {
        Self { quotes, payouts }
    }

    /// Builds the Axum router with all routes.
    ///
    /// The two services carry different generic parameters, so each
    /// gets its own sub-router with its own state; the sub-routers are
    /// merged into one erased `Router`.
    pub fn router(&self) -> Router {
        let rates = Router::new()
            .route("/api/rates/{from}/{to}", get(handlers::get_rate::<RP, RC, LS>))
            .route("/api/rates/lock", post(handlers::lock_rate::<RP, RC, LS>))
            .route(
                "/api/rates/locked/{id}",
                get(handlers::get_locked_rate::<RP, RC, LS>),
            )
            .route(
                "/api/rates/locked/{id}",
                delete(handlers::release_lock::<RP, RC, LS>),
            )
            .route(
                "/api/rates/locked/{id}/extend",
                post(handlers::extend_lock::<RP, RC, LS>),
            )
            .route("/api/corridors", get(handlers::list_corridors::<RP, RC, LS>))
            .route("/api/quote", get(handlers::quote::<RP, RC, LS>))
            .with_state(self.quotes.clone());

        let payouts = Router::new()
            .route("/api/payouts", post(handlers::initiate_payout::<PS, PP>))
            .route("/api/payouts/{id}", get(handlers::get_payout::<PS, PP>))
            .route("/api/payouts/{id}/retry", post(handlers::retry_payout::<PS, PP>))
            .route("/api/payouts/{id}/cancel", post(handlers::cancel_payout::<PS, PP>))
            .route(
                "/api/payouts/{id}/pickup-code",
                get(handlers::pickup_code::<PS, PP>),
            )
            .with_state(self.payouts.clone());

        Router::new()
            .route("/health", get(handlers::health))
            .merge(rates)
            .merge(payouts)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
