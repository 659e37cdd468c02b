//! Event stream ingress.
//!
//! Consumes "transfer funded" events from the event log and initiates
//! a payout for each one. Consumption is at-most-once: the log's
//! cursors advance on poll, so an event that cannot be processed is
//! logged and dropped rather than redelivered.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use remit_types::domain::{Payout, PayoutMethod};
use remit_types::dto::{InitiatePayoutRequest, TransferFundedEvent};
use remit_types::ports::{EventLog, EventRecord, PayoutProvider, PayoutStore};

use crate::service::PayoutService;

/// What to do with an event whose `payoutMethod` string is not one of
/// the known methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownMethodPolicy {
    /// Fall back to bank transfer, with a warning.
    DefaultToBankAccount,
    /// Drop the event.
    Reject,
}

/// Consumer tunables.
#[derive(Debug, Clone)]
pub struct IngressConfig {
    /// Consumer group whose cursors this consumer advances.
    pub group: String,
    /// Records read per poll.
    pub batch_size: usize,
    /// Idle sleep between empty polls.
    pub poll_interval: Duration,
    pub unknown_method_policy: UnknownMethodPolicy,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            group: "payout-engine".into(),
            batch_size: 32,
            poll_interval: Duration::from_millis(500),
            unknown_method_policy: UnknownMethodPolicy::DefaultToBankAccount,
        }
    }
}

/// Polls the event log and feeds funded transfers into the payout
/// service. Run as a background task alongside the HTTP server.
pub struct EventIngress<L, S, P>
where
    L: EventLog,
    S: PayoutStore,
    P: PayoutProvider,
{
    log: Arc<L>,
    payouts: Arc<PayoutService<S, P>>,
    config: IngressConfig,
}

impl<L, S, P> EventIngress<L, S, P>
where
    L: EventLog,
    S: PayoutStore,
    P: PayoutProvider,
{
    pub fn new(log: Arc<L>, payouts: Arc<PayoutService<S, P>>, config: IngressConfig) -> Self {
        Self {
            log,
            payouts,
            config,
        }
    }

    /// Consumer loop. Never returns; intended for `tokio::spawn`.
    pub async fn run(self) {
        tracing::info!(group = %self.config.group, "event ingress started");
        loop {
            let processed = self.drain_once().await;
            if processed == 0 {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
    }

    /// Polls one batch and processes every record in it. Returns the
    /// number of records read.
    pub async fn drain_once(&self) -> usize {
        let records = match self.log.poll(&self.config.group, self.config.batch_size).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(error = %err, "event log poll failed");
                return 0;
            }
        };

        for record in &records {
            match self.handle(record).await {
                Ok(payout) => {
                    tracing::info!(
                        payout_id = %payout.id,
                        transfer_id = %payout.transfer_id,
                        status = %payout.status,
                        "funded transfer turned into payout"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        partition = record.partition,
                        offset = record.offset,
                        error = %err,
                        "dropping unprocessable transfer-funded event"
                    );
                }
            }
        }
        records.len()
    }

    async fn handle(&self, record: &EventRecord) -> anyhow::Result<Payout> {
        let event: TransferFundedEvent = serde_json::from_slice(&record.payload)
            .context("malformed transfer-funded payload")?;

        let method = self.map_method(&event.payout_method)?;
        let recipient = event
            .recipient
            .into_details(method)
            .context("incomplete recipient details")?;

        let request = InitiatePayoutRequest {
            transfer_id: event.transfer_id,
            amount: event.amount,
            currency: event.currency,
            method,
            recipient,
        };
        Ok(self.payouts.initiate(request).await?)
    }

    fn map_method(&self, raw: &str) -> anyhow::Result<PayoutMethod> {
        match raw {
            "BANK_ACCOUNT" => Ok(PayoutMethod::BankAccount),
            "MOBILE_WALLET" => Ok(PayoutMethod::MobileWallet),
            "CASH_PICKUP" => Ok(PayoutMethod::CashPickup),
            other => match self.config.unknown_method_policy {
                UnknownMethodPolicy::DefaultToBankAccount => {
                    tracing::warn!(method = other, "unknown payout method, defaulting to bank account");
                    Ok(PayoutMethod::BankAccount)
                }
                UnknownMethodPolicy::Reject => {
                    anyhow::bail!("unknown payout method: {other}")
                }
            },
        }
    }
}
