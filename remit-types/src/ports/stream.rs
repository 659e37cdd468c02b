//! Event log port for the "transfer funded" stream.

use crate::error::StoreError;

/// One message read from a partition of the event log.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub partition: u32,
    pub offset: u64,
    pub payload: Vec<u8>,
}

/// Port trait for an append-only partitioned event log consumed from a
/// single consumer-group offset cursor.
///
/// `poll` advances the group's cursors past everything it returns, so
/// a record that fails downstream is not redelivered by this stage
/// (at-most-once; upstream redelivery is an external concern).
#[async_trait::async_trait]
pub trait EventLog: Send + Sync + 'static {
    /// Appends a payload, partitioned by `key`.
    async fn append(&self, key: &str, payload: Vec<u8>) -> Result<(), StoreError>;

    /// Reads up to `max` records past the group's cursors and advances
    /// them.
    async fn poll(&self, group: &str, max: usize) -> Result<Vec<EventRecord>, StoreError>;
}
