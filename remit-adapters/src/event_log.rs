//! In-memory append-only partitioned event log.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use dashmap::DashMap;

use remit_types::error::StoreError;
use remit_types::ports::{EventLog, EventRecord};

/// Append-only log with a fixed partition count and per-consumer-group
/// offset cursors.
///
/// `poll` advances the group's cursor past everything it hands out, so
/// this stage delivers at most once; redelivery on downstream failure
/// is an upstream concern.
pub struct InMemoryEventLog {
    partitions: Vec<Mutex<Vec<Vec<u8>>>>,
    cursors: DashMap<(String, u32), u64>,
}

impl InMemoryEventLog {
    pub fn new(partition_count: u32) -> Self {
        let partitions = (0..partition_count.max(1))
            .map(|_| Mutex::new(Vec::new()))
            .collect();
        Self {
            partitions,
            cursors: DashMap::new(),
        }
    }

    fn partition_for(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions.len() as u64) as u32
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait::async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, key: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let partition = self.partition_for(key);
        self.partitions[partition as usize]
            .lock()
            .map_err(|_| StoreError::Storage("event log partition lock poisoned".into()))?
            .push(payload);
        Ok(())
    }

    async fn poll(&self, group: &str, max: usize) -> Result<Vec<EventRecord>, StoreError> {
        let mut records = Vec::new();
        for (partition, messages) in self.partitions.iter().enumerate() {
            if records.len() >= max {
                break;
            }
            let partition = partition as u32;
            let messages = messages
                .lock()
                .map_err(|_| StoreError::Storage("event log partition lock poisoned".into()))?;
            let mut cursor = self
                .cursors
                .entry((group.to_string(), partition))
                .or_insert(0);
            let start = *cursor as usize;
            let end = messages.len().min(start + (max - records.len()));
            for (i, payload) in messages[start..end].iter().enumerate() {
                records.push(EventRecord {
                    partition,
                    offset: (start + i) as u64,
                    payload: payload.clone(),
                });
            }
            *cursor = end as u64;
        }
        Ok(records)
    }
}
