use crate::constants::KEY_STORED_RESULTS;
use crate::db::kv::KeyValueStore;
use crate::errors::ScoutError;
use crate::model::{AggregateSnapshot, TelemetryRecord};
use crate::units::difficulty_or_zero;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Latest telemetry per node address, written through to storage on every change.
///
/// Iteration order is the order of each address's most recent merge.
/// Mutations take `&mut self`; share it behind a single lock (or feed it from
/// one consumer task) when probes complete concurrently.
pub struct ResultStore {
    records: IndexMap<String, TelemetryRecord>,
    storage: Arc<dyn KeyValueStore>,
}

impl ResultStore {
    /// Empty store; nothing is read from `storage`
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records: IndexMap::new(),
            storage,
        }
    }

    /// Store pre-filled with the previously persisted result set
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Result<Self, ScoutError> {
        let mut store = Self::new(storage);
        if let Some(value) = store.storage.get(KEY_STORED_RESULTS)? {
            let records: Vec<TelemetryRecord> = serde_json::from_value(value)?;
            for record in records.into_iter().filter(TelemetryRecord::has_measurement) {
                store.overlay(record);
            }
        }
        Ok(store)
    }

    /// Overlay a partial record onto the one already known for its address.
    ///
    /// The in-memory set is updated even when persisting it fails.
    pub fn merge(&mut self, record: TelemetryRecord) -> Result<(), ScoutError> {
        match self.stage_merge(record)? {
            Some(write) => write.commit(),
            None => Ok(()),
        }
    }

    /// Substitute the whole set, e.g. after a full rescan
    pub fn replace(&mut self, records: Vec<TelemetryRecord>) -> Result<(), ScoutError> {
        self.stage_replace(records)?.commit()
    }

    /// Like [`merge`](Self::merge), but hands back the storage write instead
    /// of performing it, so it can run after the store's lock is released.
    /// `None` when the record carries no measurement and nothing changed.
    pub fn stage_merge(
        &mut self,
        record: TelemetryRecord,
    ) -> Result<Option<PendingWrite>, ScoutError> {
        if !record.has_measurement() {
            return Ok(None);
        }
        self.overlay(record);
        self.pending_write().map(Some)
    }

    /// Like [`replace`](Self::replace), with the storage write deferred
    pub fn stage_replace(
        &mut self,
        records: Vec<TelemetryRecord>,
    ) -> Result<PendingWrite, ScoutError> {
        self.records.clear();
        for record in records.into_iter().filter(TelemetryRecord::has_measurement) {
            self.overlay(record);
        }
        self.pending_write()
    }

    pub fn aggregate(&self) -> AggregateSnapshot {
        let mut snapshot = AggregateSnapshot::default();
        for record in self.records.values() {
            if let Some(rate) = record.hash_rate_ghs {
                snapshot.total_hash_rate_ghs += rate;
                snapshot.device_count += 1;
            }
            if let Some(power) = record.power_w {
                snapshot.total_power_w += power;
            }
            if let Some(ref diff) = record.best_difficulty {
                snapshot.overall_best_difficulty =
                    snapshot.overall_best_difficulty.max(difficulty_or_zero(diff));
            }
        }
        snapshot
    }

    pub fn addresses(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.values().cloned().collect()
    }

    pub fn get(&self, address: &str) -> Option<&TelemetryRecord> {
        self.records.get(address)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn overlay(&mut self, record: TelemetryRecord) {
        let merged = match self.records.shift_remove(&record.address) {
            Some(mut existing) => {
                existing.overlay(&record);
                existing
            }
            None => record,
        };
        self.records.insert(merged.address.clone(), merged);
    }

    fn pending_write(&self) -> Result<PendingWrite, ScoutError> {
        Ok(PendingWrite {
            storage: self.storage.clone(),
            value: serde_json::to_value(self.records())?,
        })
    }
}

/// Snapshot of the result set waiting to be written to storage
pub struct PendingWrite {
    storage: Arc<dyn KeyValueStore>,
    value: Value,
}

impl PendingWrite {
    /// Write on the calling thread
    pub fn commit(self) -> Result<(), ScoutError> {
        self.storage.set(KEY_STORED_RESULTS, self.value)
    }

    /// Write on tokio's blocking pool, keeping file I/O off the async workers
    pub async fn commit_blocking(self) -> Result<(), ScoutError> {
        tokio::task::spawn_blocking(move || self.commit())
            .await
            .map_err(|e| ScoutError::Persistence(format!("storage write aborted: {}", e)))?
    }
}
