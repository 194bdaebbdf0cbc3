use crate::config::ScanConfig;
use crate::constants::KEY_SAVED_BASE_IP;
use crate::db::kv::KeyValueStore;
use crate::errors::ScoutError;
use crate::model::{
    AggregateSnapshot, PartialResult, RefreshOutcome, ScanRequest, ScanResponse, TelemetryRecord,
};
use crate::net::{interface, scan::NetworkScanner};
use crate::probe::{HttpNodeProbe, NodeProbe};
use crate::refresh::RefreshCoordinator;
use crate::results::ResultStore;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Coordinates scans, refreshes and the shared result set.
///
/// The result store is the only mutable state; scan completions are merged
/// into it one at a time by the task driving the scan, and every change is
/// pushed to subscribers as a [`PartialResult`]. Storage writes run on the
/// blocking pool after the store's lock has been released, one at a time and
/// in merge order.
pub struct FleetScout {
    scanner: NetworkScanner,
    refresher: RefreshCoordinator,
    results: Arc<Mutex<ResultStore>>,
    storage: Arc<dyn KeyValueStore>,
    subscribers: parking_lot::Mutex<Vec<mpsc::UnboundedSender<PartialResult>>>,
}

impl FleetScout {
    /// Scout probing nodes over HTTP, restoring previously stored results
    pub fn new(storage: Arc<dyn KeyValueStore>, config: ScanConfig) -> Result<Self, ScoutError> {
        let probe = Arc::new(HttpNodeProbe::new(config.clone())?);
        Ok(Self::with_probe(probe, storage, config))
    }

    pub fn with_probe(
        probe: Arc<dyn NodeProbe>,
        storage: Arc<dyn KeyValueStore>,
        config: ScanConfig,
    ) -> Self {
        let results = ResultStore::load(storage.clone()).unwrap_or_else(|e| {
            warn!("Could not restore stored results, starting empty: {}", e);
            ResultStore::new(storage.clone())
        });

        Self {
            scanner: NetworkScanner::new(probe.clone(), config.clone()),
            refresher: RefreshCoordinator::new(probe, config),
            results: Arc::new(Mutex::new(results)),
            storage,
            subscribers: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Receive a notification for every node found while a scan is running
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PartialResult> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn results(&self) -> Arc<Mutex<ResultStore>> {
        self.results.clone()
    }

    /// Current records in display order together with their aggregate
    pub async fn snapshot(&self) -> (Vec<TelemetryRecord>, AggregateSnapshot) {
        let results = self.results.lock().await;
        (results.records(), results.aggregate())
    }

    /// Scan a whole /24, merging nodes as they answer.
    ///
    /// Once every probe has resolved the stored set is replaced by what this
    /// scan found. Only an invalid base address fails the call; storage
    /// failures are reported in the response.
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanResponse, ScoutError> {
        let mut stream = self.scanner.scan(&request.base_address)?;
        let mut response = ScanResponse::default();

        while let Some(record) = stream.next_partial().await {
            let staged = self.results.lock().await.stage_merge(record.clone());
            let written = match staged {
                Ok(Some(write)) => write.commit_blocking().await,
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                warn!("Failed to persist partial result for {}: {}", record.address, e);
                response.persistence_error = Some(e.to_string());
            }
            self.notify(&record);
            response.results.push(record);
        }

        if let Err(e) = self.replace_results(response.results.clone()).await {
            warn!("Failed to persist scan results: {}", e);
            response.persistence_error = Some(e.to_string());
        }

        Ok(response)
    }

    /// Scan the /24 of the saved base IP
    pub async fn scan_saved(&self) -> Result<ScanResponse, ScoutError> {
        let ip = self.saved_base_ip()?.ok_or(ScoutError::NoSavedAddress)?;
        let base_address = interface::base_address(&ip)?;
        self.scan(ScanRequest { base_address }).await
    }

    /// Re-probe the stored addresses without scanning the whole subnet.
    ///
    /// When none of them answers, the stored set is kept as it was.
    pub async fn refresh(&self) -> RefreshOutcome {
        let addresses = self.results.lock().await.addresses();
        if addresses.is_empty() {
            return RefreshOutcome::NothingStored;
        }

        let refreshed = self.refresher.refresh(&addresses).await;
        if refreshed.is_empty() {
            warn!(
                "None of the {} stored node(s) responded; keeping last known data",
                addresses.len()
            );
            return RefreshOutcome::AllFailed;
        }

        let mut response = ScanResponse {
            results: refreshed,
            persistence_error: None,
        };
        if let Err(e) = self.replace_results(response.results.clone()).await {
            warn!("Failed to persist refreshed results: {}", e);
            response.persistence_error = Some(e.to_string());
        }
        RefreshOutcome::Refreshed(response)
    }

    /// Remember the address whose /24 gets scanned
    pub fn save_base_ip(&self, ip: &str) -> Result<(), ScoutError> {
        let ip = ip.trim();
        if !interface::is_valid_ipv4(ip) {
            return Err(ScoutError::InvalidAddress(ip.to_string()));
        }
        self.storage
            .set(KEY_SAVED_BASE_IP, Value::String(ip.to_string()))?;
        info!("Saved base IP {}", ip);
        Ok(())
    }

    pub fn saved_base_ip(&self) -> Result<Option<String>, ScoutError> {
        Ok(self
            .storage
            .get(KEY_SAVED_BASE_IP)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Swap the whole set in memory, then write it out on the blocking pool
    async fn replace_results(&self, records: Vec<TelemetryRecord>) -> Result<(), ScoutError> {
        let staged = self.results.lock().await.stage_replace(records);
        staged?.commit_blocking().await
    }

    fn notify(&self, record: &TelemetryRecord) {
        self.subscribers.lock().retain(|tx| {
            tx.send(PartialResult {
                record: record.clone(),
            })
            .is_ok()
        });
    }
}
