use crate::config::ScanConfig;
use crate::model::TelemetryRecord;
use crate::probe::NodeProbe;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Re-probes already known node addresses one at a time
pub struct RefreshCoordinator {
    probe: Arc<dyn NodeProbe>,
    config: ScanConfig,
}

impl RefreshCoordinator {
    pub fn new(probe: Arc<dyn NodeProbe>, config: ScanConfig) -> Self {
        Self { probe, config }
    }

    /// Fresh records for the addresses that still respond.
    ///
    /// Probes run sequentially with the longer refresh timeout. Addresses
    /// that no longer answer are left out; nothing is carried over from
    /// earlier records.
    pub async fn refresh(&self, addresses: &[String]) -> Vec<TelemetryRecord> {
        let started = Instant::now();
        let timeout = self.config.refresh_timeout();
        let mut refreshed = Vec::with_capacity(addresses.len());

        for address in addresses {
            match self.probe.probe(address, timeout).await {
                Some(record) => refreshed.push(record),
                None => debug!("{}: failed to refresh data for {}", self.probe.name(), address),
            }
        }

        info!(
            "Refreshed {}/{} node(s) in {:.2}s",
            refreshed.len(),
            addresses.len(),
            started.elapsed().as_secs_f64()
        );
        refreshed
    }
}
