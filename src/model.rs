use serde::{Deserialize, Serialize};

/// Latest known state of one node, keyed by its dotted-quad address
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub address: String,
    /// Gigahashes per second
    #[serde(rename = "hashRate", default, skip_serializing_if = "Option::is_none")]
    pub hash_rate_ghs: Option<f64>,
    #[serde(rename = "temp", default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(rename = "power", default, skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
    /// Suffixed form as reported by the node, e.g. "123.45M"
    #[serde(rename = "bestDiff", default, skip_serializing_if = "Option::is_none")]
    pub best_difficulty: Option<String>,
}

impl TelemetryRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Whether at least one measured attribute besides the address is present.
    /// Records without one are never stored or surfaced.
    pub fn has_measurement(&self) -> bool {
        self.hash_rate_ghs.is_some()
            || self.temperature_c.is_some()
            || self.power_w.is_some()
            || self.best_difficulty.is_some()
    }

    /// Overlay the fields present in `incoming`; absent fields keep their value
    pub fn overlay(&mut self, incoming: &TelemetryRecord) {
        if incoming.hash_rate_ghs.is_some() {
            self.hash_rate_ghs = incoming.hash_rate_ghs;
        }
        if incoming.temperature_c.is_some() {
            self.temperature_c = incoming.temperature_c;
        }
        if incoming.power_w.is_some() {
            self.power_w = incoming.power_w;
        }
        if let Some(ref diff) = incoming.best_difficulty {
            self.best_difficulty = Some(diff.clone());
        }
    }
}

/// Fleet-wide totals derived from the current result set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregateSnapshot {
    pub total_hash_rate_ghs: f64,
    pub total_power_w: f64,
    /// Records reporting a hash rate
    pub device_count: usize,
    /// Numeric maximum over all parseable best difficulties, 0 if none
    pub overall_best_difficulty: f64,
}

/// Trigger: scan the /24 that `base_address` (e.g. "192.168.1.") prefixes
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub base_address: String,
}

/// Final answer to a scan or refresh
#[derive(Debug, Clone, Default)]
pub struct ScanResponse {
    pub results: Vec<TelemetryRecord>,
    /// Set when the in-memory results could not be written through to storage
    pub persistence_error: Option<String>,
}

/// Push notification emitted once per node found during a scan
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub record: TelemetryRecord,
}

/// Result of a refresh pass over the stored addresses
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Nothing was stored yet; a scan is needed first
    NothingStored,
    /// Every stored address failed to respond; stored data was left untouched
    AllFailed,
    Refreshed(ScanResponse),
}
