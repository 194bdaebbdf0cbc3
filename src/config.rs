use crate::constants::{
    API_SYSTEM_INFO_PATH, DEFAULT_NODE_PORT, FIRST_HOST, LAST_HOST, REFRESH_TIMEOUT_MS,
    SCAN_TIMEOUT_MS,
};
use std::time::Duration;

/// Configuration settings for scan and refresh operations
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Timeout in milliseconds for each probe of a full subnet scan
    pub scan_timeout_ms: u64,

    /// Timeout in milliseconds for each probe of a refresh pass
    pub refresh_timeout_ms: u64,

    /// TCP port the node HTTP API listens on
    pub node_port: u16,

    /// Telemetry endpoint path
    pub api_path: String,

    /// First host part probed in the /24 (inclusive)
    pub first_host: u8,

    /// Last host part probed in the /24 (inclusive)
    pub last_host: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_timeout_ms: SCAN_TIMEOUT_MS,
            refresh_timeout_ms: REFRESH_TIMEOUT_MS,
            node_port: DEFAULT_NODE_PORT,
            api_path: API_SYSTEM_INFO_PATH.to_string(),
            first_host: FIRST_HOST,
            last_host: LAST_HOST,
        }
    }
}

impl ScanConfig {
    pub fn with_scan_timeout(mut self, ms: u64) -> Self {
        self.scan_timeout_ms = ms.max(1);
        self
    }

    pub fn with_refresh_timeout(mut self, ms: u64) -> Self {
        self.refresh_timeout_ms = ms.max(1);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.node_port = port;
        self
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// Telemetry URL for a node address, omitting the port when it is the HTTP default
    pub fn node_url(&self, address: &str) -> String {
        if self.node_port == DEFAULT_NODE_PORT {
            format!("http://{}{}", address, self.api_path)
        } else {
            format!("http://{}:{}{}", address, self.node_port, self.api_path)
        }
    }
}
