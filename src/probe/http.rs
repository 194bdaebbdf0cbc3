use super::{extract_telemetry, NodeProbe};
use crate::config::ScanConfig;
use crate::errors::ScoutError;
use crate::model::TelemetryRecord;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::time::Duration;

/// Probe that queries a node's HTTP system info endpoint
pub struct HttpNodeProbe {
    client: reqwest::Client,
    config: ScanConfig,
}

impl HttpNodeProbe {
    pub fn new(config: ScanConfig) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nodescout/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch(&self, address: &str, timeout: Duration) -> Result<Value, ScoutError> {
        let url = self.config.node_url(address);
        let response = self.client.get(&url).timeout(timeout).send().await?;

        if !response.status().is_success() {
            return Err(ScoutError::Other(format!(
                "HTTP status code: {}",
                response.status()
            )));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl NodeProbe for HttpNodeProbe {
    fn name(&self) -> &'static str {
        "HTTP system info probe"
    }

    async fn probe(&self, address: &str, timeout: Duration) -> Option<TelemetryRecord> {
        match self.fetch(address, timeout).await {
            Ok(body) => {
                let record = extract_telemetry(address, &body);
                if record.is_none() {
                    debug!("{}: {} answered without node telemetry", self.name(), address);
                }
                record
            }
            Err(e) => {
                debug!("{}: no node at {}: {}", self.name(), address, e);
                None
            }
        }
    }
}
