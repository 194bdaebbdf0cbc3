//! NodeScout - discover mining nodes on a local /24 network
//!
//! This library provides:
//! - Concurrent probing of every host of a /24 for node telemetry
//! - Streaming of partial results while a scan is running
//! - An overlay-merged, persisted result set with fleet-wide aggregates
//! - Sequential refresh of already known nodes

pub mod config;
pub mod constants;
pub mod db;
pub mod engine;
pub mod errors;
pub mod model;
pub mod net;
pub mod probe;
pub mod refresh;
pub mod results;
pub mod table;
pub mod units;

// Re-export commonly used types for convenience
pub use config::ScanConfig;
pub use db::kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use engine::FleetScout;
pub use errors::ScoutError;
pub use model::{
    AggregateSnapshot, PartialResult, RefreshOutcome, ScanRequest, ScanResponse, TelemetryRecord,
};
pub use net::scan::{NetworkScanner, ScanStream};
pub use probe::{HttpNodeProbe, NodeProbe};
pub use refresh::RefreshCoordinator;
pub use results::ResultStore;
