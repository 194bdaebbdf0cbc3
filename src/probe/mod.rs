use crate::constants::fields;
use crate::model::TelemetryRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

// Submodule declarations
pub mod http;

pub use http::HttpNodeProbe;

/// Node probing trait
///
/// A probe performs one bounded-time query against a single host address
/// and yields a telemetry record, or nothing when the address is not a node.
/// Unreachable hosts and malformed answers are the expected common case on a
/// mostly empty subnet, so they are not reported as errors.
#[async_trait]
pub trait NodeProbe: Send + Sync {
    async fn probe(&self, address: &str, timeout: Duration) -> Option<TelemetryRecord>;

    /// Return a human-readable name for this probe
    fn name(&self) -> &'static str;
}

/// Build a record from a node's system info body.
///
/// Returns `None` when the body is not a JSON object or carries none of the
/// recognised fields.
pub fn extract_telemetry(address: &str, body: &Value) -> Option<TelemetryRecord> {
    let map = body.as_object()?;
    let number = |key: &str| map.get(key).and_then(Value::as_f64);
    let non_negative = |v: f64| v >= 0.0;

    let record = TelemetryRecord {
        address: address.to_string(),
        hash_rate_ghs: number(fields::HASH_RATE_1H)
            .or_else(|| number(fields::HASH_RATE))
            .filter(|v| non_negative(*v)),
        temperature_c: number(fields::TEMPERATURE),
        power_w: number(fields::POWER).filter(|v| non_negative(*v)),
        best_difficulty: map.get(fields::BEST_DIFF).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }),
    };

    record.has_measurement().then_some(record)
}
