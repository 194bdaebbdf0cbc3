use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use nodescout::config::ScanConfig;
use nodescout::db::kv::MemoryStore;
use nodescout::engine::FleetScout;
use nodescout::model::ScanRequest;
use nodescout::probe::{HttpNodeProbe, NodeProbe};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Serve `router` on an ephemeral loopback port and return the port
async fn spawn_fake_node(router: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    port
}

fn system_info(router_body: serde_json::Value) -> Router {
    Router::new().route(
        "/api/system/info",
        get(move || {
            let body = router_body.clone();
            async move { Json(body) }
        }),
    )
}

async fn probe_port(port: u16, timeout: Duration) -> Option<nodescout::TelemetryRecord> {
    let probe = HttpNodeProbe::new(ScanConfig::default().with_port(port)).unwrap();
    probe.probe("127.0.0.1", timeout).await
}

#[test]
fn test_system_info_client_name() {
    let probe = HttpNodeProbe::new(ScanConfig::default()).unwrap();
    assert_eq!(probe.name(), "HTTP system info probe");
}

#[tokio::test]
async fn test_probe_reads_node_telemetry() {
    let port = spawn_fake_node(system_info(json!({
        "hashRate": 512.3,
        "hashRate_1h": 498.7,
        "temp": 58.5,
        "power": 13.9,
        "bestDiff": "45.2M",
        "hostname": "bitaxe"
    })))
    .await;

    let record = probe_port(port, Duration::from_millis(1000)).await.unwrap();
    assert_eq!(record.address, "127.0.0.1");
    assert_eq!(record.hash_rate_ghs, Some(498.7));
    assert_eq!(record.temperature_c, Some(58.5));
    assert_eq!(record.power_w, Some(13.9));
    assert_eq!(record.best_difficulty.as_deref(), Some("45.2M"));
}

#[tokio::test]
async fn test_probe_ignores_non_success_status() {
    let router = Router::new().route(
        "/api/system/info",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "hashRate": 1.0 }))) }),
    );
    let port = spawn_fake_node(router).await;
    assert!(probe_port(port, Duration::from_millis(1000)).await.is_none());
}

#[tokio::test]
async fn test_probe_ignores_malformed_body() {
    let router = Router::new().route("/api/system/info", get(|| async { "<html>router</html>" }));
    let port = spawn_fake_node(router).await;
    assert!(probe_port(port, Duration::from_millis(1000)).await.is_none());
}

#[tokio::test]
async fn test_probe_ignores_body_without_telemetry() {
    let port = spawn_fake_node(system_info(json!({ "hostname": "printer" }))).await;
    assert!(probe_port(port, Duration::from_millis(1000)).await.is_none());
}

#[tokio::test]
async fn test_probe_gives_up_after_timeout() {
    let router = Router::new().route(
        "/api/system/info",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "hashRate": 1.0 }))
        }),
    );
    let port = spawn_fake_node(router).await;

    let started = std::time::Instant::now();
    assert!(probe_port(port, Duration::from_millis(200)).await.is_none());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_probe_on_closed_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    assert!(probe_port(port, Duration::from_millis(500)).await.is_none());
}

#[tokio::test]
async fn test_loopback_scan_finds_fake_node() {
    let port = spawn_fake_node(system_info(json!({ "hashRate": 1200.0, "power": 18.0 }))).await;

    let config = ScanConfig::default().with_port(port).with_scan_timeout(500);
    let scout = FleetScout::new(Arc::new(MemoryStore::new()), config).unwrap();
    let response = scout
        .scan(ScanRequest {
            base_address: "127.0.0.".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].address, "127.0.0.1");
    let (_, aggregate) = scout.snapshot().await;
    assert_eq!(aggregate.total_hash_rate_ghs, 1200.0);
    assert_eq!(aggregate.device_count, 1);
}
