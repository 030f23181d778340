//! End-to-end tests through the exporter's HTTP endpoint

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use wallconnector_exporter::metrics::names;
use wallconnector_exporter::{server, Exporter};

use crate::mock_device::{config_for, sample, series, up, value_of, MockDevice, Reply};

async fn spawn_exporter(device: SocketAddr, timeout_ms: u64, metrics_path: &str) -> SocketAddr {
    let mut config = config_for(device, timeout_ms);
    config.labels.insert("site".to_string(), "garage".to_string());

    let exporter = Arc::new(Exporter::new(&config));
    let app = server::router(exporter, metrics_path);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_metrics_endpoint_serves_poll() {
    let device = MockDevice {
        vitals: Reply::Hang(Duration::from_secs(5)),
        ..Default::default()
    }
    .spawn()
    .await;
    let exporter = spawn_exporter(device, 200, "/metrics").await;

    let response = reqwest::get(format!("http://{}/metrics", exporter)).await.unwrap();
    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "{}", content_type);

    let body = response.text().await.unwrap();

    // Static labels are attached to every series
    let uptime = series(&body, names::UPTIME);
    assert_eq!(uptime.len(), 1);
    assert!(uptime[0].contains(r#"site="garage""#), "{}", uptime[0]);
    assert_eq!(value_of(uptime[0]), 120.0);

    assert_eq!(series(&body, names::INFO).len(), 1);
    assert!(series(&body, names::GRID_HZ).is_empty());

    let vitals_up: Vec<_> = series(&body, names::UP)
        .into_iter()
        .filter(|l| l.contains("/api/1/vitals"))
        .collect();
    assert_eq!(vitals_up.len(), 1);
    assert_eq!(value_of(vitals_up[0]), 0.0);
    assert_eq!(series(&body, names::SCRAPE_DURATION).len(), 3);
}

#[tokio::test]
async fn test_each_request_polls_again() {
    let device = MockDevice::default().spawn().await;
    let exporter = spawn_exporter(device, 1000, "/probe").await;
    let url = format!("http://{}/probe", exporter);

    for _ in 0..2 {
        let body = reqwest::get(&url).await.unwrap().text().await.unwrap();
        assert_eq!(series(&body, names::UP).len(), 3);
        assert_eq!(series(&body, names::BUILD_INFO).len(), 1);
    }
}

#[tokio::test]
async fn test_landing_page_and_unknown_path() {
    let device = MockDevice::default().spawn().await;
    let exporter = spawn_exporter(device, 1000, "/metrics").await;

    let landing = reqwest::get(format!("http://{}/", exporter)).await.unwrap();
    assert!(landing.status().is_success());
    let html = landing.text().await.unwrap();
    assert!(html.contains("href=\"/metrics\""));

    let missing = reqwest::get(format!("http://{}/nope", exporter)).await.unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn test_render_without_labels_matches_helpers() {
    // Sanity check of the sample helpers against a plain exporter
    let device = MockDevice::default().spawn().await;
    let exporter = Exporter::new(&config_for(device, 1000));
    let body = exporter.collect().await.unwrap();

    assert_eq!(up(&body, "/api/1/vitals"), Some(1.0));
    assert_eq!(sample(&body, names::VEHICLE_CONNECTED), Some(1.0));
}
