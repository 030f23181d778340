//! Poll cycle tests: exporter against the mock device

use axum::http::StatusCode;
use std::time::Duration;

use wallconnector_exporter::device::Endpoint;
use wallconnector_exporter::metrics::{field_metric_names, names};
use wallconnector_exporter::Exporter;

use crate::mock_device::{config_for, duration, sample, series, up, value_of, MockDevice, Reply};

const LIFETIME: &str = "/api/1/lifetime";
const VERSION: &str = "/api/1/version";
const VITALS: &str = "/api/1/vitals";

#[tokio::test]
async fn test_all_endpoints_up() {
    let addr = MockDevice::default().spawn().await;
    let exporter = Exporter::new(&config_for(addr, 1000));

    let body = exporter.collect().await.unwrap();

    for path in [LIFETIME, VERSION, VITALS] {
        assert_eq!(up(&body, path), Some(1.0), "{} should be up\n{}", path, body);
        assert!(duration(&body, path).unwrap() >= 0.0);
    }

    assert_eq!(sample(&body, names::UPTIME), Some(120.0));
    assert_eq!(sample(&body, names::CHARGE_STARTS), Some(5.0));
    assert_eq!(sample(&body, names::ENERGY_DELIVERED), Some(1_802_543.0));
    assert_eq!(sample(&body, names::VEHICLE_CONNECTED), Some(1.0));
    assert_eq!(sample(&body, names::CURRENT_ALERTS), Some(2.0));
    assert_eq!(sample(&body, names::GRID_HZ), Some(49.987));
    assert_eq!(sample(&body, names::SESSION_ENERGY), Some(8120.4));
    assert_eq!(sample(&body, names::SESSION_DURATION), Some(2210.0));
    assert_eq!(
        sample(&body, &format!("{}{{phase=\"n\"}}", names::PHASE_CURRENT)),
        Some(15.7)
    );

    assert!(body.contains("# TYPE teslawallconnector_session_energy_watt_hours_total counter"));
    assert!(body.contains("# TYPE teslawallconnector_uptime_seconds gauge"));
}

#[tokio::test]
async fn test_info_metric_labels() {
    let addr = MockDevice::default().spawn().await;
    let exporter = Exporter::new(&config_for(addr, 1000));

    let body = exporter.collect().await.unwrap();
    let info = series(&body, names::INFO);

    assert_eq!(info.len(), 1, "{}", body);
    let line = info[0];
    assert!(line.contains(r#"firmware_version="23.36.1+g7f2a8fe6e41a4c""#), "{}", line);
    assert!(line.contains(r#"part_number="1529455-02-D""#), "{}", line);
    assert!(line.contains(r#"serial_number="PGT22190001234""#), "{}", line);
    assert_eq!(value_of(line), 1.0);
}

#[tokio::test]
async fn test_vitals_timeout_leaves_other_endpoints_intact() {
    let addr = MockDevice {
        vitals: Reply::Hang(Duration::from_secs(5)),
        ..Default::default()
    }
    .spawn()
    .await;
    let exporter = Exporter::new(&config_for(addr, 200));

    let body = exporter.collect().await.unwrap();

    assert_eq!(up(&body, LIFETIME), Some(1.0));
    assert_eq!(sample(&body, names::UPTIME), Some(120.0));
    assert_eq!(sample(&body, names::CHARGE_STARTS), Some(5.0));

    assert_eq!(up(&body, VERSION), Some(1.0));
    assert_eq!(series(&body, names::INFO).len(), 1);

    assert_eq!(up(&body, VITALS), Some(0.0));
    for name in field_metric_names(Endpoint::Vitals) {
        assert!(series(&body, name).is_empty(), "unexpected {} in\n{}", name, body);
    }

    for path in [LIFETIME, VERSION, VITALS] {
        assert!(duration(&body, path).is_some(), "missing duration for {}", path);
    }
    let vitals_duration = duration(&body, VITALS).unwrap();
    assert!(vitals_duration >= 0.15 && vitals_duration < 5.0, "{}", vitals_duration);
}

#[tokio::test]
async fn test_malformed_json_marks_endpoint_down() {
    let addr = MockDevice {
        lifetime: Reply::Json(r#"{"uptime_s": 120, "charge_starts": "#),
        ..Default::default()
    }
    .spawn()
    .await;
    let exporter = Exporter::new(&config_for(addr, 1000));

    let body = exporter.collect().await.unwrap();

    assert_eq!(up(&body, LIFETIME), Some(0.0));
    for name in field_metric_names(Endpoint::Lifetime) {
        assert!(series(&body, name).is_empty(), "unexpected {}", name);
    }
    assert!(duration(&body, LIFETIME).is_some());
    assert_eq!(up(&body, VITALS), Some(1.0));
    assert_eq!(up(&body, VERSION), Some(1.0));
}

#[tokio::test]
async fn test_negative_lifetime_value_keeps_endpoint_up() {
    let addr = MockDevice {
        lifetime: Reply::Json(r#"{"uptime_s": 120, "charge_starts": 5, "thermal_foldbacks": -1}"#),
        ..Default::default()
    }
    .spawn()
    .await;
    let exporter = Exporter::new(&config_for(addr, 1000));

    let body = exporter.collect().await.unwrap();

    assert_eq!(up(&body, LIFETIME), Some(1.0));
    assert_eq!(sample(&body, names::THERMAL_FOLDBACKS), Some(-1.0));
    assert_eq!(sample(&body, names::UPTIME), Some(120.0));
}

#[tokio::test]
async fn test_error_status_marks_endpoint_down() {
    let addr = MockDevice {
        version: Reply::Status(StatusCode::SERVICE_UNAVAILABLE),
        ..Default::default()
    }
    .spawn()
    .await;
    let exporter = Exporter::new(&config_for(addr, 1000));

    let body = exporter.collect().await.unwrap();

    assert_eq!(up(&body, VERSION), Some(0.0));
    assert!(series(&body, names::INFO).is_empty());
    assert_eq!(up(&body, LIFETIME), Some(1.0));
}

#[tokio::test]
async fn test_unreachable_device_all_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let exporter = Exporter::new(&config_for(addr, 300));

    let body = exporter.collect().await.unwrap();

    for path in [LIFETIME, VERSION, VITALS] {
        assert_eq!(up(&body, path), Some(0.0));
        assert!(duration(&body, path).unwrap() >= 0.0);
    }
    assert!(series(&body, names::UPTIME).is_empty());
    assert!(series(&body, names::INFO).is_empty());
    assert!(series(&body, names::GRID_V).is_empty());
}

#[tokio::test]
async fn test_concurrent_polls_are_independent() {
    let healthy = MockDevice::default().spawn().await;
    let broken = MockDevice {
        lifetime: Reply::Status(StatusCode::INTERNAL_SERVER_ERROR),
        version: Reply::Status(StatusCode::INTERNAL_SERVER_ERROR),
        vitals: Reply::Status(StatusCode::INTERNAL_SERVER_ERROR),
    }
    .spawn()
    .await;

    let good = Exporter::new(&config_for(healthy, 1000));
    let bad = Exporter::new(&config_for(broken, 1000));

    let (a, b, c) = tokio::join!(good.collect(), bad.collect(), good.collect());
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(sample(&a, names::UPTIME), Some(120.0));
    assert_eq!(sample(&c, names::UPTIME), Some(120.0));
    assert!(series(&b, names::UPTIME).is_empty());
    assert_eq!(up(&b, LIFETIME), Some(0.0));
}
