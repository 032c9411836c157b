use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use hostpulse::metrics::fake::FakeSource;
use hostpulse::metrics::source::ProcessSample;
use hostpulse::metrics::{NetCounters, SamplingEngine};
use hostpulse::server::{AppState, router};

fn test_app(source: FakeSource) -> (Router, Arc<FakeSource>) {
    let source = Arc::new(source);
    let engine = SamplingEngine::new(Arc::clone(&source)).expect("engine construction");
    (router(AppState::new(engine)), source)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn metrics_returns_snapshot_with_contract_fields() {
    let (app, _source) = test_app(FakeSource::new().with_net_readings(vec![
        NetCounters {
            bytes_sent: 1000,
            bytes_recv: 2000,
        },
        NetCounters {
            bytes_sent: 1800,
            bytes_recv: 2000,
        },
    ]));

    let (status, body) = send(&app, "GET", "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);

    for field in [
        "disk_usage_percent",
        "memory_percent",
        "cpu_percent",
        "upload_speed",
        "download_speed",
        "bytes_sent",
        "bytes_recv",
        "boot_time",
        "uptime",
        "top_processes",
    ] {
        assert!(body.get(field).is_some(), "missing field {field}: {body}");
    }
    assert_eq!(body["upload_speed"], 3200.0);
    assert_eq!(body["download_speed"], 0.0);
    assert_eq!(body["bytes_sent"], 1800);
}

#[tokio::test]
async fn stop_returns_stopped_marker_on_metrics() {
    let (app, _source) = test_app(FakeSource::new());

    let (status, body) = send(&app, "POST", "/api/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Monitoring stopped");

    let (status, body) = send(&app, "GET", "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Monitoring is stopped");
}

#[tokio::test]
async fn stopped_requests_never_touch_the_rate_tracker() {
    let (app, source) = test_app(FakeSource::new());

    // Engine construction seeds the tracker with one read.
    assert_eq!(source.net_reads(), 1);

    send(&app, "POST", "/api/stop").await;
    for _ in 0..5 {
        let (_, body) = send(&app, "GET", "/api/metrics").await;
        assert_eq!(body["message"], "Monitoring is stopped");
    }

    assert_eq!(source.net_reads(), 1);
}

#[tokio::test]
async fn start_after_stop_resumes_real_snapshots() {
    let (app, _source) = test_app(FakeSource::new());

    send(&app, "POST", "/api/stop").await;

    let (status, body) = send(&app, "POST", "/api/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Monitoring started");

    let (status, body) = send(&app, "GET", "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("cpu_percent").is_some(), "expected a snapshot: {body}");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn top_processes_capped_at_six_over_the_wire() {
    let processes = (0..10)
        .map(|i| ProcessSample {
            pid: i,
            name: format!("proc{i}"),
            cpu_percent: i as f32,
            memory_percent: 0.5,
        })
        .collect();
    let (app, _source) = test_app(FakeSource::new().with_processes(processes));

    let (_, body) = send(&app, "GET", "/api/metrics").await;
    let top = body["top_processes"].as_array().unwrap();
    assert_eq!(top.len(), 6);
    assert_eq!(top[0]["pid"], 9);
    assert_eq!(top[0]["name"], "proc9");
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let (app, _source) = test_app(FakeSource::new());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/metrics")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "missing CORS header"
    );
}
