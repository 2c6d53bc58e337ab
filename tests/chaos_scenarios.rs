//! End-to-end chaos scenarios against a running backend.

use std::time::{Duration, Instant};

use bluegreen_chaos::chaos::ChaosMode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_healthz_normal_mode() {
    let backend = common::start_backend("blue", "blue-v1", Duration::from_secs(1)).await;
    let client = common::client();

    let started = Instant::now();
    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy" }));
    assert!(elapsed < Duration::from_millis(500), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_version_echoes_identity() {
    let backend = common::start_backend("green", "green-2024.10.1", Duration::from_secs(1)).await;
    let client = common::client();

    let mut last_timestamp: Option<chrono::DateTime<chrono::FixedOffset>> = None;
    for _ in 0..5 {
        let res = client.get(backend.url("/version")).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["x-app-pool"], "green");
        assert_eq!(res.headers()["x-release-id"], "green-2024.10.1");

        let body: Value = res.json().await.unwrap();
        assert_eq!(body["app"], "green");
        assert_eq!(body["release"], "green-2024.10.1");

        let ts = chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).unwrap();
        if let Some(prev) = last_timestamp {
            assert!(ts >= prev, "timestamp went backwards: {} < {}", ts, prev);
        }
        last_timestamp = Some(ts);
    }
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    let res = client
        .get(backend.url("/healthz"))
        .header("x-request-id", "drill-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "drill-42");
}

#[tokio::test]
async fn test_error_mode_then_stop() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    let res = client
        .post(backend.url("/chaos/start?mode=error"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "chaos started", "mode": "error" }));

    for path in ["/healthz", "/version", "/healthz"] {
        let res = client.get(backend.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 500, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Chaos: Simulated error" }));
    }

    let res = client.post(backend.url("/chaos/stop")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "chaos stopped" }));

    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_invalid_mode_leaves_state_unchanged() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    client
        .post(backend.url("/chaos/start?mode=error"))
        .send()
        .await
        .unwrap();

    for query in ["?mode=bogus", "?mode=", "?mode=none", "?mode=ERROR", ""] {
        let res = client
            .post(backend.url(&format!("/chaos/start{}", query)))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "query {query:?}");
        let body: Value = res.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Invalid mode"));
    }

    // still in error mode
    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(backend.state.chaos.current_mode(), ChaosMode::Error);
}

#[tokio::test]
async fn test_invalid_mode_from_clean_state() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    let res = client
        .post(backend.url("/chaos/start?mode=bogus"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_timeout_mode_delays_then_succeeds() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    let res = client
        .post(backend.url("/chaos/start?mode=timeout"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["mode"], "timeout");

    let started = Instant::now();
    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1), "returned after {:?}", started.elapsed());
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_timeout_mode_does_not_block_other_requests() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(2)).await;
    let client = common::client();

    client
        .post(backend.url("/chaos/start?mode=timeout"))
        .send()
        .await
        .unwrap();

    let slow_client = client.clone();
    let slow_url = backend.url("/healthz");
    let slow = tokio::spawn(async move {
        let started = Instant::now();
        let res = slow_client.get(slow_url).send().await.unwrap();
        (res.status(), started.elapsed())
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    // control plane stays responsive while a health request is suspended
    let started = Instant::now();
    let res = client.get(backend.url("/chaos")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() < Duration::from_millis(500));

    let res = client.post(backend.url("/chaos/stop")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let started = Instant::now();
    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() < Duration::from_millis(500));

    // the suspended request keeps the mode it read on arrival
    let (status, elapsed) = slow.await.unwrap();
    assert_eq!(status, 200);
    assert!(elapsed >= Duration::from_secs(2), "returned after {:?}", elapsed);
}

#[tokio::test]
async fn test_abandoned_timeout_request_does_not_wedge_server() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(30)).await;
    let client = common::client();

    client
        .post(backend.url("/chaos/start?mode=timeout"))
        .send()
        .await
        .unwrap();

    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .no_proxy()
        .build()
        .unwrap();
    let err = impatient.get(backend.url("/healthz")).send().await.unwrap_err();
    assert!(err.is_timeout());

    client.post(backend.url("/chaos/stop")).send().await.unwrap();
    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_unknown_routes() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    let res = client.get(backend.url("/does/not/exist")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Not found" }));

    let res = client.delete(backend.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = client.get(backend.url("/chaos/start")).send().await.unwrap();
    assert_eq!(res.status(), 405);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Method not allowed" }));
}

#[tokio::test]
async fn test_concurrent_control_and_polling() {
    let backend = common::start_backend("blue", "v1", Duration::from_secs(1)).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        let start_error = backend.url("/chaos/start?mode=error");
        let stop = backend.url("/chaos/stop");
        tasks.push(tokio::spawn(async move {
            for j in 0..10 {
                let url = if (i + j) % 2 == 0 { &start_error } else { &stop };
                let res = client.post(url).send().await.unwrap();
                assert_eq!(res.status(), 200);
            }
        }));
    }
    for _ in 0..4 {
        let client = client.clone();
        let healthz = backend.url("/healthz");
        let mode = backend.url("/chaos");
        tasks.push(tokio::spawn(async move {
            for _ in 0..20 {
                let res = client.get(&healthz).send().await.unwrap();
                assert!(matches!(res.status().as_u16(), 200 | 500), "{}", res.status());

                let body: Value = client.get(&mode).send().await.unwrap().json().await.unwrap();
                let seen = body["mode"].as_str().unwrap().to_string();
                assert!(seen == "none" || seen == "error", "torn mode {seen:?}");
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // last call wins
    client.post(backend.url("/chaos/stop")).send().await.unwrap();
    assert_eq!(backend.state.chaos.current_mode(), ChaosMode::None);
    let res = client.get(backend.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), 200);
}
