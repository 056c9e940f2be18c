//! Cluster config cache, pass-through proxy, health and base path.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

mod common;

use common::{client, config_for, start_mock_upstream, TestServer};

#[tokio::test]
async fn test_config_loaded_lazily_and_reloaded() {
    let version = Arc::new(AtomicU32::new(0));
    let counter = version.clone();
    let upstream = start_mock_upstream(move |request| {
        let counter = counter.clone();
        async move {
            if request.path() != "/v2/GetClusterStatus" {
                return (404, "{}".to_string());
            }
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => (200, json!({ "layoutVersion": 1 }).to_string()),
                1 => (200, json!({ "layoutVersion": 2 }).to_string()),
                _ => (503, "{}".to_string()),
            }
        }
    })
    .await;
    let mut config = config_for(upstream);
    config.upstream.list_retries = 0;
    let server = TestServer::start(config).await;
    let client = client();

    let body: Value = client.get(server.api("/config")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "data": { "layoutVersion": 1 } }));

    // Served from the cache; no second upstream call.
    let body: Value = client.get(server.api("/config")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"], json!({ "layoutVersion": 1 }));
    assert_eq!(version.load(Ordering::SeqCst), 1);

    let res = client.post(server.api("/config/reload")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"], json!({ "layoutVersion": 2 }));

    // A failed reload reports the error and keeps the last good value.
    let res = client.post(server.api("/config/reload")).send().await.unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = client.get(server.api("/config")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"], json!({ "layoutVersion": 2 }));
}

#[tokio::test]
async fn test_config_unavailable() {
    let upstream = start_mock_upstream(|_| async { (500, "{}".to_string()) }).await;
    let server = TestServer::start(config_for(upstream)).await;

    let res = client().get(server.api("/config")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_passthrough_forwards_request() {
    let upstream = start_mock_upstream(|request| async move {
        let echo = json!({
            "method": request.method,
            "target": request.target,
            "body": request.body,
            "authorization": request.header("authorization"),
            "contentType": request.header("content-type"),
        });
        match request.path() {
            "/v2/CreateBucket" => (200, echo.to_string()),
            _ => (404, r#"{"code":"NoSuchBucket"}"#.to_string()),
        }
    })
    .await;
    let server = TestServer::start(config_for(upstream)).await;
    let client = client();

    let res = client
        .post(server.api("/v2/CreateBucket?dry=1"))
        .header("content-type", "application/json")
        .body(r#"{"globalAlias":"photos"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["method"], json!("POST"));
    assert_eq!(echo["target"], json!("/v2/CreateBucket?dry=1"));
    assert_eq!(echo["body"], json!(r#"{"globalAlias":"photos"}"#));
    assert_eq!(echo["authorization"], json!("Bearer test-token"));
    assert_eq!(echo["contentType"], json!("application/json"));

    // Upstream errors come back verbatim, not wrapped.
    let res = client.get(server.api("/v2/GetBucketInfo?id=nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "code": "NoSuchBucket" }));
}

#[tokio::test]
async fn test_health_and_base_path() {
    let upstream = start_mock_upstream(|_| async { (200, "[]".to_string()) }).await;
    let mut config = config_for(upstream);
    config.server.base_path = "/admin".into();
    let server = TestServer::start(config).await;
    let client = client();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));

    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(res.headers()["location"], "/admin");

    let res = client.get(server.api("/buckets")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    // Anything outside the base path goes back to it.
    for path in ["/api/buckets", "/index.html", "/administrator"] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 301, "{}", path);
        assert_eq!(res.headers()["location"], "/admin");
    }

    let res = client.get(server.api("/nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "no such route: /admin/api/nope" }));
}
