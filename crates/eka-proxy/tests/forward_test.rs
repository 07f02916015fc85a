//! Integration test: the proxy in front of a throwaway axum backend on 127.0.0.1:0.

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::Router;
use eka_proxy::{build_app, ProxyConfig};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

/// Echoes what it received and sets headers the proxy must strip or keep.
async fn echo(headers: HeaderMap, req: Request) -> impl IntoResponse {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let body = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let seen = json!({
        "method": method,
        "uri": uri,
        "body": String::from_utf8_lossy(&body),
        "host": headers.get(header::HOST).and_then(|v| v.to_str().ok()),
        "authorization": headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
    });
    (
        StatusCode::ACCEPTED,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_ENCODING, "identity"),
            (header::HeaderName::from_static("x-backend"), "node"),
        ],
        seen.to_string(),
    )
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "late"
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/slow", get(slow))
        .fallback(any(echo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn proxy(backend_url: String, timeout_secs: u64) -> Router {
    build_app(&ProxyConfig {
        backend_url,
        timeout_secs,
        ..ProxyConfig::default()
    })
    .unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes: Bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn forwards_path_query_body_and_headers() {
    let backend = spawn_backend().await;
    let app = proxy(backend.clone(), 5);

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login?next=%2Fhome&x=1")
        .header(header::HOST, "public.example.com")
        .header(header::AUTHORIZATION, "Bearer abc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"a@b.co"}"#))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(res.headers()["x-backend"], "node");
    assert!(res.headers().get(header::CONTENT_ENCODING).is_none());

    let seen = body_json(res.into_body()).await;
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["uri"], "/api/auth/login?next=%2Fhome&x=1");
    assert_eq!(seen["body"], r#"{"email":"a@b.co"}"#);
    assert_eq!(seen["authorization"], "Bearer abc");
    assert_ne!(seen["host"], "public.example.com");
    assert_eq!(
        seen["host"].as_str().unwrap(),
        backend.trim_start_matches("http://")
    );
}

#[tokio::test]
async fn non_api_paths_are_forwarded_too() {
    let backend = spawn_backend().await;
    let app = proxy(backend, 5);

    let req = Request::builder()
        .method("DELETE")
        .uri("/socket.io/?EIO=4")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let seen = body_json(res.into_body()).await;
    assert_eq!(seen["method"], "DELETE");
    assert_eq!(seen["uri"], "/socket.io/?EIO=4");
}

#[tokio::test]
async fn preflight_and_health_are_local() {
    let app = proxy("http://127.0.0.1:9".to_string(), 5);

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/ai/ask")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(res.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .contains("PATCH"));

    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["backend"], "http://127.0.0.1:9");

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn slow_backend_yields_504() {
    let backend = spawn_backend().await;
    let app = proxy(backend, 1);

    let req = Request::builder().uri("/slow").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(res.into_body()).await, json!({"error": "Backend timeout"}));
}

#[tokio::test]
async fn unreachable_backend_yields_500() {
    // Nothing listens on the discard port.
    let app = proxy("http://127.0.0.1:9".to_string(), 2);

    let req = Request::builder().uri("/api/products").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(res.into_body()).await;
    assert_eq!(json["detail"], "Proxy error");
    assert!(json["error"].is_string());
}
