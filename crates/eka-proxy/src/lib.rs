//! EKA-AI pass-through proxy. Answers its own health checks and CORS preflights and
//! forwards everything else, path and query intact, to `backend_url`.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8001;
const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const SERVICE_NAME: &str = "eka-ai-proxy";
/// Largest request body buffered for forwarding.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Env fallback: `NODE_BACKEND_URL`.
    pub backend_url: String,
    pub timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProxyConfig {
    /// Precedence: `EKA_PROXY__*` env > `EKA_PROXY_CONFIG` file (default
    /// `config/proxy.toml`) > `NODE_BACKEND_URL` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("EKA_PROXY_CONFIG")
            .unwrap_or_else(|_| "config/proxy.toml".to_string());
        let backend_default =
            std::env::var("NODE_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());

        let builder = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("backend_url", backend_default)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(
                config::Environment::with_prefix("EKA_PROXY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Backend timeout")]
    Timeout,
    #[error("{0}")]
    Upstream(reqwest::Error),
    #[error("request body: {0}")]
    Body(axum::Error),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Timeout
        } else {
            ProxyError::Upstream(e)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Timeout => {
                tracing::warn!("backend timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    Json(json!({ "error": "Backend timeout" })),
                )
                    .into_response()
            }
            other => {
                tracing::error!(error = %other, "proxy error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string(), "detail": "Proxy error" })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    backend_url: Arc<str>,
}

pub fn build_app(config: &ProxyConfig) -> Result<Router, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
    let state = ProxyState {
        client,
        backend_url: Arc::from(config.backend_url.trim_end_matches('/')),
    };
    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/health", get(api_health))
        .fallback(forward)
        .with_state(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn api_health(State(state): State<ProxyState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME, "backend": &*state.backend_url }))
}

async fn forward(State(state): State<ProxyState>, req: Request) -> Result<Response, ProxyError> {
    if req.method() == Method::OPTIONS {
        return Ok(preflight());
    }

    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.backend_url, path_and_query);
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(ProxyError::Body)?;

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    // Bodies are relayed as-is, so ask the backend for an uncompressed one.
    headers.remove(header::ACCEPT_ENCODING);

    tracing::debug!(method = %parts.method, %url, "forwarding");
    let upstream = state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let mut out_headers = relay_headers(upstream.headers());
    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    out_headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    *response.headers_mut() = out_headers;
    Ok(response)
}

/// Upstream response headers minus the framing ones the proxy recomputes.
fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    headers.remove(header::CONTENT_ENCODING);
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONTENT_LENGTH);
    headers
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_drops_framing_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let relayed = relay_headers(&upstream);
        assert!(relayed.get(header::CONTENT_ENCODING).is_none());
        assert!(relayed.get(header::TRANSFER_ENCODING).is_none());
        assert!(relayed.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(relayed[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn defaults() {
        let cfg = ProxyConfig::default();
        assert_eq!(cfg.backend_url, "http://localhost:5000");
        assert_eq!(cfg.timeout(), Duration::from_secs(60));
    }
}
