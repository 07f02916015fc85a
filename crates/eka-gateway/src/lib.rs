//! EKA-AI Gateway: axum HTTP surface under `/api` plus the `/ws` real-time channel.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod realtime;
pub mod state;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::any::Any;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};

pub use state::AppState;

pub fn build_app(state: AppState) -> Router {
    let cors_layer = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/ai/ask", post(handlers::ai::ask))
        .route("/api/ai/history", get(handlers::ai::history))
        .route("/api/urgaa/stations", get(handlers::dashboards::stations))
        .route("/api/urgaa/metrics", get(handlers::dashboards::urgaa_metrics))
        .route(
            "/api/urgaa/stations/:id/alert",
            post(handlers::dashboards::station_alert),
        )
        .route("/api/gstsaas/job-card", post(handlers::workshop::create_job_card))
        .route("/api/gstsaas/job-cards", get(handlers::workshop::list_job_cards))
        .route("/api/arjun/courses", get(handlers::dashboards::courses))
        .route("/api/arjun/progress", get(handlers::dashboards::progress))
        .route("/api/ignition/metrics", get(handlers::dashboards::customer_metrics))
        .route("/api/ignition/churn-risks", get(handlers::dashboards::churn_risks))
        .route(
            "/api/support/tickets",
            get(handlers::workshop::list_tickets).post(handlers::workshop::create_ticket),
        )
        .route("/api/support/metrics", get(handlers::workshop::support_metrics))
        .route("/api/finance/dashboard", get(handlers::dashboards::finance_dashboard))
        .route("/api/legal/contracts", get(handlers::dashboards::contracts))
        .route("/api/departments", get(handlers::dashboards::departments))
        .route("/api/products", get(handlers::dashboards::products))
        .route("/ws", get(realtime::ws_handler))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer)
}

/// Empty origin list means any origin (no credentials).
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let msg = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("handler panicked");
    tracing::error!(panic = %msg, "handler panicked");
    error::internal_error(msg)
}
