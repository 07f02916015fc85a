//! Department dashboards backed by fixtures: URGAA, ARJUN, IGNITION, finance, legal.

use axum::extract::{Path, State};
use axum::Json;
use eka_core::fixtures::{
    self, ChurnRisk, Contract, Course, CustomerMetrics, Department, FinanceDashboard, Product,
    Progress, Station, UrgaaMetrics,
};
use eka_core::EkaError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn stations(_user: CurrentUser) -> Json<Vec<Station>> {
    Json(fixtures::stations())
}

pub async fn urgaa_metrics(_user: CurrentUser) -> Json<UrgaaMetrics> {
    Json(fixtures::urgaa_metrics(&fixtures::stations()))
}

#[derive(Deserialize)]
pub struct StationAlertRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Broadcasts a `station_alert` to every live connection.
pub async fn station_alert(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(station_id): Path<String>,
    body: Option<Json<StationAlertRequest>>,
) -> Result<Json<Value>, ApiError> {
    let station = fixtures::find_station(&station_id)
        .ok_or_else(|| EkaError::NotFound(format!("station {} not found", station_id)))?;
    let body = body.map(|Json(b)| b);
    let (message, severity) = match body {
        Some(b) => (b.message, b.severity),
        None => (None, None),
    };
    let alert = json!({
        "station_id": station.id,
        "station_name": station.name,
        "status": station.status,
        "message": message.unwrap_or_else(|| format!("Attention required at {}", station.name)),
        "severity": severity.unwrap_or_else(|| "warning".to_string()),
        "raised_by": user.id,
        "timestamp": chrono::Utc::now(),
    });
    let delivered = state.notifier.emit_station_alert(alert.clone());
    tracing::info!(station_id = station.id, delivered, "station alert broadcast");
    Ok(Json(json!({ "delivered": delivered, "alert": alert })))
}

pub async fn courses(_user: CurrentUser) -> Json<Vec<Course>> {
    Json(fixtures::courses())
}

pub async fn progress(_user: CurrentUser) -> Json<Progress> {
    Json(fixtures::progress())
}

pub async fn customer_metrics(_user: CurrentUser) -> Json<CustomerMetrics> {
    Json(fixtures::customer_metrics())
}

pub async fn churn_risks(_user: CurrentUser) -> Json<Vec<ChurnRisk>> {
    Json(fixtures::churn_risks())
}

pub async fn finance_dashboard(_user: CurrentUser) -> Json<FinanceDashboard> {
    Json(fixtures::finance_dashboard())
}

pub async fn contracts(_user: CurrentUser) -> Json<Vec<Contract>> {
    Json(fixtures::contracts())
}

pub async fn departments() -> Json<Vec<Department>> {
    Json(fixtures::departments())
}

pub async fn products() -> Json<Vec<Product>> {
    Json(fixtures::products())
}
