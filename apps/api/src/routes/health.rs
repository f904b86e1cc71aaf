use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

/// Liveness plus a database ping. Answers 503 while the database is down.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = state.db.health_check().await;
    let (code, status, database) = if db_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        tracing::warn!("Health check: database unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            timestamp: Utc::now(),
        }),
    )
}
