//! `GET /health`: reachability of the stage store and whether its schema is
//! in place.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when the store answers and the stages table exists.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the `construction_stages` migration has been applied.
    pub schema_ready: bool,
}

impl HealthReport {
    fn status_code(&self) -> StatusCode {
        if self.status == "ok" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let (db_healthy, schema_ready) = match stages_db::schema_ready(&state.pool).await {
        Ok(ready) => (true, ready),
        Err(err) => {
            tracing::warn!(error = %err, "Health probe could not reach the database");
            (false, false)
        }
    };

    let report = HealthReport {
        status: if db_healthy && schema_ready { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema_ready,
    };
    (report.status_code(), Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
