use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health_check))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!("database ping failed: {}", e);
            "down"
        }
    };

    Json(HealthStatus {
        status: "ok",
        database,
    })
}
