use crate::handlers::common::{map_service_error, success_response};
use crate::{errors::ApiError, services::settings::SettingsInput, AppState};
use axum::{
    extract::{Json, State},
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Public route: the settings subset the storefront needs.
pub fn settings_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_public_settings))
}

/// Admin settings routes.
pub fn admin_settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_settings))
        .route("/", put(update_settings))
}

/// Storefront view of the settings: delivery policy only. The WhatsApp
/// number reaches the customer inside the placed-order link, not here.
#[derive(Debug, Serialize, ToSchema)]
struct PublicSettings {
    delivery_fee_enabled: bool,
    delivery_fee_amount: Decimal,
    free_delivery_enabled: bool,
    free_delivery_above: Decimal,
}

async fn get_public_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let settings = state
        .services
        .settings
        .get()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PublicSettings {
        delivery_fee_enabled: settings.delivery_fee_enabled,
        delivery_fee_amount: settings.delivery_fee_amount,
        free_delivery_enabled: settings.free_delivery_enabled,
        free_delivery_above: settings.free_delivery_above,
    }))
}

async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let settings = state
        .services
        .settings
        .get()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(settings))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SettingsRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let settings = state
        .services
        .settings
        .update(SettingsInput {
            whatsapp_number: payload.whatsapp_number,
            delivery_fee_enabled: payload.delivery_fee_enabled,
            delivery_fee_amount: payload.delivery_fee_amount,
            free_delivery_enabled: payload.free_delivery_enabled,
            free_delivery_above: payload.free_delivery_above,
        })
        .await
        .map_err(map_service_error)?;
    Ok(success_response(settings))
}

#[derive(Debug, Deserialize, ToSchema)]
struct SettingsRequest {
    whatsapp_number: String,
    delivery_fee_enabled: bool,
    delivery_fee_amount: Decimal,
    free_delivery_enabled: bool,
    free_delivery_above: Decimal,
}
