use crate::handlers::common::{created_response, map_service_error, validate_input};
use crate::{
    entities::DeliveryType, errors::ApiError, services::checkout::PlaceOrderInput, AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for checkout endpoints
pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/:cart_id/place-order", post(place_order))
}

/// Places an order from a cart and returns the recorded order plus the
/// WhatsApp hand-off link.
async fn place_order(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let placed = state
        .services
        .checkout
        .place_order(
            cart_id,
            PlaceOrderInput {
                name: payload.name,
                phone: payload.phone,
                address: payload.address.unwrap_or_default(),
                delivery_type: payload.delivery_type,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(placed))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct PlaceOrderRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[validate(length(min = 6, max = 20))]
    phone: String,
    address: Option<String>,
    delivery_type: DeliveryType,
}
