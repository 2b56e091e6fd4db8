use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{errors::ApiError, services::cart::AddItemInput, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_cart))
        .route("/:id", get(get_cart))
        .route("/:id/items", post(add_item))
        .route("/:id/items/:item_id", put(update_item))
        .route("/:id/items/:item_id", delete(remove_item))
        .route("/:id/clear", post(clear_cart))
        .route("/:id/coupon", post(apply_coupon))
        .route("/:id/coupon", delete(remove_coupon))
}

async fn create_cart(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .create_cart()
        .await
        .map_err(map_service_error)?;
    Ok(crate::handlers::common::created_response(cart))
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .cart
        .add_item(
            cart_id,
            AddItemInput {
                menu_item_id: payload.menu_item_id,
                quantity: payload.quantity,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .update_item_quantity(cart_id, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .remove_item(cart_id, item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .clear_cart(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

async fn apply_coupon(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<ApplyCouponRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .cart
        .apply_coupon(cart_id, &payload.code)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

async fn remove_coupon(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .remove_coupon(cart_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct AddItemRequest {
    menu_item_id: Uuid,
    #[validate(range(min = 1))]
    quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
struct UpdateQuantityRequest {
    quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct ApplyCouponRequest {
    #[validate(length(min = 1))]
    code: String,
}
