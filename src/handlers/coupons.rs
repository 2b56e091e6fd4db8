use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    entities::CouponType,
    errors::ApiError,
    services::coupons::CouponInput,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Admin coupon management routes.
pub fn admin_coupons_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_coupons))
        .route("/", post(create_coupon))
        .route("/:id", get(get_coupon))
        .route("/:id", put(update_coupon))
        .route("/:id", delete(delete_coupon))
}

async fn list_coupons(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let coupons = state
        .services
        .coupons
        .list_coupons()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(coupons))
}

async fn get_coupon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let coupon = state
        .services
        .coupons
        .get_coupon(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(coupon))
}

async fn create_coupon(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CouponRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let coupon = state
        .services
        .coupons
        .create_coupon(payload.into_input())
        .await
        .map_err(map_service_error)?;
    Ok(created_response(coupon))
}

async fn update_coupon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CouponRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let coupon = state
        .services
        .coupons
        .update_coupon(id, payload.into_input())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(coupon))
}

async fn delete_coupon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .coupons
        .delete_coupon(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct CouponRequest {
    #[validate(length(min = 1, max = 40))]
    code: String,
    coupon_type: CouponType,
    value: Decimal,
    min_order: Decimal,
    max_cap: Option<Decimal>,
    valid_from: DateTime<Utc>,
    valid_till: DateTime<Utc>,
    usage_limit: Option<i32>,
    #[serde(default = "default_true")]
    is_active: bool,
    applicable_to: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CouponRequest {
    fn into_input(self) -> CouponInput {
        CouponInput {
            code: self.code,
            coupon_type: self.coupon_type,
            value: self.value,
            min_order: self.min_order,
            max_cap: self.max_cap,
            valid_from: self.valid_from,
            valid_till: self.valid_till,
            usage_limit: self.usage_limit,
            is_active: self.is_active,
            applicable_to: self.applicable_to,
        }
    }
}
