use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{errors::ApiError, services::slides::SlideInput, AppState};
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

/// Public route: active slides in display order.
pub fn slides_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_active_slides))
}

/// Admin slide management routes.
pub fn admin_slides_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_all_slides))
        .route("/", post(create_slide))
        .route("/:id", put(update_slide))
        .route("/:id", delete(delete_slide))
        .route("/reorder", post(reorder_slides))
}

async fn list_active_slides(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let slides = state
        .services
        .slides
        .list_active_slides()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(slides))
}

async fn list_all_slides(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let slides = state
        .services
        .slides
        .list_all_slides()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(slides))
}

async fn create_slide(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SlideRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let slide = state
        .services
        .slides
        .create_slide(payload.into_input())
        .await
        .map_err(map_service_error)?;
    Ok(created_response(slide))
}

async fn update_slide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SlideRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let slide = state
        .services
        .slides
        .update_slide(id, payload.into_input())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(slide))
}

async fn delete_slide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .slides
        .delete_slide(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn reorder_slides(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .slides
        .reorder_slides(payload.ordered_ids)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct SlideRequest {
    #[validate(length(min = 1))]
    image: String,
    #[validate(length(min = 1, max = 200))]
    title: String,
    offer_text: Option<String>,
    linked_item_id: Option<Uuid>,
    #[serde(default)]
    sort_order: i32,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

impl SlideRequest {
    fn into_input(self) -> SlideInput {
        SlideInput {
            image: self.image,
            title: self.title,
            offer_text: self.offer_text,
            linked_item_id: self.linked_item_id,
            sort_order: self.sort_order,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
struct ReorderRequest {
    ordered_ids: Vec<Uuid>,
}
