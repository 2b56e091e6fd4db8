use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    services::catalog::{CategoryInput, MenuItemInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Public storefront routes: active menu items and the category list.
pub fn menu_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(list_active_items))
        .route("/categories", get(list_categories))
}

/// Admin routes for menu items and categories.
pub fn admin_menu_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(list_all_items))
        .route("/items", post(create_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id", put(update_item))
        .route("/items/:id", delete(delete_item))
        .route("/categories", post(create_category))
        .route("/categories/:id", put(update_category))
        .route("/categories/:id", delete(delete_category))
        .route("/categories/reorder", post(reorder_categories))
}

#[derive(Debug, Deserialize)]
struct MenuQuery {
    category_id: Option<Uuid>,
}

async fn list_active_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MenuQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_active_menu_items(query.category_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(categories))
}

async fn list_all_items(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_all_menu_items()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item = state
        .services
        .catalog
        .get_menu_item(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MenuItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .catalog
        .create_menu_item(payload.into_input())
        .await
        .map_err(map_service_error)?;
    Ok(created_response(item))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .catalog
        .update_menu_item(id, payload.into_input())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_menu_item(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .catalog
        .create_category(CategoryInput {
            name: payload.name,
            sort_order: payload.sort_order,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(category))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .catalog
        .update_category(
            id,
            CategoryInput {
                name: payload.name,
                sort_order: payload.sort_order,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(category))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_category(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn reorder_categories(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .reorder_categories(payload.ordered_ids)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct MenuItemRequest {
    #[validate(length(min = 1, max = 200))]
    name: String,
    description: Option<String>,
    image: Option<String>,
    category_id: Uuid,
    mrp: Decimal,
    selling_price: Decimal,
    #[serde(default)]
    show_discount: bool,
    #[serde(default = "default_true")]
    in_stock: bool,
    #[serde(default)]
    is_best_seller: bool,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

impl MenuItemRequest {
    fn into_input(self) -> MenuItemInput {
        MenuItemInput {
            name: self.name,
            description: self.description,
            image: self.image,
            category_id: self.category_id,
            mrp: self.mrp,
            selling_price: self.selling_price,
            show_discount: self.show_discount,
            in_stock: self.in_stock,
            is_best_seller: self.is_best_seller,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[serde(default)]
    sort_order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
struct ReorderRequest {
    ordered_ids: Vec<Uuid>,
}
