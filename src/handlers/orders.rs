use crate::handlers::common::{
    map_service_error, success_response, Paginated, PaginationParams,
};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Admin order log routes. The log is append-only; these are reads.
pub fn admin_orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        .route("/by-number/:number", get(get_order_by_number))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (orders, total) = state
        .services
        .orders
        .list_orders(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(Paginated {
        data: orders,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
    }))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Lookup by the human-facing order number printed in the WhatsApp message.
async fn get_order_by_number(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order_by_number(&number)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}
