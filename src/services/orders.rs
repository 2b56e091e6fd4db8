use crate::{
    entities::{order, Order, OrderItem, OrderItemModel, OrderModel},
    errors::ServiceError,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Read access to the append-only order log. Orders are written exclusively
/// by the checkout workflow and never mutated afterwards.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists orders newest first with pagination.
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let paginator = Order::find()
            .order_by_desc(order::Column::PlacedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((data, total))
    }

    /// Fetches one order with its item snapshot.
    pub async fn get_order(&self, id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let items = order.find_related(OrderItem).all(&*self.db).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Fetches by the human-facing order number.
    pub async fn get_order_by_number(&self, number: &str) -> Result<OrderWithItems, ServiceError> {
        let order = Order::find()
            .filter(order::Column::OrderNumber.eq(number))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", number)))?;

        let items = order.find_related(OrderItem).all(&*self.db).await?;
        Ok(OrderWithItems { order, items })
    }
}

/// Order with its item snapshot
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
}
