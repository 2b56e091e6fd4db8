use crate::{
    entities::{
        category, menu_item, Category, CategoryModel, MenuItem, MenuItemModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Menu and category management for the admin console, plus the public
/// catalog reads.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Percentage off list price, rounded to the nearest integer. Zero when the
/// list price is zero.
pub fn discount_percent(mrp: Decimal, selling_price: Decimal) -> i32 {
    if mrp <= Decimal::ZERO {
        return 0;
    }
    ((mrp - selling_price) / mrp * Decimal::from(100))
        .round()
        .to_i32()
        .unwrap_or(0)
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    // ---- Menu items ----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_menu_item(
        &self,
        input: MenuItemInput,
    ) -> Result<MenuItemModel, ServiceError> {
        validate_menu_item_input(&input)?;
        self.ensure_category_exists(input.category_id).await?;

        let id = Uuid::new_v4();
        let item = menu_item::ActiveModel {
            id: Set(id),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            image: Set(input.image),
            category_id: Set(input.category_id),
            mrp: Set(input.mrp),
            selling_price: Set(input.selling_price),
            discount_percent: Set(discount_percent(input.mrp, input.selling_price)),
            show_discount: Set(input.show_discount),
            in_stock: Set(input.in_stock),
            is_best_seller: Set(input.is_best_seller),
            is_active: Set(input.is_active),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let item = item.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::MenuItemCreated(id))
            .await;
        info!("Created menu item '{}' ({})", item.name, id);
        Ok(item)
    }

    /// Updates a menu item. `discount_percent` is recomputed whenever the
    /// prices change, so the stored value never goes stale.
    #[instrument(skip(self, input))]
    pub async fn update_menu_item(
        &self,
        id: Uuid,
        input: MenuItemInput,
    ) -> Result<MenuItemModel, ServiceError> {
        validate_menu_item_input(&input)?;
        self.ensure_category_exists(input.category_id).await?;

        let existing = MenuItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", id)))?;

        let mut active: menu_item::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.description = Set(input.description);
        active.image = Set(input.image);
        active.category_id = Set(input.category_id);
        active.mrp = Set(input.mrp);
        active.selling_price = Set(input.selling_price);
        active.discount_percent = Set(discount_percent(input.mrp, input.selling_price));
        active.show_discount = Set(input.show_discount);
        active.in_stock = Set(input.in_stock);
        active.is_best_seller = Set(input.is_best_seller);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::MenuItemUpdated(id))
            .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_menu_item(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = MenuItem::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Menu item {} not found", id)));
        }
        self.event_sender
            .send_or_log(Event::MenuItemDeleted(id))
            .await;
        Ok(())
    }

    pub async fn get_menu_item(&self, id: Uuid) -> Result<MenuItemModel, ServiceError> {
        MenuItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", id)))
    }

    /// Storefront listing: active items only, optionally narrowed to one
    /// category.
    pub async fn list_active_menu_items(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<MenuItemModel>, ServiceError> {
        let mut query = MenuItem::find().filter(menu_item::Column::IsActive.eq(true));
        if let Some(category_id) = category_id {
            query = query.filter(menu_item::Column::CategoryId.eq(category_id));
        }
        Ok(query
            .order_by_asc(menu_item::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Admin listing: everything, inactive included.
    pub async fn list_all_menu_items(&self) -> Result<Vec<MenuItemModel>, ServiceError> {
        Ok(MenuItem::find()
            .order_by_asc(menu_item::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    // ---- Categories ----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: CategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Category name must not be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let category = category::ActiveModel {
            id: Set(id),
            name: Set(name),
            sort_order: Set(input.sort_order),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let category = category.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::CategoryChanged(id))
            .await;
        Ok(category)
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let existing = Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))?;

        let mut active: category::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.sort_order = Set(input.sort_order);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::CategoryChanged(id))
            .await;
        Ok(updated)
    }

    /// Deletes a category. Refused while menu items still reference it; the
    /// admin must move or delete those first.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        let in_use = MenuItem::find()
            .filter(menu_item::Column::CategoryId.eq(id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Category still has {} menu item(s)",
                in_use
            )));
        }

        let result = Category::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Category {} not found", id)));
        }
        self.event_sender
            .send_or_log(Event::CategoryChanged(id))
            .await;
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::SortOrder)
            .all(&*self.db)
            .await?)
    }

    /// Persists a full new category ordering in one transaction.
    #[instrument(skip(self))]
    pub async fn reorder_categories(&self, ordered_ids: Vec<Uuid>) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let category = Category::find_by_id(*id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))?;
            let mut active: category::ActiveModel = category.into();
            active.sort_order = Set(position as i32);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn ensure_category_exists(&self, category_id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Category {} does not exist", category_id))
            })
    }
}

/// Input for creating or updating a menu item
#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub mrp: Decimal,
    pub selling_price: Decimal,
    pub show_discount: bool,
    pub in_stock: bool,
    pub is_best_seller: bool,
    pub is_active: bool,
}

/// Input for creating or updating a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

fn validate_menu_item_input(input: &MenuItemInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Menu item name must not be empty".to_string(),
        ));
    }
    if input.selling_price < Decimal::ZERO || input.mrp < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Prices must not be negative".to_string(),
        ));
    }
    if input.selling_price > input.mrp {
        return Err(ServiceError::ValidationError(
            "Selling price must not exceed list price".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn discount_percent_rounds_to_nearest() {
        // (249 - 199) / 249 * 100 = 20.08 → 20
        assert_eq!(discount_percent(dec!(249), dec!(199)), 20);
        // (279 - 229) / 279 * 100 = 17.92 → 18
        assert_eq!(discount_percent(dec!(279), dec!(229)), 18);
    }

    #[test]
    fn discount_percent_zero_mrp_is_zero() {
        assert_eq!(discount_percent(dec!(0), dec!(0)), 0);
    }

    #[test]
    fn discount_percent_full_price_is_zero() {
        assert_eq!(discount_percent(dec!(199), dec!(199)), 0);
    }

    #[test]
    fn menu_item_input_price_invariants() {
        let mut input = MenuItemInput {
            name: "Classic Cheese Burger".to_string(),
            description: None,
            image: None,
            category_id: Uuid::new_v4(),
            mrp: dec!(249),
            selling_price: dec!(199),
            show_discount: true,
            in_stock: true,
            is_best_seller: false,
            is_active: true,
        };
        assert!(validate_menu_item_input(&input).is_ok());

        input.selling_price = dec!(300);
        assert!(validate_menu_item_input(&input).is_err());

        input.selling_price = dec!(-1);
        assert!(validate_menu_item_input(&input).is_err());
    }
}
