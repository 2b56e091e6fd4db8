use crate::{
    entities::{cart, cart_item, Cart, CartItem, CartModel, CartStatus, MenuItem},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{coupons::CouponService, pricing},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Shopping cart management: lifecycle, line items, and the applied-coupon
/// snapshot.
///
/// The cart owns the live cart rows exclusively; it reads coupons through
/// `CouponService` but never writes them. Applying or removing a coupon is
/// free of side effects on the authoritative coupon record.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    coupons: Arc<CouponService>,
}

impl CartService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        coupons: Arc<CouponService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            coupons,
        }
    }

    /// Creates a new active cart with zero totals and no coupon.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<CartModel, ServiceError> {
        let cart_id = Uuid::new_v4();

        let cart = cart::ActiveModel {
            id: Set(cart_id),
            status: Set(CartStatus::Active),
            subtotal: Set(Decimal::ZERO),
            discount_total: Set(Decimal::ZERO),
            total: Set(Decimal::ZERO),
            coupon_id: Set(None),
            coupon_code: Set(None),
            coupon_type: Set(None),
            coupon_value: Set(None),
            coupon_max_cap: Set(None),
            coupon_min_order: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let cart = cart.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::CartCreated(cart_id))
            .await;

        info!("Created cart: {}", cart_id);
        Ok(cart)
    }

    /// Retrieves a cart with its items and derived item count.
    pub async fn get_cart(&self, cart_id: Uuid) -> Result<CartWithItems, ServiceError> {
        let cart = self.find_cart(&*self.db, cart_id).await?;
        let items = cart.find_related(CartItem).all(&*self.db).await?;
        Ok(CartWithItems::new(cart, items))
    }

    /// Adds a menu item to the cart, merging with an existing line for the
    /// same item instead of creating a duplicate row.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        input: AddItemInput,
    ) -> Result<CartWithItems, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let cart = self.find_active_cart(&txn, cart_id).await?;

        let item = MenuItem::find_by_id(input.menu_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item {} not found", input.menu_item_id))
            })?;

        if !item.is_active || !item.in_stock {
            return Err(ServiceError::InvalidOperation(format!(
                "'{}' is currently unavailable",
                item.name
            )));
        }

        let existing = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::MenuItemId.eq(input.menu_item_id))
            .one(&txn)
            .await?;

        if let Some(line) = existing {
            let quantity = line.quantity + input.quantity;
            let unit_price = line.unit_price;
            let mut line: cart_item::ActiveModel = line.into();
            line.quantity = Set(quantity);
            line.line_total = Set(unit_price * Decimal::from(quantity));
            line.updated_at = Set(Utc::now());
            line.update(&txn).await?;
        } else {
            let line = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart_id),
                menu_item_id: Set(input.menu_item_id),
                item_name: Set(item.name.clone()),
                unit_price: Set(item.selling_price),
                quantity: Set(input.quantity),
                line_total: Set(item.selling_price * Decimal::from(input.quantity)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            line.insert(&txn).await?;
        }

        let updated = self.recalculate_totals(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartUpdated(cart_id))
            .await;

        info!(
            "Added item to cart {}: {} x{}",
            cart_id, input.menu_item_id, input.quantity
        );
        Ok(updated)
    }

    /// Sets a line's quantity. Zero or negative removes the line.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;
        let cart = self.find_active_cart(&txn, cart_id).await?;

        let line = CartItem::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;

        if line.cart_id != cart_id {
            return Err(ServiceError::InvalidOperation(
                "Item does not belong to this cart".to_string(),
            ));
        }

        if quantity <= 0 {
            line.delete(&txn).await?;
        } else {
            let unit_price = line.unit_price;
            let mut line: cart_item::ActiveModel = line.into();
            line.quantity = Set(quantity);
            line.line_total = Set(unit_price * Decimal::from(quantity));
            line.updated_at = Set(Utc::now());
            line.update(&txn).await?;
        }

        let updated = self.recalculate_totals(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartUpdated(cart_id))
            .await;
        Ok(updated)
    }

    /// Removes a line entirely.
    pub async fn remove_item(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<CartWithItems, ServiceError> {
        self.update_item_quantity(cart_id, item_id, 0).await
    }

    /// Deletes all lines, clears the coupon, and resets totals to zero.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, cart_id: Uuid) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;
        let cart = self.find_cart(&txn, cart_id).await?;

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&txn)
            .await?;

        let mut active: cart::ActiveModel = cart.into();
        active.subtotal = Set(Decimal::ZERO);
        active.discount_total = Set(Decimal::ZERO);
        active.total = Set(Decimal::ZERO);
        active = clear_coupon_fields(active);
        active.updated_at = Set(Utc::now());
        let cart = active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartCleared(cart_id))
            .await;

        info!("Cleared cart: {}", cart_id);
        Ok(CartWithItems::new(cart, Vec::new()))
    }

    /// Evaluates a coupon code against the cart's current subtotal and, on
    /// success, stores the coupon snapshot on the cart.
    ///
    /// A rejected code leaves the cart's coupon state untouched, and the
    /// authoritative coupon record is never mutated here.
    #[instrument(skip(self))]
    pub async fn apply_coupon(
        &self,
        cart_id: Uuid,
        code: &str,
    ) -> Result<CartWithItems, ServiceError> {
        let cart = self.find_active_cart(&*self.db, cart_id).await?;
        let items = cart.find_related(CartItem).all(&*self.db).await?;
        let subtotal = pricing::subtotal(&items);

        let evaluated = self.coupons.evaluate(code, subtotal, Utc::now()).await?;

        let txn = self.db.begin().await?;
        let mut active: cart::ActiveModel = cart.into();
        active.coupon_id = Set(Some(evaluated.coupon.id));
        active.coupon_code = Set(Some(evaluated.coupon.code.clone()));
        active.coupon_type = Set(Some(evaluated.coupon.coupon_type));
        active.coupon_value = Set(Some(evaluated.coupon.value));
        active.coupon_max_cap = Set(evaluated.coupon.max_cap);
        active.coupon_min_order = Set(Some(evaluated.coupon.min_order));
        let cart = active.update(&txn).await?;
        let updated = self.recalculate_totals(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CouponApplied {
                cart_id,
                code: evaluated.coupon.code,
            })
            .await;

        Ok(updated)
    }

    /// Clears the applied coupon. Restores the discount to exactly zero and
    /// never touches the coupon's usage count.
    #[instrument(skip(self))]
    pub async fn remove_coupon(&self, cart_id: Uuid) -> Result<CartWithItems, ServiceError> {
        let cart = self.find_cart(&*self.db, cart_id).await?;

        let txn = self.db.begin().await?;
        let active = clear_coupon_fields(cart.into());
        let cart = active.update(&txn).await?;
        let updated = self.recalculate_totals(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CouponRemoved { cart_id })
            .await;

        Ok(updated)
    }

    /// Discount the cart's coupon snapshot yields for a given subtotal.
    /// Zero when no coupon is applied or the snapshot's minimum order is no
    /// longer met.
    pub fn snapshot_discount(cart: &CartModel, subtotal: Decimal) -> Decimal {
        let (Some(coupon_type), Some(value)) = (cart.coupon_type, cart.coupon_value) else {
            return Decimal::ZERO;
        };
        if let Some(min_order) = cart.coupon_min_order {
            if subtotal < min_order {
                return Decimal::ZERO;
            }
        }
        pricing::coupon_discount(coupon_type, value, cart.coupon_max_cap, subtotal)
    }

    async fn find_cart(
        &self,
        conn: &impl ConnectionTrait,
        cart_id: Uuid,
    ) -> Result<CartModel, ServiceError> {
        Cart::find_by_id(cart_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))
    }

    async fn find_active_cart(
        &self,
        conn: &impl ConnectionTrait,
        cart_id: Uuid,
    ) -> Result<CartModel, ServiceError> {
        let cart = self.find_cart(conn, cart_id).await?;
        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active".to_string(),
            ));
        }
        Ok(cart)
    }

    /// Recomputes subtotal, discount, and total from the cart lines and the
    /// coupon snapshot. Preview and checkout both derive their numbers from
    /// the same pricing functions.
    async fn recalculate_totals(
        &self,
        conn: &impl ConnectionTrait,
        cart: CartModel,
    ) -> Result<CartWithItems, ServiceError> {
        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(conn)
            .await?;

        let subtotal = pricing::subtotal(&items);
        let discount = Self::snapshot_discount(&cart, subtotal);
        let total = (subtotal - discount).max(Decimal::ZERO);

        let mut active: cart::ActiveModel = cart.into();
        active.subtotal = Set(subtotal);
        active.discount_total = Set(discount);
        active.total = Set(total);
        active.updated_at = Set(Utc::now());
        let cart = active.update(conn).await?;

        Ok(CartWithItems::new(cart, items))
    }
}

fn clear_coupon_fields(mut active: cart::ActiveModel) -> cart::ActiveModel {
    active.coupon_id = Set(None);
    active.coupon_code = Set(None);
    active.coupon_type = Set(None);
    active.coupon_value = Set(None);
    active.coupon_max_cap = Set(None);
    active.coupon_min_order = Set(None);
    active
}

/// Input for adding an item to the cart
#[derive(Debug, Deserialize)]
pub struct AddItemInput {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Cart with its lines and derived item count
#[derive(Debug, Serialize, ToSchema)]
pub struct CartWithItems {
    pub cart: CartModel,
    pub items: Vec<cart_item::Model>,
    pub item_count: i32,
}

impl CartWithItems {
    pub fn new(cart: CartModel, items: Vec<cart_item::Model>) -> Self {
        let item_count = items.iter().map(|i| i.quantity.max(0)).sum();
        Self {
            cart,
            items,
            item_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CouponType;
    use rust_decimal_macros::dec;

    fn cart_with_coupon(
        coupon_type: Option<CouponType>,
        value: Option<Decimal>,
        max_cap: Option<Decimal>,
        min_order: Option<Decimal>,
    ) -> CartModel {
        CartModel {
            id: Uuid::new_v4(),
            status: CartStatus::Active,
            subtotal: Decimal::ZERO,
            discount_total: Decimal::ZERO,
            total: Decimal::ZERO,
            coupon_id: coupon_type.map(|_| Uuid::new_v4()),
            coupon_code: coupon_type.map(|_| "BURGO20".to_string()),
            coupon_type,
            coupon_value: value,
            coupon_max_cap: max_cap,
            coupon_min_order: min_order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn snapshot_discount_without_coupon_is_zero() {
        let cart = cart_with_coupon(None, None, None, None);
        assert_eq!(CartService::snapshot_discount(&cart, dec!(398)), Decimal::ZERO);
    }

    #[test]
    fn snapshot_discount_percentage_with_cap() {
        let cart = cart_with_coupon(
            Some(CouponType::Percentage),
            Some(dec!(20)),
            Some(dec!(100)),
            Some(dec!(199)),
        );
        assert_eq!(CartService::snapshot_discount(&cart, dec!(398)), dec!(79.6));
    }

    #[test]
    fn snapshot_discount_zero_below_min_order() {
        // The snapshot keeps the coupon attached but the discount drops to
        // zero once the subtotal falls under the coupon's minimum.
        let cart = cart_with_coupon(
            Some(CouponType::Percentage),
            Some(dec!(20)),
            Some(dec!(100)),
            Some(dec!(199)),
        );
        assert_eq!(CartService::snapshot_discount(&cart, dec!(150)), Decimal::ZERO);
    }

    #[test]
    fn snapshot_discount_fixed_clamps_to_subtotal() {
        let cart = cart_with_coupon(Some(CouponType::Fixed), Some(dec!(500)), None, None);
        assert_eq!(CartService::snapshot_discount(&cart, dec!(150)), dec!(150));
    }

    #[test]
    fn item_count_sums_quantities() {
        let cart = cart_with_coupon(None, None, None, None);
        let items = vec![
            cart_item::Model {
                id: Uuid::new_v4(),
                cart_id: cart.id,
                menu_item_id: Uuid::new_v4(),
                item_name: "Classic Fries".to_string(),
                unit_price: dec!(99),
                quantity: 2,
                line_total: dec!(198),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            cart_item::Model {
                id: Uuid::new_v4(),
                cart_id: cart.id,
                menu_item_id: Uuid::new_v4(),
                item_name: "Cold Cola".to_string(),
                unit_price: dec!(59),
                quantity: 3,
                line_total: dec!(177),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        ];
        let with_items = CartWithItems::new(cart, items);
        assert_eq!(with_items.item_count, 5);
    }
}
