use crate::{
    entities::{
        cart, order, order_item, CartItem, CartStatus, DeliveryType, OrderItemModel, OrderModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    notifications::whatsapp,
    services::{coupons::CouponService, pricing, settings::SettingsService},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order placement workflow: turns an active cart into a durable order log
/// entry plus a WhatsApp hand-off link.
///
/// The order row is the durability point. Order, item snapshot, coupon usage
/// increment, and cart conversion all commit in one transaction, so the
/// usage count can never move for an order that was not recorded. Message
/// construction happens after commit and is allowed to fail quietly.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    coupons: Arc<CouponService>,
    settings: Arc<SettingsService>,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        coupons: Arc<CouponService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            coupons,
            settings,
        }
    }

    /// Places an order from a cart.
    ///
    /// Customer fields are validated before any pricing runs; the address is
    /// required for delivery orders. The final breakdown re-evaluates the
    /// cart's coupon snapshot against the authoritative record, so a coupon
    /// the admin has since pulled contributes zero rather than blocking the
    /// order.
    #[instrument(skip(self, input), fields(cart_id = %cart_id))]
    pub async fn place_order(
        &self,
        cart_id: Uuid,
        input: PlaceOrderInput,
    ) -> Result<PlacedOrder, ServiceError> {
        validate_customer_fields(&input)?;

        let settings = self.settings.get().await?;

        let txn = self.db.begin().await?;

        let cart = cart::Entity::find_by_id(cart_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active".to_string(),
            ));
        }

        let cart_items = CartItem::find()
            .filter(crate::entities::cart_item::Column::CartId.eq(cart_id))
            .all(&txn)
            .await?;

        if cart_items.iter().all(|i| i.quantity <= 0) {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        // Same pricing functions the cart preview uses.
        let subtotal = pricing::subtotal(&cart_items);

        let resolved_coupon = match cart.coupon_id {
            Some(coupon_id) => {
                self.coupons
                    .resolve_for_checkout(&txn, coupon_id, subtotal, Utc::now())
                    .await?
            }
            None => None,
        };
        let discount = resolved_coupon
            .as_ref()
            .map(|c| c.discount)
            .unwrap_or_default();

        let delivery_fee = pricing::delivery_fee(&settings, input.delivery_type, subtotal);
        let breakdown = pricing::compose(subtotal, discount, delivery_fee);

        // Durability point: the order row and its item snapshot.
        let order_id = Uuid::new_v4();
        let order_number = format!("ORD-{}", &order_id.simple().to_string()[..8].to_uppercase());
        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            customer_name: Set(input.name.trim().to_string()),
            customer_phone: Set(input.phone.trim().to_string()),
            address: Set(input.address.trim().to_string()),
            delivery_type: Set(input.delivery_type),
            subtotal: Set(breakdown.subtotal),
            coupon_discount: Set(breakdown.discount),
            delivery_fee: Set(breakdown.delivery_fee),
            grand_total: Set(breakdown.grand_total),
            coupon_code: Set(resolved_coupon.as_ref().map(|c| c.coupon.code.clone())),
            placed_at: Set(Utc::now()),
        };
        let order = order.insert(&txn).await?;

        let mut item_snapshot = Vec::with_capacity(cart_items.len());
        for line in cart_items.iter().filter(|i| i.quantity > 0) {
            let snapshot = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                item_name: Set(line.item_name.clone()),
                unit_price: Set(line.unit_price),
                quantity: Set(line.quantity),
                line_total: Set(line.unit_price * rust_decimal::Decimal::from(line.quantity)),
                created_at: Set(Utc::now()),
            };
            item_snapshot.push(snapshot.insert(&txn).await?);
        }

        // Usage moves only for orders that are actually recorded; a failed
        // insert above aborts the transaction before this runs.
        if let Some(ref resolved) = resolved_coupon {
            self.coupons
                .increment_usage(&txn, resolved.coupon.id)
                .await?;
        }

        let mut cart_update: cart::ActiveModel = cart.into();
        cart_update.status = Set(CartStatus::Converted);
        cart_update.updated_at = Set(Utc::now());
        cart_update.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id,
                order_number: order_number.clone(),
            })
            .await;

        // Message hand-off is best effort from here on. The order is placed;
        // a customer without a link can resend manually.
        let message = whatsapp::build_order_message(&order, &item_snapshot);
        let whatsapp_link = match whatsapp::order_link(&settings.whatsapp_number, &message) {
            Ok(link) => Some(link.to_string()),
            Err(e) => {
                warn!("failed to build WhatsApp link for order {}: {}", order_number, e);
                None
            }
        };

        info!(
            "Placed order {} from cart {}: total {}",
            order_number, cart_id, order.grand_total
        );

        Ok(PlacedOrder {
            order,
            items: item_snapshot,
            message,
            whatsapp_link,
        })
    }
}

/// Customer-supplied fields for placing an order
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub delivery_type: DeliveryType,
}

/// A successfully placed order with its snapshot and hand-off link
#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrder {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
    pub message: String,
    /// Absent when link construction failed; the order is still recorded.
    pub whatsapp_link: Option<String>,
}

fn validate_customer_fields(input: &PlaceOrderInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Customer name is required".to_string(),
        ));
    }
    if input.phone.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Customer phone is required".to_string(),
        ));
    }
    if input.delivery_type == DeliveryType::Delivery && input.address.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Delivery address is required for delivery orders".to_string(),
        ));
    }
    Ok(())
}
