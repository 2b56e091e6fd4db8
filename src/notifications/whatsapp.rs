//! Order summary rendering for the WhatsApp hand-off.
//!
//! Pure formatting over the recorded order fields and item snapshot; no
//! business logic lives here. The caller opens the returned `wa.me` link,
//! which is the entire delivery contract.

use crate::entities::{DeliveryType, OrderItemModel, OrderModel};
use url::Url;

/// Renders the human-readable order summary: customer block, address for
/// delivery orders, numbered item lines, bill summary, grand total, footer.
pub fn build_order_message(order: &OrderModel, items: &[OrderItemModel]) -> String {
    let mut lines = vec![
        "🍔 *NEW ORDER* 🍔".to_string(),
        String::new(),
        "👤 *Customer Details*".to_string(),
        format!("Name: {}", order.customer_name),
        format!("Phone: {}", order.customer_phone),
        format!(
            "Type: {}",
            match order.delivery_type {
                DeliveryType::Delivery => "Delivery",
                DeliveryType::Takeaway => "Takeaway",
            }
        ),
        String::new(),
    ];

    if order.delivery_type == DeliveryType::Delivery {
        lines.push("📍 *Delivery Address*".to_string());
        lines.push(order.address.clone());
        lines.push(String::new());
    }

    lines.push("🛒 *Order Items*".to_string());
    for (index, item) in items.iter().enumerate() {
        lines.push(format!(
            "{}. {} x{} - ₹{}",
            index + 1,
            item.item_name,
            item.quantity,
            item.line_total
        ));
    }

    lines.push(String::new());
    lines.push("💰 *Bill Summary*".to_string());
    lines.push(format!("Subtotal: ₹{}", order.subtotal));

    if order.coupon_discount > rust_decimal::Decimal::ZERO {
        let code = order.coupon_code.as_deref().unwrap_or("-");
        lines.push(format!(
            "Coupon Discount ({}): -₹{}",
            code, order.coupon_discount
        ));
    }

    if order.delivery_fee > rust_decimal::Decimal::ZERO {
        lines.push(format!("Delivery Fee: ₹{}", order.delivery_fee));
    }

    lines.push(String::new());
    lines.push(format!("*Grand Total: ₹{}*", order.grand_total));
    lines.push(String::new());
    lines.push(format!("🧾 Order No: {}", order.order_number));
    lines.push(format!("📅 {}", order.placed_at.format("%d-%m-%Y %H:%M")));
    lines.push(String::new());
    lines.push("Thank you for your order! 🙏".to_string());

    lines.join("\n")
}

/// Builds the `https://wa.me/<number>?text=...` link carrying the message.
pub fn order_link(whatsapp_number: &str, message: &str) -> Result<Url, url::ParseError> {
    let digits: String = whatsapp_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", message)])
}
