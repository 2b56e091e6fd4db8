//! Pure bill arithmetic: subtotal, coupon discount, delivery fee, grand
//! total. Cart preview and order placement both go through these functions,
//! so the two always agree for identical inputs.

use crate::entities::{cart_item, CouponType, DeliveryType, StoreSettingsModel};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Full bill breakdown for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub grand_total: Decimal,
}

/// Sum of `unit_price × quantity` over the cart lines. Lines with a
/// non-positive quantity contribute nothing; upstream code keeps quantities
/// at 1 or more, but the composer does not assume its input is well-formed.
pub fn subtotal<'a>(items: impl IntoIterator<Item = &'a cart_item::Model>) -> Decimal {
    items
        .into_iter()
        .filter(|item| item.quantity > 0)
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum()
}

/// Discount amount for a coupon against a subtotal. The result is always in
/// `[0, subtotal]`: percentage discounts are capped by `max_cap` when set,
/// fixed discounts never exceed the subtotal.
pub fn coupon_discount(
    coupon_type: CouponType,
    value: Decimal,
    max_cap: Option<Decimal>,
    subtotal: Decimal,
) -> Decimal {
    let raw = match coupon_type {
        CouponType::Percentage => {
            let pct = subtotal * value / Decimal::from(100);
            match max_cap {
                Some(cap) => pct.min(cap),
                None => pct,
            }
        }
        CouponType::Fixed => value,
    };

    raw.min(subtotal).max(Decimal::ZERO)
}

/// Delivery fee under the configured policy. Zero unless the policy is
/// enabled and the order is for delivery; zero again when free delivery is
/// enabled and the subtotal clears the threshold.
pub fn delivery_fee(
    settings: &StoreSettingsModel,
    delivery_type: DeliveryType,
    subtotal: Decimal,
) -> Decimal {
    if !settings.delivery_fee_enabled || delivery_type != DeliveryType::Delivery {
        return Decimal::ZERO;
    }
    if settings.free_delivery_enabled && subtotal >= settings.free_delivery_above {
        return Decimal::ZERO;
    }
    settings.delivery_fee_amount
}

/// Assembles the final breakdown. `grand_total` is floored at zero; the
/// discount inputs are already clamped, so the floor only matters for
/// malformed legacy data.
pub fn compose(subtotal: Decimal, discount: Decimal, delivery_fee: Decimal) -> PriceBreakdown {
    let grand_total = (subtotal - discount + delivery_fee).max(Decimal::ZERO);
    PriceBreakdown {
        subtotal,
        discount,
        delivery_fee,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn line(unit_price: Decimal, quantity: i32) -> cart_item::Model {
        cart_item::Model {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            menu_item_id: Uuid::new_v4(),
            item_name: "Classic Cheese Burger".to_string(),
            unit_price,
            quantity,
            line_total: unit_price * Decimal::from(quantity.max(0)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn settings(
        enabled: bool,
        amount: Decimal,
        free_enabled: bool,
        free_above: Decimal,
    ) -> StoreSettingsModel {
        StoreSettingsModel {
            id: 1,
            whatsapp_number: "919876543210".to_string(),
            delivery_fee_enabled: enabled,
            delivery_fee_amount: amount,
            free_delivery_enabled: free_enabled,
            free_delivery_above: free_above,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let items = vec![line(dec!(199), 2), line(dec!(99), 1)];
        assert_eq!(subtotal(&items), dec!(497));
    }

    #[test]
    fn subtotal_skips_non_positive_quantities() {
        let items = vec![line(dec!(199), 2), line(dec!(99), 0), line(dec!(59), -3)];
        assert_eq!(subtotal(&items), dec!(398));
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() {
        let items: Vec<cart_item::Model> = Vec::new();
        assert_eq!(subtotal(&items), Decimal::ZERO);
    }

    #[test]
    fn percentage_discount_uncapped() {
        let d = coupon_discount(CouponType::Percentage, dec!(20), None, dec!(398));
        assert_eq!(d, dec!(79.6));
    }

    #[test]
    fn percentage_discount_respects_max_cap() {
        let d = coupon_discount(CouponType::Percentage, dec!(20), Some(dec!(50)), dec!(398));
        assert_eq!(d, dec!(50));
    }

    #[test]
    fn percentage_discount_under_cap_is_untouched() {
        // 20% of 398 = 79.6, below the 100 cap.
        let d = coupon_discount(CouponType::Percentage, dec!(20), Some(dec!(100)), dec!(398));
        assert_eq!(d, dec!(79.6));
    }

    #[test]
    fn fixed_discount_clamps_to_subtotal() {
        let d = coupon_discount(CouponType::Fixed, dec!(500), None, dec!(150));
        assert_eq!(d, dec!(150));
    }

    #[test]
    fn fixed_discount_below_subtotal_is_untouched() {
        let d = coupon_discount(CouponType::Fixed, dec!(50), None, dec!(150));
        assert_eq!(d, dec!(50));
    }

    #[test]
    fn overshooting_percentage_still_never_exceeds_subtotal() {
        // Values over 100 are rejected at coupon creation, but a legacy row
        // must still not drive the total negative.
        let d = coupon_discount(CouponType::Percentage, dec!(150), None, dec!(200));
        assert_eq!(d, dec!(200));
    }

    #[test]
    fn delivery_fee_disabled_policy_is_zero() {
        let s = settings(false, dec!(40), false, dec!(300));
        assert_eq!(
            delivery_fee(&s, DeliveryType::Delivery, dec!(100)),
            Decimal::ZERO
        );
    }

    #[test]
    fn delivery_fee_takeaway_is_zero() {
        let s = settings(true, dec!(40), false, dec!(300));
        assert_eq!(
            delivery_fee(&s, DeliveryType::Takeaway, dec!(100)),
            Decimal::ZERO
        );
    }

    #[test]
    fn delivery_fee_waived_at_free_threshold() {
        let s = settings(true, dec!(40), true, dec!(300));
        assert_eq!(
            delivery_fee(&s, DeliveryType::Delivery, dec!(398)),
            Decimal::ZERO
        );
    }

    #[test]
    fn delivery_fee_charged_below_free_threshold() {
        let s = settings(true, dec!(40), true, dec!(300));
        assert_eq!(delivery_fee(&s, DeliveryType::Delivery, dec!(150)), dec!(40));
    }

    #[test]
    fn compose_basic_breakdown() {
        let b = compose(dec!(398), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(b.grand_total, dec!(398));
    }

    #[test]
    fn compose_with_discount_and_fee() {
        let b = compose(dec!(398), dec!(79.6), dec!(40));
        assert_eq!(b.grand_total, dec!(358.4));
    }

    #[test]
    fn compose_floors_grand_total_at_zero() {
        let b = compose(dec!(100), dec!(150), Decimal::ZERO);
        assert_eq!(b.grand_total, Decimal::ZERO);
    }
}
