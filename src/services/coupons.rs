use crate::{
    entities::{coupon, Coupon, CouponModel, CouponType},
    errors::{CouponError, ServiceError},
    events::{Event, EventSender},
    services::pricing,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Result of a successful coupon evaluation: the matched record plus the
/// discount it yields for the presented subtotal.
#[derive(Debug, Clone)]
pub struct EvaluatedCoupon {
    pub coupon: CouponModel,
    pub discount: Decimal,
}

/// Coupon evaluation and admin CRUD.
///
/// Evaluation never mutates the authoritative record; `increment_usage` is
/// called separately by the checkout workflow once an order is recorded.
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Decides whether `code` is applicable for `subtotal` at `now` and
    /// computes the discount.
    ///
    /// The failure taxonomy is user-correctable: `InvalidCoupon` (no active
    /// match), `ExpiredCoupon`, `MinOrderNotMet`, `UsageLimitExceeded`.
    #[instrument(skip(self))]
    pub async fn evaluate(
        &self,
        code: &str,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<EvaluatedCoupon, ServiceError> {
        let normalized = code.trim().to_uppercase();

        let coupon = Coupon::find()
            .filter(coupon::Column::Code.eq(normalized.clone()))
            .filter(coupon::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or(CouponError::InvalidCoupon)?;

        if now < coupon.valid_from || now > coupon.valid_till {
            return Err(CouponError::ExpiredCoupon.into());
        }

        if subtotal < coupon.min_order {
            return Err(CouponError::MinOrderNotMet(coupon.min_order).into());
        }

        if let Some(limit) = coupon.usage_limit {
            if coupon.usage_count >= limit {
                warn!("coupon {} has reached its usage limit", normalized);
                return Err(CouponError::UsageLimitExceeded.into());
            }
        }

        let discount =
            pricing::coupon_discount(coupon.coupon_type, coupon.value, coupon.max_cap, subtotal);

        Ok(EvaluatedCoupon { coupon, discount })
    }

    /// Re-resolves a cart's coupon snapshot against the authoritative record
    /// at checkout time.
    ///
    /// Returns `None` when the record is gone, inactive, out of its validity
    /// window, below its minimum order, or exhausted. Checkout then proceeds
    /// without a discount instead of failing; an admin edit mid-session must
    /// not block the customer's order.
    pub async fn resolve_for_checkout(
        &self,
        conn: &impl ConnectionTrait,
        coupon_id: Uuid,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Option<EvaluatedCoupon>, ServiceError> {
        let Some(coupon) = Coupon::find_by_id(coupon_id).one(conn).await? else {
            return Ok(None);
        };

        if !coupon.is_active
            || now < coupon.valid_from
            || now > coupon.valid_till
            || subtotal < coupon.min_order
        {
            return Ok(None);
        }
        if let Some(limit) = coupon.usage_limit {
            if coupon.usage_count >= limit {
                return Ok(None);
            }
        }

        let discount =
            pricing::coupon_discount(coupon.coupon_type, coupon.value, coupon.max_cap, subtotal);
        Ok(Some(EvaluatedCoupon { coupon, discount }))
    }

    /// Increments a coupon's usage count by exactly one, by id lookup
    /// against the authoritative record.
    ///
    /// Runs on the caller's connection so checkout can include it in the
    /// order-placement transaction.
    pub async fn increment_usage(
        &self,
        conn: &impl ConnectionTrait,
        coupon_id: Uuid,
    ) -> Result<(), ServiceError> {
        let coupon = Coupon::find_by_id(coupon_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", coupon_id)))?;

        let usage_count = coupon.usage_count;
        let mut active: coupon::ActiveModel = coupon.into();
        active.usage_count = Set(usage_count + 1);
        active.updated_at = Set(Utc::now());
        active.update(conn).await?;

        Ok(())
    }

    /// Creates a coupon. Percentage values outside [0, 100] are rejected
    /// here so the evaluator never sees an overshooting rate.
    #[instrument(skip(self))]
    pub async fn create_coupon(&self, input: CouponInput) -> Result<CouponModel, ServiceError> {
        let code = validate_coupon_input(&input)?;

        let existing = Coupon::find()
            .filter(coupon::Column::Code.eq(code.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Coupon code '{}' already exists",
                code
            )));
        }

        let id = Uuid::new_v4();
        let coupon = coupon::ActiveModel {
            id: Set(id),
            code: Set(code),
            coupon_type: Set(input.coupon_type),
            value: Set(input.value),
            min_order: Set(input.min_order),
            max_cap: Set(input.max_cap),
            valid_from: Set(input.valid_from),
            valid_till: Set(input.valid_till),
            usage_limit: Set(input.usage_limit),
            usage_count: Set(0),
            is_active: Set(input.is_active),
            applicable_to: Set(input.applicable_to.unwrap_or_else(|| "all".to_string())),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let coupon = coupon.insert(&*self.db).await?;
        self.event_sender.send_or_log(Event::CouponChanged(id)).await;
        info!("Created coupon {} ({})", coupon.code, id);
        Ok(coupon)
    }

    /// Updates a coupon in place. The usage count is preserved.
    #[instrument(skip(self))]
    pub async fn update_coupon(
        &self,
        id: Uuid,
        input: CouponInput,
    ) -> Result<CouponModel, ServiceError> {
        let code = validate_coupon_input(&input)?;

        let existing = Coupon::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", id)))?;

        let clash = Coupon::find()
            .filter(coupon::Column::Code.eq(code.clone()))
            .filter(coupon::Column::Id.ne(id))
            .one(&*self.db)
            .await?;
        if clash.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Coupon code '{}' already exists",
                code
            )));
        }

        let mut active: coupon::ActiveModel = existing.into();
        active.code = Set(code);
        active.coupon_type = Set(input.coupon_type);
        active.value = Set(input.value);
        active.min_order = Set(input.min_order);
        active.max_cap = Set(input.max_cap);
        active.valid_from = Set(input.valid_from);
        active.valid_till = Set(input.valid_till);
        active.usage_limit = Set(input.usage_limit);
        active.is_active = Set(input.is_active);
        if let Some(scope) = input.applicable_to {
            active.applicable_to = Set(scope);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender.send_or_log(Event::CouponChanged(id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_coupon(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Coupon::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Coupon {} not found", id)));
        }
        self.event_sender.send_or_log(Event::CouponChanged(id)).await;
        Ok(())
    }

    pub async fn get_coupon(&self, id: Uuid) -> Result<CouponModel, ServiceError> {
        Coupon::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", id)))
    }

    pub async fn list_coupons(&self) -> Result<Vec<CouponModel>, ServiceError> {
        Ok(Coupon::find()
            .order_by_asc(coupon::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}

/// Input for creating or updating a coupon
#[derive(Debug, Deserialize)]
pub struct CouponInput {
    pub code: String,
    pub coupon_type: CouponType,
    pub value: Decimal,
    pub min_order: Decimal,
    pub max_cap: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
    pub applicable_to: Option<String>,
}

fn validate_coupon_input(input: &CouponInput) -> Result<String, ServiceError> {
    let code = input.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ServiceError::ValidationError(
            "Coupon code must not be empty".to_string(),
        ));
    }

    match input.coupon_type {
        CouponType::Percentage => {
            if input.value < Decimal::ZERO || input.value > Decimal::from(100) {
                return Err(ServiceError::ValidationError(
                    "Percentage value must be between 0 and 100".to_string(),
                ));
            }
        }
        CouponType::Fixed => {
            if input.value < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Fixed discount must not be negative".to_string(),
                ));
            }
        }
    }

    if input.min_order < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Minimum order must not be negative".to_string(),
        ));
    }

    if let Some(cap) = input.max_cap {
        if cap < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Maximum discount cap must not be negative".to_string(),
            ));
        }
    }

    if input.valid_till <= input.valid_from {
        return Err(ServiceError::ValidationError(
            "Coupon validity window must end after it starts".to_string(),
        ));
    }

    if let Some(limit) = input.usage_limit {
        if limit <= 0 {
            return Err(ServiceError::ValidationError(
                "Usage limit must be positive when set".to_string(),
            ));
        }
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn input(coupon_type: CouponType, value: Decimal) -> CouponInput {
        CouponInput {
            code: "save20".to_string(),
            coupon_type,
            value,
            min_order: dec!(199),
            max_cap: Some(dec!(100)),
            valid_from: Utc::now(),
            valid_till: Utc::now() + Duration::days(30),
            usage_limit: None,
            is_active: true,
            applicable_to: None,
        }
    }

    #[test]
    fn input_validation_uppercases_code() {
        let code = validate_coupon_input(&input(CouponType::Percentage, dec!(20))).unwrap();
        assert_eq!(code, "SAVE20");
    }

    #[test]
    fn input_validation_rejects_percentage_over_100() {
        let err = validate_coupon_input(&input(CouponType::Percentage, dec!(150)));
        assert!(err.is_err());
    }

    #[test]
    fn input_validation_rejects_negative_values() {
        assert!(validate_coupon_input(&input(CouponType::Percentage, dec!(-5))).is_err());
        assert!(validate_coupon_input(&input(CouponType::Fixed, dec!(-5))).is_err());
    }

    #[test]
    fn input_validation_accepts_boundary_percentages() {
        assert!(validate_coupon_input(&input(CouponType::Percentage, dec!(0))).is_ok());
        assert!(validate_coupon_input(&input(CouponType::Percentage, dec!(100))).is_ok());
    }

    #[test]
    fn input_validation_rejects_inverted_window() {
        let mut bad = input(CouponType::Fixed, dec!(50));
        bad.valid_till = bad.valid_from - Duration::days(1);
        assert!(validate_coupon_input(&bad).is_err());
    }

    #[test]
    fn input_validation_rejects_blank_code() {
        let mut bad = input(CouponType::Fixed, dec!(50));
        bad.code = "   ".to_string();
        assert!(validate_coupon_input(&bad).is_err());
    }
}
