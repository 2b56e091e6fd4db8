use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row id of the singleton settings record.
pub const SINGLETON_ID: i32 = 1;

/// Site settings entity. A single row (`SINGLETON_ID`) holds the WhatsApp
/// contact number and the delivery-fee policy.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "store_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub whatsapp_number: String,
    pub delivery_fee_enabled: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub delivery_fee_amount: Decimal,
    pub free_delivery_enabled: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub free_delivery_above: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
