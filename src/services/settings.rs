use crate::{
    entities::{store_settings, StoreSettings, StoreSettingsModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Singleton site settings: WhatsApp contact number and delivery-fee policy.
/// A fixed row id enforces the singleton; the row is created with defaults
/// on first read.
#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Returns the settings row, creating it with defaults when absent.
    pub async fn get(&self) -> Result<StoreSettingsModel, ServiceError> {
        if let Some(settings) = StoreSettings::find_by_id(store_settings::SINGLETON_ID)
            .one(&*self.db)
            .await?
        {
            return Ok(settings);
        }

        let defaults = store_settings::ActiveModel {
            id: Set(store_settings::SINGLETON_ID),
            whatsapp_number: Set(String::new()),
            delivery_fee_enabled: Set(false),
            delivery_fee_amount: Set(Decimal::ZERO),
            free_delivery_enabled: Set(false),
            free_delivery_above: Set(Decimal::ZERO),
            updated_at: Set(Utc::now()),
        };
        Ok(defaults.insert(&*self.db).await?)
    }

    /// Replaces the settings row. Only the admin settings flow calls this.
    #[instrument(skip(self))]
    pub async fn update(&self, input: SettingsInput) -> Result<StoreSettingsModel, ServiceError> {
        if input.delivery_fee_amount < Decimal::ZERO || input.free_delivery_above < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Delivery fee amounts must not be negative".to_string(),
            ));
        }

        let current = self.get().await?;
        let mut active: store_settings::ActiveModel = current.into();
        active.whatsapp_number = Set(input.whatsapp_number.trim().to_string());
        active.delivery_fee_enabled = Set(input.delivery_fee_enabled);
        active.delivery_fee_amount = Set(input.delivery_fee_amount);
        active.free_delivery_enabled = Set(input.free_delivery_enabled);
        active.free_delivery_above = Set(input.free_delivery_above);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender.send_or_log(Event::SettingsUpdated).await;
        info!("Updated store settings");
        Ok(updated)
    }
}

/// Input for updating site settings
#[derive(Debug, Deserialize)]
pub struct SettingsInput {
    pub whatsapp_number: String,
    pub delivery_fee_enabled: bool,
    pub delivery_fee_amount: Decimal,
    pub free_delivery_enabled: bool,
    pub free_delivery_above: Decimal,
}
