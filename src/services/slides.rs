use crate::{
    entities::{slide, MenuItem, Slide, SlideModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Promotional slider management. Slides may point at a menu item but carry
/// no pricing logic of their own.
#[derive(Clone)]
pub struct SlideService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl SlideService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_slide(&self, input: SlideInput) -> Result<SlideModel, ServiceError> {
        self.validate_linked_item(input.linked_item_id).await?;

        let id = Uuid::new_v4();
        let slide = slide::ActiveModel {
            id: Set(id),
            image: Set(input.image),
            title: Set(input.title.trim().to_string()),
            offer_text: Set(input.offer_text),
            linked_item_id: Set(input.linked_item_id),
            sort_order: Set(input.sort_order),
            is_active: Set(input.is_active),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let slide = slide.insert(&*self.db).await?;
        self.event_sender.send_or_log(Event::SlideChanged(id)).await;
        Ok(slide)
    }

    #[instrument(skip(self, input))]
    pub async fn update_slide(
        &self,
        id: Uuid,
        input: SlideInput,
    ) -> Result<SlideModel, ServiceError> {
        self.validate_linked_item(input.linked_item_id).await?;

        let existing = Slide::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Slide {} not found", id)))?;

        let mut active: slide::ActiveModel = existing.into();
        active.image = Set(input.image);
        active.title = Set(input.title.trim().to_string());
        active.offer_text = Set(input.offer_text);
        active.linked_item_id = Set(input.linked_item_id);
        active.sort_order = Set(input.sort_order);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender.send_or_log(Event::SlideChanged(id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_slide(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Slide::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Slide {} not found", id)));
        }
        self.event_sender.send_or_log(Event::SlideChanged(id)).await;
        Ok(())
    }

    /// Storefront listing: active slides in display order.
    pub async fn list_active_slides(&self) -> Result<Vec<SlideModel>, ServiceError> {
        Ok(Slide::find()
            .filter(slide::Column::IsActive.eq(true))
            .order_by_asc(slide::Column::SortOrder)
            .all(&*self.db)
            .await?)
    }

    pub async fn list_all_slides(&self) -> Result<Vec<SlideModel>, ServiceError> {
        Ok(Slide::find()
            .order_by_asc(slide::Column::SortOrder)
            .all(&*self.db)
            .await?)
    }

    /// Persists a full new slide ordering in one transaction.
    #[instrument(skip(self))]
    pub async fn reorder_slides(&self, ordered_ids: Vec<Uuid>) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let slide = Slide::find_by_id(*id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Slide {} not found", id)))?;
            let mut active: slide::ActiveModel = slide.into();
            active.sort_order = Set(position as i32);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn validate_linked_item(&self, linked_item_id: Option<Uuid>) -> Result<(), ServiceError> {
        if let Some(item_id) = linked_item_id {
            MenuItem::find_by_id(item_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!("Menu item {} does not exist", item_id))
                })?;
        }
        Ok(())
    }
}

/// Input for creating or updating a slide
#[derive(Debug, Deserialize)]
pub struct SlideInput {
    pub image: String,
    pub title: String,
    pub offer_text: Option<String>,
    pub linked_item_id: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
    pub is_active: bool,
}
