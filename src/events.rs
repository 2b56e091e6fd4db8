use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartCreated(Uuid),
    CartUpdated(Uuid),
    CartCleared(Uuid),
    CouponApplied { cart_id: Uuid, code: String },
    CouponRemoved { cart_id: Uuid },

    // Order events
    OrderPlaced {
        order_id: Uuid,
        order_number: String,
    },

    // Catalog/admin events
    MenuItemCreated(Uuid),
    MenuItemUpdated(Uuid),
    MenuItemDeleted(Uuid),
    CategoryChanged(Uuid),
    SlideChanged(Uuid),
    CouponChanged(Uuid),
    SettingsUpdated,
}

/// Cloneable handle for publishing events onto the process-wide channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, returning an error if the channel is closed or full.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs a warning instead of failing. Event delivery
    /// is never load-bearing for request correctness.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!("Dropping event {:?}: {}", event, e);
        }
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of
/// the process as a background task.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "event processed");
    }
    info!("event channel closed, processor exiting");
}
