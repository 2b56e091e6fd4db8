pub mod auth;
pub mod carts;
pub mod checkout;
pub mod common;
pub mod coupons;
pub mod health;
pub mod menu;
pub mod orders;
pub mod settings;
pub mod slides;

use crate::events::EventSender;
use crate::services::{
    CartService, CatalogService, CheckoutService, CouponService, OrderService, SettingsService,
    SlideService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// All service instances, shared across request handlers.
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<CartService>,
    pub catalog: Arc<CatalogService>,
    pub checkout: Arc<CheckoutService>,
    pub coupons: Arc<CouponService>,
    pub orders: Arc<OrderService>,
    pub settings: Arc<SettingsService>,
    pub slides: Arc<SlideService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        let coupons = Arc::new(CouponService::new(db.clone(), event_sender.clone()));
        let settings = Arc::new(SettingsService::new(db.clone(), event_sender.clone()));

        Self {
            cart: Arc::new(CartService::new(
                db.clone(),
                event_sender.clone(),
                coupons.clone(),
            )),
            catalog: Arc::new(CatalogService::new(db.clone(), event_sender.clone())),
            checkout: Arc::new(CheckoutService::new(
                db.clone(),
                event_sender.clone(),
                coupons.clone(),
                settings.clone(),
            )),
            coupons,
            orders: Arc::new(OrderService::new(db.clone())),
            settings,
            slides: Arc::new(SlideService::new(db, event_sender)),
        }
    }
}
