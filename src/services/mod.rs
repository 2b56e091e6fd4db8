/// Service layer: one module per store concern, plus the pure pricing core.
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod orders;
pub mod pricing;
pub mod settings;
pub mod slides;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use coupons::CouponService;
pub use orders::OrderService;
pub use settings::SettingsService;
pub use slides::SlideService;
