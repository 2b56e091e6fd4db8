/// Database entities for the storefront.
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod coupon;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod slide;
pub mod store_settings;

pub use cart::{CartStatus, Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use coupon::{CouponType, Entity as Coupon, Model as CouponModel};
pub use menu_item::{Entity as MenuItem, Model as MenuItemModel};
pub use order::{DeliveryType, Entity as Order, Model as OrderModel};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use slide::{Entity as Slide, Model as SlideModel};
pub use store_settings::{Entity as StoreSettings, Model as StoreSettingsModel};
