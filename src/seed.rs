//! One-time sample data bootstrap. Each collection is guarded by its own
//! emptiness check, so running this repeatedly (or against a half-seeded
//! database) only fills the gaps.

use crate::{
    errors::ServiceError,
    handlers::AppServices,
    services::{
        catalog::{CategoryInput, MenuItemInput},
        coupons::CouponInput,
        settings::SettingsInput,
        slides::SlideInput,
    },
};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tracing::{info, instrument};

#[instrument(skip(services))]
pub async fn run(services: &AppServices) -> Result<(), ServiceError> {
    // Settings row is created with defaults on first read; make sure it
    // exists before anything needs it.
    let settings = services.settings.get().await?;
    if settings.whatsapp_number.is_empty() {
        services
            .settings
            .update(SettingsInput {
                whatsapp_number: "919876543210".to_string(),
                delivery_fee_enabled: true,
                delivery_fee_amount: dec!(40),
                free_delivery_enabled: true,
                free_delivery_above: dec!(300),
            })
            .await?;
    }

    let mut categories = services.catalog.list_categories().await?;
    if categories.is_empty() {
        for (position, name) in ["Burgers", "Fries", "Pizza", "Drinks", "Combos"]
            .iter()
            .enumerate()
        {
            services
                .catalog
                .create_category(CategoryInput {
                    name: (*name).to_string(),
                    sort_order: position as i32,
                })
                .await?;
        }
        categories = services.catalog.list_categories().await?;
        info!("Seeded {} categories", categories.len());
    }

    let mut menu_items = services.catalog.list_all_menu_items().await?;
    if menu_items.is_empty() && !categories.is_empty() {
        let category_for = |index: usize| categories[index.min(categories.len() - 1)].id;
        let samples = vec![
            (
                "Classic Cheese Burger",
                "Juicy patty with melted cheddar, fresh lettuce, tomato & special sauce",
                "/assets/food/burger-classic.jpg",
                category_for(0),
                dec!(249),
                dec!(199),
                true,
            ),
            (
                "Crispy Chicken Burger",
                "Golden fried chicken with spicy mayo, pickles & coleslaw",
                "/assets/food/burger-chicken.jpg",
                category_for(0),
                dec!(279),
                dec!(229),
                true,
            ),
            (
                "Classic Fries",
                "Crispy golden fries sprinkled with sea salt",
                "/assets/food/fries-classic.jpg",
                category_for(1),
                dec!(129),
                dec!(99),
                false,
            ),
            (
                "Pepperoni Pizza",
                "Classic pizza with pepperoni, mozzarella & tomato sauce",
                "/assets/food/pizza-pepperoni.jpg",
                category_for(2),
                dec!(399),
                dec!(349),
                true,
            ),
            (
                "Cold Cola",
                "Refreshing chilled cola with ice",
                "/assets/food/drink-cola.jpg",
                category_for(3),
                dec!(79),
                dec!(59),
                false,
            ),
            (
                "Burger Combo Meal",
                "Double cheeseburger + fries + drink",
                "/assets/food/combo-meal.jpg",
                category_for(4),
                dec!(499),
                dec!(399),
                true,
            ),
        ];

        for (name, description, image, category_id, mrp, selling_price, best_seller) in samples {
            services
                .catalog
                .create_menu_item(MenuItemInput {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    image: Some(image.to_string()),
                    category_id,
                    mrp,
                    selling_price,
                    show_discount: true,
                    in_stock: true,
                    is_best_seller: best_seller,
                    is_active: true,
                })
                .await?;
        }
        menu_items = services.catalog.list_all_menu_items().await?;
        info!("Seeded {} menu items", menu_items.len());
    }

    if services.slides.list_all_slides().await?.is_empty() && !menu_items.is_empty() {
        let slides = [
            ("/assets/food/slider-1.jpg", "Double Cheese Perfection", "FLAT 20% OFF"),
            ("/assets/food/slider-2.jpg", "Crispy Fried Chicken", "BUY 1 GET 1"),
            ("/assets/food/slider-3.jpg", "The Ultimate Burger", "COMBO DEAL"),
        ];
        for (position, (image, title, offer)) in slides.iter().enumerate() {
            services
                .slides
                .create_slide(SlideInput {
                    image: (*image).to_string(),
                    title: (*title).to_string(),
                    offer_text: Some((*offer).to_string()),
                    linked_item_id: menu_items.get(position).map(|item| item.id),
                    sort_order: position as i32,
                    is_active: true,
                })
                .await?;
        }
        info!("Seeded promotional slides");
    }

    if services.coupons.list_coupons().await?.is_empty() {
        services
            .coupons
            .create_coupon(CouponInput {
                code: "BURGO20".to_string(),
                coupon_type: crate::entities::CouponType::Percentage,
                value: dec!(20),
                min_order: dec!(199),
                max_cap: Some(dec!(100)),
                valid_from: Utc::now(),
                valid_till: Utc::now() + Duration::days(30),
                usage_limit: None,
                is_active: true,
                applicable_to: Some("all".to_string()),
            })
            .await?;
        info!("Seeded welcome coupon");
    }

    Ok(())
}
