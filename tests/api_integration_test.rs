//! HTTP surface tests: auth gating, public storefront routes, and the
//! admin CRUD flows, exercised through the full router.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::spawn_app;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Money values serialize as JSON strings; compare them as decimals so the
/// printed scale does not matter.
fn money(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("expected a decimal string")
        .parse()
        .expect("expected a parseable decimal")
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = spawn_app().await;
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;
    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({"username": "admin", "password": "wrong"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn login_issues_a_usable_token() {
    let app = spawn_app().await;
    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({"username": common::ADMIN_USERNAME, "password": common::ADMIN_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token missing").to_string();
    assert!(body["expires_in"].as_i64().unwrap() > 0);

    let (status, _) = app
        .request("GET", "/api/admin/orders", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/admin/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/admin/orders", None, Some("not-a-real-token"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_catalog_flow_feeds_the_public_menu() {
    let app = spawn_app().await;
    let token = app.admin_token();

    let (status, category) = app
        .request(
            "POST",
            "/api/admin/menu/categories",
            Some(json!({"name": "Burgers"})),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, item) = app
        .request(
            "POST",
            "/api/admin/menu/items",
            Some(json!({
                "name": "Classic Burger",
                "category_id": category_id,
                "mrp": "249",
                "selling_price": "199",
                "show_discount": true
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // Derived from mrp vs selling price: (50 / 249) * 100, rounded.
    assert_eq!(item["discount_percent"], 20);

    let (status, menu) = app.get("/api/menu/items").await;
    assert_eq!(status, StatusCode::OK);
    let menu = menu.as_array().expect("menu should be an array");
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0]["name"], "Classic Burger");

    // Deactivating hides it from the storefront.
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/admin/menu/items/{}", item["id"].as_str().unwrap()),
            Some(json!({
                "name": "Classic Burger",
                "category_id": item["category_id"],
                "mrp": "249",
                "selling_price": "199",
                "is_active": false
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, menu) = app.get("/api/menu/items").await;
    assert!(menu.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_coupon_crud_round_trip() {
    let app = spawn_app().await;
    let token = app.admin_token();

    let (status, coupon) = app
        .request(
            "POST",
            "/api/admin/coupons",
            Some(json!({
                "code": "burgo20",
                "coupon_type": "percentage",
                "value": "20",
                "min_order": "199",
                "max_cap": "100",
                "valid_from": (Utc::now() - Duration::days(1)).to_rfc3339(),
                "valid_till": (Utc::now() + Duration::days(30)).to_rfc3339()
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // Codes are normalised to uppercase on write.
    assert_eq!(coupon["code"], "BURGO20");
    assert_eq!(coupon["usage_count"], 0);

    let (status, listed) = app
        .request("GET", "/api/admin/coupons", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let id = coupon["id"].as_str().unwrap();
    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/admin/coupons/{}", id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn percentage_coupon_over_100_is_rejected() {
    let app = spawn_app().await;
    let token = app.admin_token();

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/coupons",
            Some(json!({
                "code": "TOOBIG",
                "coupon_type": "percentage",
                "value": "150",
                "min_order": "0",
                "valid_from": Utc::now().to_rfc3339(),
                "valid_till": (Utc::now() + Duration::days(1)).to_rfc3339()
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn public_settings_hide_the_whatsapp_number() {
    let app = spawn_app().await;
    let token = app.admin_token();

    let (status, _) = app
        .request(
            "PUT",
            "/api/admin/settings",
            Some(json!({
                "whatsapp_number": "919876543210",
                "delivery_fee_enabled": true,
                "delivery_fee_amount": "40",
                "free_delivery_enabled": true,
                "free_delivery_above": "300"
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, public) = app.get("/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["delivery_fee_enabled"], true);
    assert!(public.get("whatsapp_number").is_none());

    let (_, admin_view) = app
        .request("GET", "/api/admin/settings", None, Some(&token))
        .await;
    assert_eq!(admin_view["whatsapp_number"], "919876543210");
}

#[tokio::test]
async fn cart_flow_over_http() {
    let app = spawn_app().await;
    let token = app.admin_token();

    let (_, category) = app
        .request(
            "POST",
            "/api/admin/menu/categories",
            Some(json!({"name": "Burgers"})),
            Some(&token),
        )
        .await;
    let (_, item) = app
        .request(
            "POST",
            "/api/admin/menu/items",
            Some(json!({
                "name": "Classic Burger",
                "category_id": category["id"],
                "mrp": "249",
                "selling_price": "199"
            })),
            Some(&token),
        )
        .await;

    let (status, cart) = app.post("/api/carts", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    let cart_id = cart["id"].as_str().unwrap().to_string();

    let (status, with_item) = app
        .post(
            &format!("/api/carts/{}/items", cart_id),
            json!({"menu_item_id": item["id"], "quantity": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(with_item["item_count"], 2);
    assert_eq!(money(&with_item["cart"]["subtotal"]), dec!(398));

    let (status, body) = app
        .post(
            &format!("/api/carts/{}/coupon", cart_id),
            json!({"code": "NOPE"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Unprocessable Entity");

    let (status, placed) = app
        .post(
            &format!("/api/checkout/{}/place-order", cart_id),
            json!({
                "name": "Asha",
                "phone": "9876543210",
                "delivery_type": "takeaway"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&placed["order"]["grand_total"]), dec!(398));
    assert!(placed["order"]["order_number"]
        .as_str()
        .unwrap()
        .starts_with("ORD-"));

    // The order is now visible in the admin log.
    let (status, log) = app
        .request("GET", "/api/admin/orders", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["total"], 1);
    assert_eq!(log["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_can_look_up_an_order_by_number() {
    let app = spawn_app().await;
    let token = app.admin_token();

    let category = common::seed_category(&app, "Burgers").await;
    let burger =
        common::seed_menu_item(&app, category.id, "Classic Burger", dec!(249), dec!(199)).await;
    let cart = app.state.services.cart.create_cart().await.unwrap();
    app.state
        .services
        .cart
        .add_item(
            cart.id,
            storefront_api::services::cart::AddItemInput {
                menu_item_id: burger.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    let placed = app
        .state
        .services
        .checkout
        .place_order(
            cart.id,
            storefront_api::services::checkout::PlaceOrderInput {
                name: "Asha".to_string(),
                phone: "9876543210".to_string(),
                address: String::new(),
                delivery_type: storefront_api::entities::DeliveryType::Takeaway,
            },
        )
        .await
        .unwrap();

    let (status, found) = app
        .request(
            "GET",
            &format!("/api/admin/orders/by-number/{}", placed.order.order_number),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["order"]["id"], placed.order.id.to_string());
    assert_eq!(found["items"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(
            "GET",
            "/api/admin/orders/by-number/ORD-MISSING1",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_cart_returns_not_found_json() {
    let app = spawn_app().await;
    let (status, body) = app
        .get(&format!("/api/carts/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap().contains("not found"));
}
