//! Shared test harness: an in-memory SQLite database behind the full
//! application state, plus builders for catalog and coupon fixtures.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use storefront_api::{
    app_router,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{CategoryModel, CouponModel, CouponType, MenuItemModel},
    events::{process_events, EventSender},
    services::{
        catalog::{CategoryInput, MenuItemInput},
        coupons::CouponInput,
        settings::SettingsInput,
    },
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

/// Builds a fully wired application over a fresh in-memory database.
///
/// The pool is pinned to a single connection so every query sees the same
/// in-memory SQLite instance.
pub async fn spawn_app() -> TestApp {
    let db_config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        idle_timeout: Duration::from_secs(3600),
        ..Default::default()
    };
    let conn: DatabaseConnection = db::establish_connection_with_config(&db_config)
        .await
        .expect("failed to open in-memory database");
    db::run_migrations(&conn).await.expect("migrations failed");

    let (event_tx, event_rx) = mpsc::channel(64);
    tokio::spawn(process_events(event_rx));

    let password_digest = hex::encode(Sha256::digest(ADMIN_PASSWORD.as_bytes()));
    let config = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
        "integration-test-secret-key-0123456789abcdef".to_string(),
        ADMIN_USERNAME.to_string(),
        password_digest,
    );

    let state = Arc::new(AppState::new(
        Arc::new(conn),
        config,
        Arc::new(EventSender::new(event_tx)),
    ));
    let router = app_router(state.clone());
    TestApp { state, router }
}

impl TestApp {
    pub fn admin_token(&self) -> String {
        self.state
            .auth
            .login(ADMIN_USERNAME, ADMIN_PASSWORD)
            .expect("admin login failed")
    }

    /// Sends a request through the router and returns status plus parsed
    /// JSON body (Null for empty bodies).
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response was not JSON")
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request("GET", path, None, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(body), None).await
    }
}

// ---- Fixture builders (service level) ----

pub async fn seed_category(app: &TestApp, name: &str) -> CategoryModel {
    app.state
        .services
        .catalog
        .create_category(CategoryInput {
            name: name.to_string(),
            sort_order: 0,
        })
        .await
        .expect("failed to create category")
}

pub async fn seed_menu_item(
    app: &TestApp,
    category_id: Uuid,
    name: &str,
    mrp: Decimal,
    selling_price: Decimal,
) -> MenuItemModel {
    app.state
        .services
        .catalog
        .create_menu_item(MenuItemInput {
            name: name.to_string(),
            description: None,
            image: None,
            category_id,
            mrp,
            selling_price,
            show_discount: false,
            in_stock: true,
            is_best_seller: false,
            is_active: true,
        })
        .await
        .expect("failed to create menu item")
}

/// Coupon input valid from yesterday to one month out.
pub fn coupon_input(
    code: &str,
    coupon_type: CouponType,
    value: Decimal,
    min_order: Decimal,
    max_cap: Option<Decimal>,
) -> CouponInput {
    CouponInput {
        code: code.to_string(),
        coupon_type,
        value,
        min_order,
        max_cap,
        valid_from: Utc::now() - ChronoDuration::days(1),
        valid_till: Utc::now() + ChronoDuration::days(30),
        usage_limit: None,
        is_active: true,
        applicable_to: None,
    }
}

pub async fn seed_coupon(app: &TestApp, input: CouponInput) -> CouponModel {
    app.state
        .services
        .coupons
        .create_coupon(input)
        .await
        .expect("failed to create coupon")
}

/// Enables the delivery fee with a free-delivery threshold.
pub async fn configure_delivery_fee(app: &TestApp, fee: Decimal, free_above: Decimal) {
    app.state
        .services
        .settings
        .update(SettingsInput {
            whatsapp_number: "919876543210".to_string(),
            delivery_fee_enabled: true,
            delivery_fee_amount: fee,
            free_delivery_enabled: true,
            free_delivery_above: free_above,
        })
        .await
        .expect("failed to update settings");
}
