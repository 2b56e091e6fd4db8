pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod notifications;
pub mod seed;
pub mod services;

use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::events::EventSender;
use crate::handlers::AppServices;

/// Shared state handed to every request handler.
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub auth: AuthService,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: AppConfig,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let auth = AuthService::new(AuthConfig::new(
            config.jwt_secret.clone(),
            config.jwt_expiration,
            config.admin_username.clone(),
            config.admin_password_sha256.clone(),
        ));
        let services = AppServices::new(db.clone(), event_sender.clone());

        Self {
            db,
            config,
            event_sender,
            auth,
            services,
        }
    }
}

/// Builds the full application router.
///
/// Public routes serve the storefront; everything under `/api/admin`
/// requires a bearer token issued by `/api/auth/login`.
pub fn app_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .nest("/menu", handlers::menu::admin_menu_routes())
        .nest("/slides", handlers::slides::admin_slides_routes())
        .nest("/coupons", handlers::coupons::admin_coupons_routes())
        .nest("/orders", handlers::orders::admin_orders_routes())
        .nest("/settings", handlers::settings::admin_settings_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let api_routes = Router::new()
        .nest("/health", handlers::health::health_routes())
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/menu", handlers::menu::menu_routes())
        .nest("/slides", handlers::slides::slides_routes())
        .nest("/settings", handlers::settings::settings_routes())
        .nest("/carts", handlers::carts::carts_routes())
        .nest("/checkout", handlers::checkout::checkout_routes())
        .nest("/admin", admin_routes);

    let cors = if state.config.cors_allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .with_state(state)
}
