use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body returned for every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Unprocessable Entity")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Errors produced by the service layer.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// User-correctable coupon rejection reasons. None of these are fatal; they
/// surface as inline validation messages and leave the cart usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("Invalid coupon code")]
    InvalidCoupon,

    #[error("This coupon has expired")]
    ExpiredCoupon,

    #[error("Minimum order of {0} required for this coupon")]
    MinOrderNotMet(rust_decimal::Decimal),

    #[error("This coupon has reached its usage limit")]
    UsageLimitExceeded,
}

impl ServiceError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidOperation(_) => StatusCode::CONFLICT,
            ServiceError::AuthError(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Coupon(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the client. Internal failures are masked.
    pub fn response_message(&self) -> String {
        match self {
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Errors surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ServiceError(service_error) => {
                if service_error.status_code().is_server_error() {
                    tracing::error!("service error: {service_error}");
                }
                (
                    service_error.status_code(),
                    service_error.response_message(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        };

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message,
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}
