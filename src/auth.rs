use crate::errors::{ApiError, ServiceError};
use axum::http::header::AUTHORIZATION;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// JWT claims for an admin session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin login name
    pub sub: String,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// Issued at (seconds since epoch)
    pub iat: i64,
}

/// Settings for issuing and verifying admin tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    token_ttl: Duration,
    admin_username: String,
    admin_password_sha256: String,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        token_ttl_secs: u64,
        admin_username: String,
        admin_password_sha256: String,
    ) -> Self {
        Self {
            jwt_secret,
            token_ttl: Duration::seconds(token_ttl_secs as i64),
            admin_username,
            admin_password_sha256: admin_password_sha256.to_lowercase(),
        }
    }
}

/// Issues and verifies admin bearer tokens. Only the boolean "is this an
/// authenticated admin" signal exists; there is no user table.
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Validates the admin credential pair and returns a signed token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, ServiceError> {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        if username != self.config.admin_username || digest != self.config.admin_password_sha256 {
            warn!("rejected admin login for '{}'", username);
            return Err(ServiceError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            exp: (now + self.config.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::AuthError(format!("Failed to issue token: {}", e)))
    }

    /// Verifies a bearer token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::AuthError("Invalid or expired token".to_string()))
    }

    /// Token TTL in seconds, for the login response body.
    pub fn token_ttl_secs(&self) -> i64 {
        self.config.token_ttl.num_seconds()
    }
}

/// Axum middleware guarding the admin router. Expects `Authorization:
/// Bearer <token>`.
pub async fn require_admin(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<crate::AppState>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    state
        .auth
        .verify(token)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(next.run(req).await)
}
