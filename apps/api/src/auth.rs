//! JWT authentication and password hashing.
//!
//! Access and refresh tokens are signed with different secrets and carry a
//! `tokenType` claim, so neither can stand in for the other.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocky_core::{Principal, Role};

use crate::error::ApiError;
use crate::AppState;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub.clone(), self.role)
            .with_company(self.company_id.clone())
            .with_shop(self.shop_id.clone())
    }
}

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Expected {expected} token")]
    WrongTokenType { expected: &'static str },

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) | AuthError::WrongTokenType { .. } => {
                tracing::warn!(error = %err, "Rejected token");
                ApiError::unauthorized("Unauthorized")
            }
            AuthError::Signing(_) | AuthError::Hashing(_) => ApiError::internal(err.to_string()),
        }
    }
}

/// JWT token manager.
pub struct JwtManager {
    access_secret: String,
    refresh_secret: String,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        access_lifetime_secs: i64,
        refresh_lifetime_secs: i64,
    ) -> Self {
        JwtManager {
            access_secret,
            refresh_secret,
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    pub fn generate_access_token(&self, principal: &Principal) -> Result<String, AuthError> {
        self.sign(principal, ACCESS, self.access_lifetime_secs, &self.access_secret)
    }

    pub fn generate_refresh_token(&self, principal: &Principal) -> Result<String, AuthError> {
        self.sign(principal, REFRESH, self.refresh_lifetime_secs, &self.refresh_secret)
    }

    fn sign(
        &self,
        principal: &Principal,
        token_type: &str,
        lifetime_secs: i64,
        secret: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: principal.user_id.clone(),
            role: principal.role,
            company_id: principal.company_id.clone(),
            shop_id: principal.shop_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn validate(&self, token: &str, secret: &str, expected: &'static str) -> Result<Claims, AuthError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        if token_data.claims.token_type != expected {
            return Err(AuthError::WrongTokenType { expected });
        }
        Ok(token_data.claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate(token, &self.access_secret, ACCESS)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate(token, &self.refresh_secret, REFRESH)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hashes a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Well-formed argon2id hash with the default cost parameters that matches no
/// password. Login verifies against it when the email is unknown, so both
/// failure paths take the same time.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$D/WSNECuo3IdbYC8Jy2DAw$FVlxOoCvz4L4B+a3GM4RBvizKjIX+mIHHVQkbOf3v2E";

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller of a protected handler.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let Some(token) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
        else {
            tracing::debug!(uri = %parts.uri, "Missing bearer token");
            return Err(ApiError::unauthorized("Unauthorized"));
        };

        let claims = state.jwt.validate_access_token(token)?;
        let user = CurrentUser(claims.principal());
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
