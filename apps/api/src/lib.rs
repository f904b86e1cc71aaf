//! # Stocky API
//!
//! REST server for the Stocky ordering platform.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Routes (/api/v1)                            │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  companies     │  │  products                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • list/public  │  │ • create (COMPANY_ADMIN)   ││
//! │  │ • login        │  │ • me           │  │ • list                     ││
//! │  │ • refresh      │  │ • create       │  │ • update                   ││
//! │  │ • me           │  │ • approve      │  └────────────────────────────┘│
//! │  └────────────────┘  │ • status       │                                │
//! │                      └────────────────┘                                │
//! │  ┌────────────────┐  ┌────────────────────────────────────────────┐    │
//! │  │  shops         │  │  orders                                    │    │
//! │  │                │  │                                            │    │
//! │  │ • list         │  │ • place / preview / mine (SHOP_OWNER)      │    │
//! │  │ • status       │  │ • list / status (COMPANY_ADMIN)            │    │
//! │  └────────────────┘  └────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  SQLite (stocky-db)   JWT (access + refresh)   SMTP (lettre)      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Every key can be set in `stocky.toml` or as a
//! `STOCKY_*` environment variable.

pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use stocky_db::Database;

// Re-exports
pub use auth::{CurrentUser, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use mailer::Mailer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub mailer: Arc<Mailer>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig, mailer: Mailer) -> Self {
        let jwt = JwtManager::new(
            config.jwt_access_secret.clone(),
            config.jwt_refresh_secret.clone(),
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        );
        AppState {
            db,
            jwt: Arc::new(jwt),
            mailer: Arc::new(mailer),
            config: Arc::new(config),
        }
    }
}

/// Builds the full router with middleware.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
