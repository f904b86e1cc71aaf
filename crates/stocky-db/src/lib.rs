//! # stocky-db: Database Layer for Stocky
//!
//! Database access for the Stocky platform. SQLite through sqlx, with
//! migrations embedded in the binary.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stocky Data Flow                                 │
//! │                                                                         │
//! │  axum handler (POST /api/v1/orders)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     stocky-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ CompanyRepo   │    │   _schema    │  │   │
//! │  │   │ Connection    │    │ ShopRepo      │    │              │  │   │
//! │  │   │ Management    │    │ ProductRepo   │    │              │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (stocky.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stocky_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stocky.db")).await?;
//! let companies = db.companies().list_active().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::company::CompanyRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::shop::ShopRepository;
pub use repository::user::UserRepository;
