//! # Repository Module
//!
//! Database repository implementations for Stocky.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.orders().place(&new_order)                           │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place(&self, order)          ── one transaction                   │
//! │  ├── list_by_company(&self, id)                                        │
//! │  └── update_status(&self, ..)     ── guarded by current status         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts, registration, profile
//! - [`CompanyRepository`](company::CompanyRepository) - Companies and approval status
//! - [`ShopRepository`](shop::ShopRepository) - Shops and approval status
//! - [`ProductRepository`](product::ProductRepository) - Company catalogs
//! - [`OrderRepository`](order::OrderRepository) - Orders and their snapshot lines
//!
//! Lists are newest first; `rowid` breaks ties between rows created within the
//! same timestamp.

pub mod company;
pub mod order;
pub mod product;
pub mod shop;
pub mod user;

/// Generates a new entity id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
