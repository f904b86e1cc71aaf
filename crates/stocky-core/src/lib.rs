//! # stocky-core: Pure Business Logic for Stocky
//!
//! Everything that decides *whether* something may happen lives here: who may
//! call what, which tenant states are operable, how a cart behaves and how a
//! submitted cart is frozen into an order. No database, no network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stocky Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (REST consumer)                   │   │
//! │  │   Browse companies ──► Cart ──► Checkout ──► Order history      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stocky-api (axum handlers)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stocky-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │ access  │ │  cart   │ │  order  │ │ account │  │   │
//! │  │   │ Company │ │  Role   │ │  Cart   │ │snapshot │ │register │  │   │
//! │  │   │ Product │ │Principal│ │CartLine │ │reconcile│ │ profile │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stocky-db (SQLite via sqlx)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and status enums
//! - [`money`] - Integer-cent money type
//! - [`access`] - Roles, principals and the route permission table
//! - [`cart`] - Client cart semantics
//! - [`order`] - Order request validation, snapshotting and cart reconciliation
//! - [`account`] - Registration and profile input
//! - [`catalog`] - Company, shop and product input
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stocky_core::money::Money;
//!
//! let unit = Money::from_cents(1_250);
//! assert_eq!(unit.multiply_quantity(50).cents(), 62_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod account;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Operation, Principal};
pub use cart::{AddOutcome, Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct product lines in one cart or order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single order line.
///
/// Wholesale quantities run in the hundreds or thousands; this only catches
/// typos like an extra run of zeros.
pub const MAX_ITEM_QUANTITY: i64 = 100_000;

/// Quantity used when a product is added to the cart without one, and the
/// smallest quantity the add button accepts.
pub const DEFAULT_CART_QUANTITY: i64 = 50;

/// Minimum password length accepted at registration and profile update.
pub const MIN_PASSWORD_LEN: usize = 6;
