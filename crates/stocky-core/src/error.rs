//! # Error Types
//!
//! Domain-specific error types for stocky-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stocky-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stocky-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stocky-api errors                                                      │
//! │  └── ApiError         - JSON `{message, code}` + HTTP status           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → client                 │
//! │        DbError ─────────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Several messages are part of the public contract (clients match on
//! `"invalid items"`, `"companyId required"` and friends), so they are kept
//! short and lowercase exactly as the web client expects.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The caller's role is not allowed to perform the operation.
    #[error("Forbidden")]
    Forbidden,

    /// An order status change that the workflow does not allow.
    ///
    /// ## When This Occurs
    /// ```text
    /// pending ──► accepted ──► delivered
    ///    │
    ///    └──────► rejected
    ///
    /// Anything else (accepted → rejected, rejected → accepted,
    /// delivered → *, X → X) ends up here.
    /// ```
    #[error("cannot change order status from {from} to {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    /// A status string that is not part of the relevant enum.
    #[error("invalid status")]
    InvalidStatus(String),

    /// A role string that is unknown, or a role that cannot self-register.
    #[error("invalid role")]
    InvalidRole(String),

    /// Order submission without a usable company id.
    #[error("companyId required")]
    CompanyIdRequired,

    /// Order submission without a delivery address.
    #[error("address required")]
    AddressRequired,

    /// Order submission without any line.
    #[error("items required")]
    ItemsRequired,

    /// At least one order line is unusable.
    ///
    /// ## When This Occurs
    /// - product id missing or malformed
    /// - quantity missing, below 1 or above the maximum
    /// - product does not exist or belongs to another company
    /// - the same product appears twice
    ///
    /// The reason is kept for logs; clients only ever see "invalid items".
    #[error("invalid items")]
    InvalidItems { reason: String },

    /// More lines than a single order may carry.
    #[error("an order cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// The cart has nothing to submit.
    #[error("cart is empty")]
    EmptyCart,

    /// A product from another company was added to a non-empty cart.
    #[error("cart already holds products from company {expected}")]
    MixedCompanyCart { expected: String, found: String },

    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidItems`].
    pub fn invalid_items(reason: impl Into<String>) -> Self {
        CoreError::InvalidItems {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// One or more request fields are missing. The message is shown as is.
    #[error("{0}")]
    Missing(String),

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    /// `missing("email and password")` reads "email and password required".
    pub fn missing(what: &str) -> Self {
        ValidationError::Missing(format!("{what} required"))
    }

    pub fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
