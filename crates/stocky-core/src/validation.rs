//! # Validation Module
//!
//! Field validators shared by registration, catalogue and order input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client                                                   │
//! │  └── Immediate feedback (empty fields, min cart quantity)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum handler                                                 │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── THIS MODULE: field rules, normalisation                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK constraints (price >= 0, quantity >= 1)                     │
//! │  └── UNIQUE (email), UNIQUE (company_id, sku)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators that normalise (trim, lowercase) return the cleaned value so
//! callers store exactly what was checked.

use chrono::NaiveTime;

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 1000;
const MAX_EMAIL_LEN: usize = 254;
const MAX_SKU_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Trims and lowercases an email and checks it has a plausible shape.
///
/// ```rust
/// use stocky_core::validation::validate_email;
///
/// assert_eq!(validate_email("  Admin@Stocky.IO ").unwrap(), "admin@stocky.io");
/// assert!(validate_email("no-at-sign").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::invalid_format(
            "email",
            "must look like name@domain",
        ));
    }

    Ok(email)
}

/// Checks password length. Passwords are never trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a required display name (company, shop or product).
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, `-`, `_`, `.` and `/` only
///
/// ```rust
/// use stocky_core::validation::validate_sku;
///
/// assert_eq!(validate_sku(" RICE-5KG ").unwrap(), "RICE-5KG");
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<String> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return Err(ValidationError::invalid_format(
            "sku",
            "must contain only letters, numbers, '-', '_', '.' and '/'",
        ));
    }

    Ok(sku.to_string())
}

/// Normalises an optional free-text field: blank becomes `None`.
pub fn optional_text(field: &str, value: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(Some(value.to_string()))
}

/// Validates a `HH:MM` 24-hour time.
pub fn validate_time(time: &str) -> ValidationResult<String> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| ValidationError::invalid_format("time", "expected HH:MM"))?;
    Ok(time.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Price in cents, zero allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Warehouse stock, zero allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "warehouseStock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an order line quantity: `1..=MAX_ITEM_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Latitude and longitude must come as a pair and be on the globe.
pub fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> ValidationResult<Option<(f64, f64)>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ValidationError::OutOfRange {
                    field: "latitude".to_string(),
                    min: -90,
                    max: 90,
                });
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(ValidationError::OutOfRange {
                    field: "longitude".to_string(),
                    min: -180,
                    max: 180,
                });
            }
            Ok(Some((lat, lng)))
        }
        (Some(_), None) => Err(ValidationError::required("longitude")),
        (None, Some(_)) => Err(ValidationError::required("latitude")),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use stocky_core::validation::validate_uuid;
///
/// assert!(validate_uuid("companyId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("companyId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id)
        .map_err(|_| ValidationError::invalid_format(field, "must be a valid UUID"))?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("Owner@Shop.test").unwrap(), "owner@shop.test");
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("@shop.test").is_err());
        assert!(validate_email("owner@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("own er@shop.test").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(matches!(
            validate_password("12345"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(matches!(
            validate_password(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Acme Foods ").unwrap(), "Acme Foods");
        assert!(validate_name("name", " ").is_err());
        assert!(validate_name("name", &"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("oil_1L").is_ok());
        assert!(validate_sku("A/B.2").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("notes", None).unwrap(), None);
        assert_eq!(optional_text("notes", Some("   ")).unwrap(), None);
        assert_eq!(
            optional_text("notes", Some(" ring twice ")).unwrap(),
            Some("ring twice".to_string())
        );
        assert!(optional_text("notes", Some(&"x".repeat(1001))).is_err());
    }

    #[test]
    fn test_validate_time() {
        assert_eq!(validate_time("09:30").unwrap(), "09:30");
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("9am").is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-5).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert_eq!(validate_coordinates(None, None).unwrap(), None);
        assert_eq!(
            validate_coordinates(Some(24.86), Some(67.0)).unwrap(),
            Some((24.86, 67.0))
        );
        assert!(validate_coordinates(Some(91.0), Some(0.0)).is_err());
        assert!(validate_coordinates(Some(0.0), Some(-181.0)).is_err());
        assert!(validate_coordinates(Some(10.0), None).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }
}
