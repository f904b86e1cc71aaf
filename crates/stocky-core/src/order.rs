//! # Order Submission
//!
//! Turns what a shop owner sends into an immutable order, and compares a
//! client cart against live catalogue data.
//!
//! ## Placement Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /orders body (OrderRequest, every field optional on the wire)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderRequest::validate()          companyId → address → items →       │
//! │       │                            line count → coordinates → time     │
//! │       ▼                                                                 │
//! │  ValidatedOrder ── product_ids() ──► (db) load products                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build_order_items()               every line: valid id, qty in range, │
//! │       │                            no duplicates, product of THIS      │
//! │       │                            company; else "invalid items"       │
//! │       ▼                                                                 │
//! │  NewOrder (snapshot OrderItems) ──► (db) single transaction insert     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`reconcile_cart`] is the lenient sibling of [`build_order_items`]: it
//! never fails, it reports what changed or vanished so the client can show
//! it before checkout.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{OrderItem, Product};
use crate::validation::{self, validate_coordinates, validate_quantity, validate_time};
use crate::MAX_ORDER_LINES;

// =============================================================================
// Request Types
// =============================================================================

/// One requested line. Both fields are optional on the wire so that a
/// malformed line is reported as "invalid items" rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
}

impl OrderLineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        OrderLineRequest {
            product_id: Some(product_id.into()),
            quantity: Some(quantity),
        }
    }
}

/// The order submission body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    pub company_id: Option<String>,
    pub items: Option<Vec<OrderLineRequest>>,
    pub address: Option<String>,
    pub contact: Option<String>,
    /// `YYYY-MM-DD`, or a full RFC 3339 timestamp whose date is used.
    pub date: Option<String>,
    /// `HH:MM`.
    pub time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// Delivery fields after validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeliveryDetails {
    pub address: String,
    pub contact: Option<String>,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

impl DeliveryDetails {
    pub fn new(address: impl Into<String>) -> Self {
        DeliveryDetails {
            address: address.into(),
            ..Default::default()
        }
    }
}

/// An [`OrderRequest`] whose envelope is valid. Lines are checked later,
/// against the company's products.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub company_id: String,
    pub lines: Vec<OrderLineRequest>,
    pub details: DeliveryDetails,
}

impl ValidatedOrder {
    /// Distinct, well-formed product ids referenced by the lines, in order.
    pub fn product_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.lines
            .iter()
            .filter_map(|line| line.product_id.as_deref())
            .filter(|id| uuid::Uuid::parse_str(id).is_ok())
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }
}

/// A fully checked order, ready to insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub company_id: String,
    pub shop_owner_user_id: String,
    pub items: Vec<OrderItem>,
    pub details: DeliveryDetails,
}

impl NewOrder {
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

// =============================================================================
// Validation
// =============================================================================

impl OrderRequest {
    /// Checks the request envelope in the order clients rely on.
    ///
    /// ## Errors
    /// - [`CoreError::CompanyIdRequired`] when `companyId` is missing or not a UUID
    /// - [`CoreError::AddressRequired`] when `address` is missing or blank
    /// - [`CoreError::ItemsRequired`] when `items` is missing or empty
    /// - [`CoreError::TooManyLines`] above [`MAX_ORDER_LINES`]
    /// - [`CoreError::Validation`] for coordinates, date, time and free text
    pub fn validate(&self) -> CoreResult<ValidatedOrder> {
        let company_id = self
            .company_id
            .as_deref()
            .map(str::trim)
            .filter(|id| uuid::Uuid::parse_str(id).is_ok())
            .ok_or(CoreError::CompanyIdRequired)?
            .to_string();

        let address = self
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(CoreError::AddressRequired)?;
        let address = validation::optional_text("address", Some(address))?
            .ok_or(CoreError::AddressRequired)?;

        let lines = match &self.items {
            Some(items) if !items.is_empty() => items.clone(),
            _ => return Err(CoreError::ItemsRequired),
        };

        if lines.len() > MAX_ORDER_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_ORDER_LINES,
            });
        }

        let coordinates = validate_coordinates(self.latitude, self.longitude)?;

        let date = self
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(parse_date)
            .transpose()?;

        let time = self
            .time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(validate_time)
            .transpose()?;

        Ok(ValidatedOrder {
            company_id,
            lines,
            details: DeliveryDetails {
                address,
                contact: validation::optional_text("contact", self.contact.as_deref())?,
                date,
                time,
                latitude: coordinates.map(|(lat, _)| lat),
                longitude: coordinates.map(|(_, lng)| lng),
                notes: validation::optional_text("notes", self.notes.as_deref())?,
            },
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::invalid_format("date", "expected YYYY-MM-DD"))
}

// =============================================================================
// Snapshotting
// =============================================================================

/// Builds frozen order lines from requested lines and live products.
///
/// `products` may contain anything (typically the result of loading
/// [`ValidatedOrder::product_ids`]); ownership is checked here.
///
/// ## Errors
/// [`CoreError::InvalidItems`] for the first unusable line, or
/// [`CoreError::ItemsRequired`] / [`CoreError::TooManyLines`] on the line count.
pub fn build_order_items(
    company_id: &str,
    lines: &[OrderLineRequest],
    products: &[Product],
) -> CoreResult<Vec<OrderItem>> {
    if lines.is_empty() {
        return Err(CoreError::ItemsRequired);
    }
    if lines.len() > MAX_ORDER_LINES {
        return Err(CoreError::TooManyLines {
            max: MAX_ORDER_LINES,
        });
    }

    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut seen = HashSet::with_capacity(lines.len());
    let mut items = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let product_id = line
            .product_id
            .as_deref()
            .filter(|id| uuid::Uuid::parse_str(id).is_ok())
            .ok_or_else(|| CoreError::invalid_items(format!("line {index}: bad product id")))?;

        let quantity = line
            .quantity
            .ok_or_else(|| CoreError::invalid_items(format!("line {index}: missing quantity")))?;
        validate_quantity(quantity).map_err(|e| CoreError::invalid_items(format!("line {index}: {e}")))?;

        if !seen.insert(product_id) {
            return Err(CoreError::invalid_items(format!(
                "line {index}: duplicate product {product_id}"
            )));
        }

        let product = by_id
            .get(product_id)
            .filter(|p| p.company_id == company_id)
            .ok_or_else(|| {
                CoreError::invalid_items(format!(
                    "line {index}: product {product_id} not sold by company {company_id}"
                ))
            })?;

        items.push(OrderItem::snapshot(product, quantity));
    }

    Ok(items)
}

// =============================================================================
// Cart Reconciliation
// =============================================================================

/// One cart line checked against the live product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReconciledLine {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    /// Live price.
    pub price_cents: i64,
    /// Price the cart was holding.
    pub cart_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
    pub price_changed: bool,
    pub name_changed: bool,
    pub quantity_valid: bool,
}

/// Result of comparing a cart with the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartReconciliation {
    pub company_id: String,
    pub lines: Vec<ReconciledLine>,
    /// Product ids that no longer exist or belong to another company.
    pub unavailable: Vec<String>,
    /// Total at live prices over the available lines.
    pub total_cents: i64,
    /// Whether submitting this cart as-is would succeed.
    pub ready: bool,
}

impl CartReconciliation {
    pub fn has_changes(&self) -> bool {
        !self.unavailable.is_empty()
            || self
                .lines
                .iter()
                .any(|line| line.price_changed || line.name_changed)
    }
}

/// Compares cart lines with live products of `company_id`.
pub fn reconcile_cart(
    company_id: &str,
    lines: &[CartLine],
    products: &[Product],
) -> CartReconciliation {
    let by_id: HashMap<&str, &Product> = products
        .iter()
        .filter(|p| p.company_id == company_id)
        .map(|p| (p.id.as_str(), p))
        .collect();

    let mut reconciled = Vec::with_capacity(lines.len());
    let mut unavailable = Vec::new();
    let mut seen = HashSet::with_capacity(lines.len());

    for line in lines {
        if !seen.insert(line.product_id.as_str()) {
            continue;
        }
        let Some(product) = by_id.get(line.product_id.as_str()) else {
            unavailable.push(line.product_id.clone());
            continue;
        };

        let quantity_valid = validate_quantity(line.quantity).is_ok();
        reconciled.push(ReconciledLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price_cents: product.price_cents,
            cart_price_cents: line.price_cents,
            quantity: line.quantity,
            line_total_cents: product.price().multiply_quantity(line.quantity).cents(),
            price_changed: product.price_cents != line.price_cents,
            name_changed: product.name != line.name,
            quantity_valid,
        });
    }

    let total_cents = reconciled
        .iter()
        .map(|line| Money::from_cents(line.line_total_cents))
        .sum::<Money>()
        .cents();
    let ready = !reconciled.is_empty()
        && unavailable.is_empty()
        && reconciled.len() <= MAX_ORDER_LINES
        && reconciled.iter().all(|line| line.quantity_valid);

    CartReconciliation {
        company_id: company_id.to_string(),
        lines: reconciled,
        unavailable,
        total_cents,
        ready,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const COMPANY: &str = "0b7c4a3e-0c55-4c1f-9a55-6f0c1d0d2a01";
    const OTHER_COMPANY: &str = "6a1f1b7e-4e0d-4b83-8f5e-2a3c9b7d4e02";
    const RICE: &str = "3f2b8c1d-5a6e-4f70-8b9c-0d1e2f3a4b51";
    const OIL: &str = "9e8d7c6b-5a4f-4e3d-8c2b-1a0f9e8d7c62";
    const FOREIGN: &str = "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c73";

    fn product(id: &str, company_id: &str, name: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            company_id: company_id.to_string(),
            name: name.to_string(),
            sku: format!("SKU-{}", &id[..4]),
            price_cents,
            warehouse_stock: 1000,
            expiry_date: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product(RICE, COMPANY, "Rice 5kg", 1210),
            product(OIL, COMPANY, "Oil 1L", 450),
            product(FOREIGN, OTHER_COMPANY, "Tea", 300),
        ]
    }

    fn request() -> OrderRequest {
        OrderRequest {
            company_id: Some(COMPANY.to_string()),
            items: Some(vec![
                OrderLineRequest::new(RICE, 50),
                OrderLineRequest::new(OIL, 60),
            ]),
            address: Some("  12 Market Road ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_happy_path() {
        let mut req = request();
        req.date = Some("2026-11-02".to_string());
        req.time = Some("14:30".to_string());
        req.latitude = Some(24.86);
        req.longitude = Some(67.01);
        req.contact = Some("   ".to_string());

        let validated = req.validate().unwrap();
        assert_eq!(validated.company_id, COMPANY);
        assert_eq!(validated.details.address, "12 Market Road");
        assert_eq!(validated.details.contact, None);
        assert_eq!(
            validated.details.date,
            NaiveDate::from_ymd_opt(2026, 11, 2)
        );
        assert_eq!(validated.details.time.as_deref(), Some("14:30"));
        assert_eq!(validated.product_ids(), vec![RICE.to_string(), OIL.to_string()]);
    }

    #[test]
    fn test_validate_error_order() {
        // Everything missing: companyId is reported first.
        let err = OrderRequest::default().validate().unwrap_err();
        assert!(matches!(err, CoreError::CompanyIdRequired));

        let mut req = request();
        req.company_id = Some("not-a-uuid".to_string());
        assert!(matches!(req.validate(), Err(CoreError::CompanyIdRequired)));

        let mut req = request();
        req.address = Some("   ".to_string());
        req.items = None;
        assert!(matches!(req.validate(), Err(CoreError::AddressRequired)));

        let mut req = request();
        req.items = Some(vec![]);
        assert!(matches!(req.validate(), Err(CoreError::ItemsRequired)));
    }

    #[test]
    fn test_validate_rejects_half_coordinates_and_bad_time() {
        let mut req = request();
        req.latitude = Some(10.0);
        assert!(matches!(req.validate(), Err(CoreError::Validation(_))));

        let mut req = request();
        req.time = Some("25:00".to_string());
        assert!(matches!(req.validate(), Err(CoreError::Validation(_))));

        let mut req = request();
        req.date = Some("next tuesday".to_string());
        assert!(matches!(req.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_validate_accepts_rfc3339_date() {
        let mut req = request();
        req.date = Some("2026-11-02T00:00:00.000Z".to_string());
        let validated = req.validate().unwrap();
        assert_eq!(validated.details.date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn test_too_many_lines() {
        let mut req = request();
        req.items = Some(vec![OrderLineRequest::new(RICE, 1); MAX_ORDER_LINES + 1]);
        assert!(matches!(req.validate(), Err(CoreError::TooManyLines { .. })));
    }

    #[test]
    fn test_build_order_items_snapshots_live_values() {
        let items = build_order_items(
            COMPANY,
            &[OrderLineRequest::new(OIL, 60), OrderLineRequest::new(RICE, 50)],
            &catalogue(),
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, OIL);
        assert_eq!(items[0].name, "Oil 1L");
        assert_eq!(items[0].price_cents, 450);
        assert_eq!(items[1].sku, "SKU-3f2b");
        let total: Money = items.iter().map(OrderItem::line_total).sum();
        assert_eq!(total.cents(), 60 * 450 + 50 * 1210);
    }

    #[test]
    fn test_build_order_items_rejects_bad_lines() {
        let products = catalogue();
        let cases = vec![
            vec![OrderLineRequest::new(RICE, 0)],
            vec![OrderLineRequest {
                product_id: Some(RICE.to_string()),
                quantity: None,
            }],
            vec![OrderLineRequest {
                product_id: None,
                quantity: Some(5),
            }],
            vec![OrderLineRequest::new("not-a-uuid", 5)],
            vec![OrderLineRequest::new(FOREIGN, 5)],
            vec![OrderLineRequest::new(
                "00000000-0000-4000-8000-000000000000",
                5,
            )],
            vec![OrderLineRequest::new(RICE, 5), OrderLineRequest::new(RICE, 7)],
        ];

        for lines in cases {
            let err = build_order_items(COMPANY, &lines, &products).unwrap_err();
            assert_eq!(err.to_string(), "invalid items", "lines: {lines:?}");
        }
    }

    fn cart_line(id: &str, name: &str, price_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id: id.to_string(),
            company_id: COMPANY.to_string(),
            name: name.to_string(),
            sku: None,
            price_cents,
            quantity,
        }
    }

    #[test]
    fn test_reconcile_cart_flags_changes() {
        let lines = vec![
            cart_line(RICE, "Rice 5kg", 1100, 50),
            cart_line(OIL, "Cooking Oil", 450, 60),
            cart_line(FOREIGN, "Tea", 300, 50),
        ];

        let result = reconcile_cart(COMPANY, &lines, &catalogue());

        assert_eq!(result.lines.len(), 2);
        assert!(result.lines[0].price_changed);
        assert_eq!(result.lines[0].cart_price_cents, 1100);
        assert_eq!(result.lines[0].price_cents, 1210);
        assert!(!result.lines[1].price_changed);
        assert!(result.lines[1].name_changed);
        assert_eq!(result.unavailable, vec![FOREIGN.to_string()]);
        assert_eq!(result.total_cents, 50 * 1210 + 60 * 450);
        assert!(!result.ready);
        assert!(result.has_changes());
    }

    #[test]
    fn test_reconcile_clean_cart_is_ready() {
        let lines = vec![cart_line(RICE, "Rice 5kg", 1210, 50)];
        let result = reconcile_cart(COMPANY, &lines, &catalogue());
        assert!(result.ready);
        assert!(!result.has_changes());
    }

    #[test]
    fn test_reconcile_empty_cart_is_not_ready() {
        let result = reconcile_cart(COMPANY, &[], &catalogue());
        assert!(!result.ready);
        assert_eq!(result.total_cents, 0);
    }
}
