//! # Cart
//!
//! The shop owner's cart. It lives on the client (session storage) and is
//! never persisted by the server; this type pins down its behaviour so the
//! client, the preview endpoint and the tests agree on it.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Action              Cart call                 Effect                │
//! │  ─────────              ─────────                 ──────                │
//! │  "Add to cart"  ──────► add(product, None)  ────► push qty 50          │
//! │  "Add" again    ──────► add(product, ..)    ────► AlreadyInCart, no-op │
//! │  Edit quantity  ──────► update_quantity()   ────► qty = max(1, n)      │
//! │  Trash icon     ──────► remove()            ────► line dropped         │
//! │  "Place order"  ──────► to_order_request()  ────► POST /orders body    │
//! │  After success  ──────► clear()                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`
//! - Every line has `quantity >= 1`
//! - All lines belong to one company (the first line's)
//! - At most [`MAX_ORDER_LINES`] lines

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::{DeliveryDetails, OrderLineRequest, OrderRequest};
use crate::types::Product;
use crate::{DEFAULT_CART_QUANTITY, MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// A product in the cart, with the name and price seen when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub company_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            company_id: product.company_id.clone(),
            name: product.name.clone(),
            sku: Some(product.sku.clone()),
            price_cents: product.price_cents,
            quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The product was already in the cart; nothing changed.
    AlreadyInCart,
}

impl AddOutcome {
    pub fn added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product.
    ///
    /// ## Behavior
    /// - quantity defaults to, and is raised to at least, 50
    /// - a product already in the cart is left untouched
    /// - a product of a different company than the cart's is refused
    pub fn add(&mut self, product: &Product, quantity: Option<i64>) -> CoreResult<AddOutcome> {
        if self.contains(&product.id) {
            return Ok(AddOutcome::AlreadyInCart);
        }

        if let Some(company_id) = self.company_id() {
            if company_id != product.company_id {
                return Err(CoreError::MixedCompanyCart {
                    expected: company_id.to_string(),
                    found: product.company_id.clone(),
                });
            }
        }

        if self.lines.len() >= MAX_ORDER_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_ORDER_LINES,
            });
        }

        let quantity = quantity
            .unwrap_or(DEFAULT_CART_QUANTITY)
            .clamp(DEFAULT_CART_QUANTITY, MAX_ITEM_QUANTITY);
        self.lines.push(CartLine::from_product(product, quantity));
        Ok(AddOutcome::Added)
    }

    /// Sets a line's quantity, clamped to `1..=MAX_ITEM_QUANTITY`.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        line.quantity = quantity.clamp(1, MAX_ITEM_QUANTITY);
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities (the badge number).
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn unique_count(&self) -> usize {
        self.lines.len()
    }

    /// Total at the prices cached in the cart.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Company the cart orders from: that of the first line.
    pub fn company_id(&self) -> Option<&str> {
        self.lines.first().map(|line| line.company_id.as_str())
    }

    /// Lines the UI should warn about ("add quantity above 50").
    pub fn below_minimum(&self) -> Vec<&CartLine> {
        self.lines
            .iter()
            .filter(|line| line.quantity < DEFAULT_CART_QUANTITY)
            .collect()
    }

    /// Builds the `POST /orders` body for this cart.
    pub fn to_order_request(&self, delivery: &DeliveryDetails) -> CoreResult<OrderRequest> {
        let company_id = self.company_id().ok_or(CoreError::EmptyCart)?;

        Ok(OrderRequest {
            company_id: Some(company_id.to_string()),
            items: Some(
                self.lines
                    .iter()
                    .map(|line| OrderLineRequest::new(line.product_id.clone(), line.quantity))
                    .collect(),
            ),
            address: Some(delivery.address.clone()),
            contact: delivery.contact.clone(),
            date: delivery.date.map(|d| d.format("%Y-%m-%d").to_string()),
            time: delivery.time.clone(),
            latitude: delivery.latitude,
            longitude: delivery.longitude,
            notes: delivery.notes.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    const COMPANY: &str = "0b7c4a3e-0c55-4c1f-9a55-6f0c1d0d2a01";

    fn product(id: &str, company_id: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            company_id: company_id.to_string(),
            name: format!("Product {id}"),
            sku: format!("SKU-{id}"),
            price_cents,
            warehouse_stock: 500,
            expiry_date: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_defaults_to_minimum_quantity() {
        let mut cart = Cart::new();
        let outcome = cart.add(&product("a", COMPANY, 100), None).unwrap();
        assert!(outcome.added());
        assert_eq!(cart.lines[0].quantity, DEFAULT_CART_QUANTITY);

        cart.add(&product("b", COMPANY, 100), Some(10)).unwrap();
        assert_eq!(cart.lines[1].quantity, DEFAULT_CART_QUANTITY);

        cart.add(&product("c", COMPANY, 100), Some(120)).unwrap();
        assert_eq!(cart.lines[2].quantity, 120);
    }

    #[test]
    fn test_duplicate_add_is_a_no_op() {
        let mut cart = Cart::new();
        let p = product("a", COMPANY, 100);
        cart.add(&p, Some(80)).unwrap();

        let outcome = cart.add(&p, Some(200)).unwrap();
        assert_eq!(outcome, AddOutcome::AlreadyInCart);
        assert_eq!(cart.unique_count(), 1);
        assert_eq!(cart.lines[0].quantity, 80);
    }

    #[test]
    fn test_mixed_company_is_refused() {
        let mut cart = Cart::new();
        cart.add(&product("a", COMPANY, 100), None).unwrap();
        let err = cart
            .add(&product("b", "other-company", 100), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MixedCompanyCart { .. }));
        assert_eq!(cart.unique_count(), 1);
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = Cart::new();
        cart.add(&product("a", COMPANY, 100), None).unwrap();

        cart.update_quantity("a", 0).unwrap();
        assert_eq!(cart.lines[0].quantity, 1);
        assert_eq!(cart.below_minimum().len(), 1);

        cart.update_quantity("a", -7).unwrap();
        assert_eq!(cart.lines[0].quantity, 1);

        cart.update_quantity("a", 75).unwrap();
        assert_eq!(cart.lines[0].quantity, 75);
        assert!(cart.below_minimum().is_empty());

        assert!(matches!(
            cart.update_quantity("missing", 5),
            Err(CoreError::NotInCart(_))
        ));
    }

    #[test]
    fn test_totals_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(&product("a", COMPANY, 1210), None).unwrap();
        cart.add(&product("b", COMPANY, 450), Some(60)).unwrap();

        assert_eq!(cart.total_items(), 110);
        assert_eq!(cart.unique_count(), 2);
        assert_eq!(cart.total().cents(), 50 * 1210 + 60 * 450);
        assert_eq!(cart.company_id(), Some(COMPANY));

        assert!(cart.remove("a"));
        assert!(!cart.remove("a"));
        assert_eq!(cart.unique_count(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.company_id(), None);
    }

    #[test]
    fn test_to_order_request() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.to_order_request(&DeliveryDetails::new("x")),
            Err(CoreError::EmptyCart)
        ));

        cart.add(&product("a", COMPANY, 1210), Some(55)).unwrap();
        let mut delivery = DeliveryDetails::new("12 Market Road");
        delivery.date = NaiveDate::from_ymd_opt(2026, 11, 2);

        let req = cart.to_order_request(&delivery).unwrap();
        assert_eq!(req.company_id.as_deref(), Some(COMPANY));
        assert_eq!(req.items.unwrap(), vec![OrderLineRequest::new("a", 55)]);
        assert_eq!(req.date.as_deref(), Some("2026-11-02"));
    }

    #[test]
    fn test_session_json_shape() {
        let mut cart = Cart::new();
        cart.add(&product("a", COMPANY, 100), None).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["lines"][0]["productId"], "a");
        assert_eq!(json["lines"][0]["priceCents"], 100);

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }
}
