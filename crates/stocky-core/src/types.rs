//! # Domain Types
//!
//! Core domain types used throughout Stocky.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Company      │   │      Shop       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, email      │──►│  created_by     │   │  created_by     │◄──┐   │
//! │  │  role           │   │  status (gate)  │   │  status (gate)  │   │   │
//! │  │  linked_*_id    │   └────────┬────────┘   └─────────────────┘   │   │
//! │  └─────────────────┘            │ 1..n                              │   │
//! │                        ┌────────▼────────┐   ┌─────────────────┐   │   │
//! │                        │    Product      │   │     Order       │───┘   │
//! │                        │  sku (per co.)  │──►│  items (frozen) │       │
//! │                        │  price_cents    │   │  status         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Enums
//! - [`TenantStatus`] gates companies and shops: only `active` ones are
//!   visible to other tenants or allowed to trade.
//! - [`OrderStatus`] follows a one-way workflow, see
//!   [`OrderStatus::transition_to`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// The three kinds of account. A user's role never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    /// Platform operator. Approves companies and shops.
    SuperAdmin,
    /// Owns a company, its catalogue and its incoming orders.
    CompanyAdmin,
    /// Owns a shop and places orders.
    ShopOwner,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::CompanyAdmin => "COMPANY_ADMIN",
            Role::ShopOwner => "SHOP_OWNER",
        }
    }

    /// Super admins are only ever created by the seed tool.
    pub const fn is_self_registrable(&self) -> bool {
        matches!(self, Role::CompanyAdmin | Role::ShopOwner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "COMPANY_ADMIN" => Ok(Role::CompanyAdmin),
            "SHOP_OWNER" => Ok(Role::ShopOwner),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

// =============================================================================
// Tenant Status (approval gate)
// =============================================================================

/// Approval state of a company or shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TenantStatus {
    /// Registered, waiting for a super admin.
    #[default]
    Pending,
    /// Approved and visible platform-wide.
    Active,
    /// Switched off by a super admin.
    Inactive,
}

impl TenantStatus {
    pub const ALL: [TenantStatus; 3] = [
        TenantStatus::Pending,
        TenantStatus::Active,
        TenantStatus::Inactive,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Pending => "pending",
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
        }
    }

    /// Whether the tenant may trade (be browsed, receive or place orders).
    #[inline]
    pub const fn is_operable(&self) -> bool {
        matches!(self, TenantStatus::Active)
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TenantStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::Delivered,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Whether `self → next` is an allowed step.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Accepted)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::Delivered)
        )
    }

    /// Validates a status change and returns the new status.
    ///
    /// ## Workflow
    /// ```text
    ///            accept           deliver
    /// pending ──────────► accepted ────────► delivered
    ///    │
    ///    │ reject
    ///    └──────────────► rejected
    /// ```
    /// No step can be undone.
    pub fn transition_to(self, next: OrderStatus) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidOrderTransition {
                from: self,
                to: next,
            })
        }
    }

    /// No further transition is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

// =============================================================================
// User
// =============================================================================

/// An account. `password_hash` is never serialized.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    pub linked_company_id: Option<String>,
    pub linked_shop_id: Option<String>,
    /// Mirror of the linked shop's status, kept in sync on status changes.
    pub shop_status: Option<TenantStatus>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// The user fields returned by auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_status: Option<TenantStatus>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            shop_status: user.shop_status,
        }
    }
}

// =============================================================================
// Company
// =============================================================================

/// A supplier. One per company admin by convention.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub status: TenantStatus,
    pub created_by_user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn summary(&self) -> CompanySummary {
        CompanySummary {
            name: self.name.clone(),
            address: self.address.clone(),
            contact: self.contact.clone(),
        }
    }
}

/// What a shop owner sees of the company on each of their orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanySummary {
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
}

// =============================================================================
// Shop
// =============================================================================

/// A retailer that buys from companies.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub created_by_user_id: String,
    pub status: TenantStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Super-admin listing row: a shop plus its owner's email.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShopWithOwner {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub owner_email: Option<String>,
    pub status: TenantStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A warehouse product. `sku` is unique within its company.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    pub warehouse_stock: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A frozen order line. Copied from the product at submission and never
/// touched again, whatever happens to the product later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl OrderItem {
    /// Snapshots a product at the requested quantity.
    pub fn snapshot(product: &Product, quantity: i64) -> Self {
        OrderItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price_cents: product.price_cents,
            quantity,
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// An order from a shop owner to a company.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub company_id: String,
    pub shop_owner_user_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub address: String,
    pub contact: Option<String>,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    /// Requested delivery time, `HH:MM`.
    pub time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// A shop owner's view of one of their orders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderWithCompany {
    #[serde(flatten)]
    pub order: Order,
    pub company: Option<CompanySummary>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            company_id: "c-1".to_string(),
            name: "Basmati Rice 5kg".to_string(),
            sku: "RICE-5".to_string(),
            price_cents,
            warehouse_stock: 400,
            expiry_date: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("SHOP_OWNER".parse::<Role>().unwrap(), Role::ShopOwner);
        assert_eq!("COMPANY_ADMIN".parse::<Role>().unwrap(), Role::CompanyAdmin);
        assert!(matches!(
            "shop_owner".parse::<Role>(),
            Err(CoreError::InvalidRole(_))
        ));
        assert!(!Role::SuperAdmin.is_self_registrable());
        assert!(Role::ShopOwner.is_self_registrable());
    }

    #[test]
    fn test_role_serde_matches_wire_format() {
        let json = serde_json::to_string(&Role::CompanyAdmin).unwrap();
        assert_eq!(json, "\"COMPANY_ADMIN\"");
    }

    #[test]
    fn test_tenant_status() {
        assert_eq!(TenantStatus::default(), TenantStatus::Pending);
        assert!(TenantStatus::Active.is_operable());
        assert!(!TenantStatus::Pending.is_operable());
        assert!(!TenantStatus::Inactive.is_operable());
        assert_eq!("inactive".parse::<TenantStatus>().unwrap(), TenantStatus::Inactive);
        assert!("archived".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn test_order_transitions_allowed() {
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Accepted).unwrap(),
            OrderStatus::Accepted
        );
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Rejected).unwrap(),
            OrderStatus::Rejected
        );
        assert_eq!(
            OrderStatus::Accepted.transition_to(OrderStatus::Delivered).unwrap(),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_order_transitions_are_one_way() {
        let forbidden = [
            (OrderStatus::Accepted, OrderStatus::Rejected),
            (OrderStatus::Rejected, OrderStatus::Accepted),
            (OrderStatus::Accepted, OrderStatus::Pending),
            (OrderStatus::Rejected, OrderStatus::Pending),
            (OrderStatus::Pending, OrderStatus::Delivered),
            (OrderStatus::Delivered, OrderStatus::Accepted),
            (OrderStatus::Pending, OrderStatus::Pending),
        ];
        for (from, to) in forbidden {
            assert!(
                matches!(
                    from.transition_to(to),
                    Err(CoreError::InvalidOrderTransition { .. })
                ),
                "{from} -> {to} should be rejected"
            );
        }
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Accepted.is_terminal());
    }

    #[test]
    fn test_order_item_snapshot_and_totals() {
        let mut p = product(1210);
        let item = OrderItem::snapshot(&p, 50);

        // Later edits to the product do not reach the snapshot.
        p.price_cents = 9999;
        p.name = "Renamed".to_string();

        assert_eq!(item.price_cents, 1210);
        assert_eq!(item.name, "Basmati Rice 5kg");
        assert_eq!(item.line_total().cents(), 60_500);
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let now = Utc::now();
        let user = User {
            id: "u-1".to_string(),
            email: "owner@shop.test".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::ShopOwner,
            linked_company_id: None,
            linked_shop_id: Some("s-1".to_string()),
            shop_status: Some(TenantStatus::Pending),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["shopStatus"], "pending");

        let profile = UserProfile::from(&user);
        assert_eq!(profile.shop_status, Some(TenantStatus::Pending));
    }
}
