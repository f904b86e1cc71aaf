//! # Order Repository
//!
//! Orders and their snapshot lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (shop owner)                                                 │
//! │     └── place() → Order { status: pending }                            │
//! │         orders row + every order_items row in ONE transaction          │
//! │                                                                         │
//! │  2. DECIDE (company admin)                                             │
//! │     └── update_status(pending → accepted | rejected)                   │
//! │         UPDATE .. WHERE id = ? AND status = 'pending'                  │
//! │         0 rows → someone else decided first → StaleWrite               │
//! │                                                                         │
//! │  3. (OPTIONAL) DELIVER                                                 │
//! │     └── update_status(accepted → delivered)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are never updated after insert. Editing or deleting a product has
//! no effect on them.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use stocky_core::order::NewOrder;
use stocky_core::{CompanySummary, Order, OrderItem, OrderStatus, OrderWithCompany};

use super::new_id;
use crate::error::{DbError, DbResult};

const ORDER_COLUMNS: &str = "id, company_id, shop_owner_user_id, status, address, contact, \
                             delivery_date AS date, delivery_time AS time, latitude, longitude, \
                             notes, created_at, updated_at";

/// An `order_items` row, tagged with its order.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: String,
    product_id: String,
    name: String,
    sku: String,
    price_cents: i64,
    quantity: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product_id: row.product_id,
            name: row.name,
            sku: row.sku,
            price_cents: row.price_cents,
            quantity: row.quantity,
        }
    }
}

/// The `orders` column a listing filters on.
#[derive(Debug, Clone, Copy)]
enum OrderKey {
    Id,
    Company,
    ShopOwner,
}

impl OrderKey {
    fn as_str(self) -> &'static str {
        match self {
            OrderKey::Id => "id",
            OrderKey::Company => "company_id",
            OrderKey::ShopOwner => "shop_owner_user_id",
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompanySummaryRow {
    id: String,
    name: String,
    address: Option<String>,
    contact: Option<String>,
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a pending order and all its lines atomically.
    ///
    /// ## Errors
    /// [`DbError::ForeignKeyViolation`] if the company or shop owner vanished;
    /// nothing is written in that case.
    pub async fn place(&self, order: &NewOrder) -> DbResult<Order> {
        let id = new_id();
        let now = Utc::now();
        let details = &order.details;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, company_id, shop_owner_user_id, status, address, contact,
                                 delivery_date, delivery_time, latitude, longitude, notes,
                                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        )
        .bind(&id)
        .bind(&order.company_id)
        .bind(&order.shop_owner_user_id)
        .bind(OrderStatus::Pending)
        .bind(&details.address)
        .bind(&details.contact)
        .bind(details.date)
        .bind(&details.time)
        .bind(details.latitude)
        .bind(details.longitude)
        .bind(&details.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (line_no, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (order_id, line_no, product_id, name, sku, price_cents, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&id)
            .bind(i64::try_from(line_no).unwrap_or(i64::MAX))
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(&item.sku)
            .bind(item.price_cents)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let mut placed = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        placed.items = order.items.clone();
        info!(
            order_id = %id,
            company_id = %order.company_id,
            lines = order.items.len(),
            total_cents = order.total().cents(),
            "Order placed"
        );
        Ok(placed)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(order) => Ok(self.with_items(vec![order], OrderKey::Id, id).await?.pop()),
            None => Ok(None),
        }
    }

    /// The order, but only if it belongs to `company_id`.
    pub async fn get_for_company(&self, id: &str, company_id: &str) -> DbResult<Option<Order>> {
        Ok(self
            .get_by_id(id)
            .await?
            .filter(|order| order.company_id == company_id))
    }

    /// A company's incoming orders, newest first.
    pub async fn list_by_company(&self, company_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE company_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(company_id = %company_id, count = orders.len(), "Listed company orders");
        self.with_items(orders, OrderKey::Company, company_id).await
    }

    /// A shop owner's orders, newest first, each with the company it went to.
    pub async fn list_by_shop_owner(&self, user_id: &str) -> DbResult<Vec<OrderWithCompany>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE shop_owner_user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let orders = self.with_items(orders, OrderKey::ShopOwner, user_id).await?;
        let companies = self.company_summaries(user_id).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let company = companies.get(&order.company_id).cloned();
                OrderWithCompany { order, company }
            })
            .collect())
    }

    /// Moves an order from `expected` to `next`, provided nobody changed its
    /// status in the meantime.
    ///
    /// The transition itself is checked by the caller
    /// ([`OrderStatus::transition_to`]); this only guarantees the write lands
    /// on the status that check was made against.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] for an unknown id
    /// - [`DbError::StaleWrite`] if the status is no longer `expected`
    pub async fn update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> DbResult<Order> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                Some(_) => Err(DbError::StaleWrite {
                    entity: "Order".to_string(),
                    id: id.to_string(),
                }),
                None => Err(DbError::not_found("Order", id)),
            };
        }

        info!(order_id = %id, from = %expected, to = %next, "Order status changed");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Attaches each order's lines, in line order.
    ///
    /// Lines are selected through a join on `orders.{column} = key`, the same
    /// filter that produced `orders`, so the statement binds one parameter no
    /// matter how many orders there are.
    async fn with_items(
        &self,
        mut orders: Vec<Order>,
        column: OrderKey,
        key: &str,
    ) -> DbResult<Vec<Order>> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT oi.order_id, oi.product_id, oi.name, oi.sku, oi.price_cents, oi.quantity
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.{} = ?1
             ORDER BY oi.order_id, oi.line_no",
            column.as_str()
        ))
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            by_order
                .entry(row.order_id.clone())
                .or_default()
                .push(row.into());
        }

        for order in &mut orders {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }

        Ok(orders)
    }

    /// Every company a shop owner has ordered from, once each.
    async fn company_summaries(&self, user_id: &str) -> DbResult<HashMap<String, CompanySummary>> {
        let rows = sqlx::query_as::<_, CompanySummaryRow>(
            "SELECT DISTINCT c.id, c.name, c.address, c.contact
             FROM companies c
             JOIN orders o ON o.company_id = c.id
             WHERE o.shop_owner_user_id = ?1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    CompanySummary {
                        name: row.name,
                        address: row.address,
                        contact: row.contact,
                    },
                )
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
