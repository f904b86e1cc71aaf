//! # Shop Repository
//!
//! Shops are created together with their owner (see
//! [`UserRepository::register_shop_owner`](super::user::UserRepository::register_shop_owner));
//! this repository reads them and changes their approval status.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use stocky_core::{Role, Shop, ShopWithOwner, TenantStatus};

use crate::error::{DbError, DbResult};

const SHOP_COLUMNS: &str =
    "id, name, address, contact, created_by_user_id, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    /// Every shop with its owner's email, newest first.
    pub async fn list_with_owner(&self) -> DbResult<Vec<ShopWithOwner>> {
        let shops = sqlx::query_as::<_, ShopWithOwner>(
            "SELECT s.id, s.name, s.address, s.contact, s.status, s.created_at,
                    (SELECT u.email FROM users u
                     WHERE u.linked_shop_id = s.id AND u.role = ?1
                     ORDER BY u.created_at LIMIT 1) AS owner_email
             FROM shops s
             ORDER BY s.created_at DESC, s.rowid DESC",
        )
        .bind(Role::ShopOwner)
        .fetch_all(&self.pool)
        .await?;

        Ok(shops)
    }

    /// Sets the shop's status and mirrors it onto the owner's `shop_status`,
    /// in one transaction.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] for an unknown id.
    pub async fn set_status(&self, id: &str, status: TenantStatus) -> DbResult<Shop> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE shops SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", id));
        }

        sqlx::query(
            "UPDATE users SET shop_status = ?1, updated_at = ?2
             WHERE linked_shop_id = ?3 AND role = ?4",
        )
        .bind(status)
        .bind(now)
        .bind(id)
        .bind(Role::ShopOwner)
        .execute(&mut *tx)
        .await?;

        let shop = sqlx::query_as::<_, Shop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(shop_id = %id, status = %status, "Shop status changed");
        Ok(shop)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
