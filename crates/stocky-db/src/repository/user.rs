//! # User Repository
//!
//! Accounts and the registration write path.
//!
//! ## Shop Owner Registration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT users  (role SHOP_OWNER, shop_status pending)                 │
//! │    INSERT shops  (status pending, created_by_user_id = user)            │
//! │    UPDATE users  SET linked_shop_id = shop                              │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A taken email fails the first INSERT; nothing is left behind.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use stocky_core::catalog::NewShop;
use stocky_core::{Role, Shop, TenantStatus, User};

use super::new_id;
use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, email, password_hash, role, linked_company_id, linked_shop_id, \
                            shop_status, created_at, updated_at";

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Looks a user up by (already normalised) email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a user without a shop (company admins and the super admin).
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] on `email` when the address is taken.
    pub async fn create(&self, email: &str, password_hash: &str, role: Role) -> DbResult<User> {
        let id = new_id();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict(e.into(), email))?;

        info!(user_id = %id, role = %role, "User created");
        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &id))
    }

    /// Creates a shop owner and their pending shop in one transaction.
    pub async fn register_shop_owner(
        &self,
        email: &str,
        password_hash: &str,
        shop: &NewShop,
    ) -> DbResult<(User, Shop)> {
        let user_id = new_id();
        let shop_id = new_id();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, shop_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        )
        .bind(&user_id)
        .bind(email)
        .bind(password_hash)
        .bind(Role::ShopOwner)
        .bind(TenantStatus::Pending)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| email_conflict(e.into(), email))?;

        sqlx::query(
            "INSERT INTO shops (id, name, address, contact, created_by_user_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&shop_id)
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(&shop.contact)
        .bind(&user_id)
        .bind(TenantStatus::Pending)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET linked_shop_id = ?1 WHERE id = ?2")
            .bind(&shop_id)
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(&user_id)
        .fetch_one(&mut *tx)
        .await?;

        let shop = sqlx::query_as::<_, Shop>(
            "SELECT id, name, address, contact, created_by_user_id, status, created_at, updated_at
             FROM shops WHERE id = ?1",
        )
        .bind(&shop_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user_id = %user_id, shop_id = %shop_id, "Shop owner registered");
        Ok((user, shop))
    }

    /// Changes email and/or password hash. `None` leaves a field alone.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] for an unknown user
    /// - [`DbError::UniqueViolation`] on `email` when the new address is taken
    pub async fn update_profile(
        &self,
        id: &str,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> DbResult<User> {
        let result = sqlx::query(
            "UPDATE users
             SET email = COALESCE(?1, email),
                 password_hash = COALESCE(?2, password_hash),
                 updated_at = ?3
             WHERE id = ?4",
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict(e.into(), email.unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        debug!(user_id = %id, "Profile updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }
}

/// Names the offending email on a unique violation of `users.email`.
fn email_conflict(err: DbError, email: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field.contains("email") => {
            DbError::duplicate("email", email)
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
