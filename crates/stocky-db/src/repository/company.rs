//! # Company Repository
//!
//! Companies and their approval status.
//!
//! ## Admin's Company
//! One company per admin is a convention, not a constraint. When an admin has
//! created several, the earliest one is theirs:
//! ```text
//! SELECT .. FROM companies WHERE created_by_user_id = ?
//! ORDER BY created_at ASC, rowid ASC LIMIT 1
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use stocky_core::catalog::NewCompany;
use stocky_core::{Company, TenantStatus};

use super::new_id;
use crate::error::{DbError, DbResult};

const COMPANY_COLUMNS: &str =
    "id, name, address, contact, status, created_by_user_id, created_at, updated_at";

/// Repository for companies.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Creates a pending company and links it to its admin if the admin has
    /// no company linked yet.
    pub async fn create(&self, owner_user_id: &str, company: &NewCompany) -> DbResult<Company> {
        let id = new_id();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO companies (id, name, address, contact, status, created_by_user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&id)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.contact)
        .bind(TenantStatus::Pending)
        .bind(owner_user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET linked_company_id = ?1, updated_at = ?2
             WHERE id = ?3 AND linked_company_id IS NULL",
        )
        .bind(&id)
        .bind(now)
        .bind(owner_user_id)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"
        ))
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(company_id = %id, user_id = %owner_user_id, "Company created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// Returns the company only if it is active.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Company>> {
        Ok(self
            .get_by_id(id)
            .await?
            .filter(|company| company.status.is_operable()))
    }

    /// All companies, optionally filtered by status, newest first.
    pub async fn list(&self, status: Option<TenantStatus>) -> DbResult<Vec<Company>> {
        debug!(status = ?status, "Listing companies");

        let companies = match status {
            Some(status) => {
                sqlx::query_as::<_, Company>(&format!(
                    "SELECT {COMPANY_COLUMNS} FROM companies WHERE status = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Company>(&format!(
                    "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY created_at DESC, rowid DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(companies)
    }

    /// Companies shop owners may browse.
    pub async fn list_active(&self) -> DbResult<Vec<Company>> {
        self.list(Some(TenantStatus::Active)).await
    }

    /// The admin's company, whatever its status.
    pub async fn find_for_admin(&self, user_id: &str) -> DbResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE created_by_user_id = ?1
             ORDER BY created_at ASC, rowid ASC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// Sets the approval status. Any status may follow any other.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] for an unknown id.
    pub async fn set_status(&self, id: &str, status: TenantStatus) -> DbResult<Company> {
        let result = sqlx::query("UPDATE companies SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Company", id));
        }

        info!(company_id = %id, status = %status, "Company status changed");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Company", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stocky_core::Role;

    fn company(name: &str) -> NewCompany {
        NewCompany {
            name: name.to_string(),
            address: None,
            contact: Some("0300-0000000".to_string()),
        }
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admin = db
            .users()
            .create("admin@acme.test", "hash", Role::CompanyAdmin)
            .await
            .unwrap();
        (db, admin.id)
    }

    #[tokio::test]
    async fn test_create_links_first_company_only() {
        let (db, admin_id) = setup().await;

        let first = db.companies().create(&admin_id, &company("Acme")).await.unwrap();
        assert_eq!(first.status, TenantStatus::Pending);

        let second = db.companies().create(&admin_id, &company("Acme 2")).await.unwrap();

        let admin = db.users().get_by_id(&admin_id).await.unwrap().unwrap();
        assert_eq!(admin.linked_company_id.as_deref(), Some(first.id.as_str()));

        let theirs = db.companies().find_for_admin(&admin_id).await.unwrap().unwrap();
        assert_eq!(theirs.id, first.id);

        let all = db.companies().list(None).await.unwrap();
        assert_eq!(all[0].id, second.id, "newest first");
    }

    #[tokio::test]
    async fn test_status_filter_and_active_lookup() {
        let (db, admin_id) = setup().await;
        let c = db.companies().create(&admin_id, &company("Acme")).await.unwrap();

        assert!(db.companies().get_active(&c.id).await.unwrap().is_none());
        assert!(db.companies().list_active().await.unwrap().is_empty());

        let approved = db
            .companies()
            .set_status(&c.id, TenantStatus::Active)
            .await
            .unwrap();
        assert_eq!(approved.status, TenantStatus::Active);
        assert!(db.companies().get_active(&c.id).await.unwrap().is_some());
        assert_eq!(
            db.companies().list(Some(TenantStatus::Pending)).await.unwrap().len(),
            0
        );

        // any → any, including back to pending
        db.companies()
            .set_status(&c.id, TenantStatus::Pending)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_status_unknown_company() {
        let (db, _) = setup().await;
        assert!(matches!(
            db.companies().set_status("nope", TenantStatus::Active).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
