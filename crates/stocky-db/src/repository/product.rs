//! # Product Repository
//!
//! Database operations for company catalogs.
//!
//! ## Key Operations
//! - Create / update with per-company SKU uniqueness
//! - Catalog listing (newest first)
//! - Batch lookup of the products an order references

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use stocky_core::catalog::NewProduct;
use stocky_core::Product;

use super::new_id;
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, company_id, name, sku, price_cents, warehouse_stock, \
                               expiry_date, image_url, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let catalog = repo.list_by_company(&company_id).await?;
/// let referenced = repo.get_many(&["uuid-1".into(), "uuid-2".into()]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product into a company's catalog.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] on `sku` when the company already has it.
    pub async fn create(&self, company_id: &str, product: &NewProduct) -> DbResult<Product> {
        let id = new_id();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO products (id, company_id, name, sku, price_cents, warehouse_stock,
                                   expiry_date, image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        )
        .bind(&id)
        .bind(company_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_cents)
        .bind(product.warehouse_stock)
        .bind(product.expiry_date)
        .bind(&product.image_url)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| sku_conflict(e.into(), &product.sku))?;

        info!(product_id = %id, company_id = %company_id, sku = %product.sku, "Product created");
        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &id))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// A company's catalog, newest first.
    pub async fn list_by_company(&self, company_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE company_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(company_id = %company_id, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Fetches every product whose id is in `ids`. Unknown ids are skipped;
    /// the result order is unspecified.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Writes back every editable field of `product`.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if the product no longer exists
    /// - [`DbError::UniqueViolation`] on `sku` for a SKU the company already uses
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        let result = sqlx::query(
            "UPDATE products
             SET name = ?1, sku = ?2, price_cents = ?3, warehouse_stock = ?4,
                 expiry_date = ?5, image_url = ?6, updated_at = ?7
             WHERE id = ?8",
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_cents)
        .bind(product.warehouse_stock)
        .bind(product.expiry_date)
        .bind(&product.image_url)
        .bind(Utc::now())
        .bind(&product.id)
        .execute(&self.pool)
        .await
        .map_err(|e| sku_conflict(e.into(), &product.sku))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        info!(product_id = %product.id, "Product updated");
        self.get_by_id(&product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &product.id))
    }
}

fn sku_conflict(err: DbError, sku: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field.contains("sku") => {
            DbError::duplicate("sku", sku)
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
