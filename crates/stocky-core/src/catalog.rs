//! # Catalog Input
//!
//! Payloads that create or change tenants and products. Each `*Input` is the
//! raw JSON body; `validate()` turns it into a `New*` value the repositories
//! can insert without further checks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::types::Product;
use crate::validation::{
    optional_text, validate_name, validate_price_cents, validate_sku, validate_stock,
    ValidationResult,
};

// =============================================================================
// Shops
// =============================================================================

/// The `shop` object of a SHOP_OWNER registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShopInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShop {
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
}

impl ShopInput {
    pub fn validate(&self) -> ValidationResult<NewShop> {
        Ok(NewShop {
            name: validate_name("shop.name", self.name.as_deref().unwrap_or_default())?,
            address: optional_text("shop.address", self.address.as_deref())?,
            contact: optional_text("shop.contact", self.contact.as_deref())?,
        })
    }
}

// =============================================================================
// Companies
// =============================================================================

/// `POST /companies` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanyInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
}

impl CompanyInput {
    /// ## Errors
    /// `"name required"` when the name is missing or blank.
    pub fn validate(&self) -> ValidationResult<NewCompany> {
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => validate_name("name", name)?,
            _ => return Err(ValidationError::missing("name")),
        };

        Ok(NewCompany {
            name,
            address: optional_text("address", self.address.as_deref())?,
            contact: optional_text("contact", self.contact.as_deref())?,
        })
    }
}

// =============================================================================
// Products
// =============================================================================

/// `POST /products` body. `SKU` is accepted as an alias of `sku`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductInput {
    pub name: Option<String>,
    #[serde(alias = "SKU")]
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub warehouse_stock: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    pub warehouse_stock: i64,
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl ProductInput {
    /// ## Errors
    /// - `"name, SKU, price, warehouseStock are required"` if any of them is absent
    /// - range/format errors for the individual fields
    pub fn validate(&self) -> ValidationResult<NewProduct> {
        let (Some(name), Some(sku), Some(price_cents), Some(warehouse_stock)) = (
            self.name.as_deref().filter(|n| !n.trim().is_empty()),
            self.sku.as_deref().filter(|s| !s.trim().is_empty()),
            self.price_cents,
            self.warehouse_stock,
        ) else {
            return Err(ValidationError::Missing(
                "name, SKU, price, warehouseStock are required".to_string(),
            ));
        };

        validate_price_cents(price_cents)?;
        validate_stock(warehouse_stock)?;

        Ok(NewProduct {
            name: validate_name("name", name)?,
            sku: validate_sku(sku)?,
            price_cents,
            warehouse_stock,
            expiry_date: self.expiry_date,
            image_url: optional_text("imageUrl", self.image_url.as_deref())?,
        })
    }
}

/// `PATCH /products/{id}` body. Absent fields are left alone.
///
/// `expiryDate` and `imageUrl` cannot be cleared once set; send a new value
/// instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    #[serde(alias = "SKU")]
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub warehouse_stock: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.sku.is_none()
            && self.price_cents.is_none()
            && self.warehouse_stock.is_none()
            && self.expiry_date.is_none()
            && self.image_url.is_none()
    }

    /// Validates every present field, then writes them into `product`.
    ///
    /// Nothing is written if any field is invalid. Existing orders are not
    /// affected: their lines carry their own copy of name, SKU and price.
    pub fn apply(&self, product: &mut Product) -> CoreResult<()> {
        let name = self
            .name
            .as_deref()
            .map(|n| validate_name("name", n))
            .transpose()?;
        let sku = self.sku.as_deref().map(validate_sku).transpose()?;
        if let Some(cents) = self.price_cents {
            validate_price_cents(cents)?;
        }
        if let Some(stock) = self.warehouse_stock {
            validate_stock(stock)?;
        }
        let image_url = optional_text("imageUrl", self.image_url.as_deref())?;

        if let Some(name) = name {
            product.name = name;
        }
        if let Some(sku) = sku {
            product.sku = sku;
        }
        if let Some(cents) = self.price_cents {
            product.price_cents = cents;
        }
        if let Some(stock) = self.warehouse_stock {
            product.warehouse_stock = stock;
        }
        if let Some(date) = self.expiry_date {
            product.expiry_date = Some(date);
        }
        if image_url.is_some() {
            product.image_url = image_url;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
