//! `/products`: a company admin's catalogue.
//!
//! All three endpoints act on the admin's company and need it approved.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use stocky_core::catalog::{ProductInput, ProductPatch};
use stocky_core::{Operation, Product};
use stocky_db::DbError;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, AppJson};
use crate::routes::active_admin_company;
use crate::routes::companies::ProductsResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", patch(update_product))
}

fn sku_taken(err: DbError) -> ApiError {
    match err {
        DbError::UniqueViolation { .. } => ApiError::conflict("SKU already exists for this company"),
        other => other.into(),
    }
}

async fn create_product(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(body): AppJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    principal.authorize(Operation::ManageProducts)?;
    let company = active_admin_company(&state, &principal).await?;
    let input = body.validate()?;

    let product = state
        .db
        .products()
        .create(&company.id, &input)
        .await
        .map_err(sku_taken)?;

    info!(product_id = %product.id, company_id = %company.id, sku = %product.sku, "Product created");
    Ok((StatusCode::CREATED, Json(ProductResponse { product })))
}

async fn list_products(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<ProductsResponse>> {
    principal.authorize(Operation::ManageProducts)?;
    let company = active_admin_company(&state, &principal).await?;

    let products = state.db.products().list_by_company(&company.id).await?;
    Ok(Json(ProductsResponse { products }))
}

async fn update_product(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(changes): AppJson<ProductPatch>,
) -> ApiResult<Json<ProductResponse>> {
    principal.authorize(Operation::ManageProducts)?;
    let company = active_admin_company(&state, &principal).await?;

    let mut product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .filter(|p| p.company_id == company.id)
        .ok_or_else(|| ApiError::not_found("Product"))?;

    if changes.is_empty() {
        return Ok(Json(ProductResponse { product }));
    }

    changes.apply(&mut product)?;
    let product = state
        .db
        .products()
        .update(&product)
        .await
        .map_err(sku_taken)?;

    info!(product_id = %product.id, company_id = %company.id, "Product updated");
    Ok(Json(ProductResponse { product }))
}
