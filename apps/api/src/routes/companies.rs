//! `/companies`: approval workflow for super admins, the company admin's
//! own company, and the public directory of active companies.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use stocky_core::catalog::CompanyInput;
use stocky_core::{Company, Operation, Product, TenantStatus};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, AppJson};
use crate::routes::admin_company;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusChange {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub company: Company,
}

/// `company` is `null` until the admin has created one.
#[derive(Debug, Serialize)]
pub struct MyCompanyResponse {
    pub company: Option<Company>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/public", get(list_public))
        .route("/companies/me", get(my_company))
        .route("/companies/{id}/public", get(get_public))
        .route("/companies/{id}/products/public", get(list_public_products))
        .route("/companies/{id}/approve", post(approve))
        .route("/companies/{id}/status", patch(change_status))
}

/// Parses a tenant status; an empty string counts as absent.
pub(crate) fn parse_status(raw: Option<&str>) -> ApiResult<Option<TenantStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Some(s.parse::<TenantStatus>()?)),
        None => Ok(None),
    }
}

async fn list_companies(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Json<CompaniesResponse>> {
    principal.authorize(Operation::ListAllCompanies)?;
    let status = parse_status(filter.status.as_deref())?;

    let companies = state.db.companies().list(status).await?;
    Ok(Json(CompaniesResponse { companies }))
}

async fn list_public(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<CompaniesResponse>> {
    principal.authorize(Operation::BrowseCompanies)?;

    let companies = state.db.companies().list_active().await?;
    Ok(Json(CompaniesResponse { companies }))
}

async fn my_company(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<MyCompanyResponse>> {
    principal.authorize(Operation::ViewOwnCompany)?;

    let company = admin_company(&state, &principal).await?;
    Ok(Json(MyCompanyResponse { company }))
}

async fn get_public(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CompanyResponse>> {
    principal.authorize(Operation::BrowseCompanies)?;

    let company = state
        .db
        .companies()
        .get_active(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))?;
    Ok(Json(CompanyResponse { company }))
}

async fn list_public_products(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductsResponse>> {
    principal.authorize(Operation::BrowseCompanies)?;

    let company = state
        .db
        .companies()
        .get_active(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))?;

    let products = state.db.products().list_by_company(&company.id).await?;
    Ok(Json(ProductsResponse { products }))
}

async fn create_company(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(body): AppJson<CompanyInput>,
) -> ApiResult<(StatusCode, Json<CompanyResponse>)> {
    principal.authorize(Operation::CreateCompany)?;
    let input = body.validate()?;

    let company = state.db.companies().create(&principal.user_id, &input).await?;
    info!(company_id = %company.id, user_id = %principal.user_id, "Company created");
    Ok((StatusCode::CREATED, Json(CompanyResponse { company })))
}

async fn approve(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CompanyResponse>> {
    principal.authorize(Operation::ChangeCompanyStatus)?;

    let company = state.db.companies().set_status(&id, TenantStatus::Active).await?;
    info!(company_id = %company.id, "Company approved");
    Ok(Json(CompanyResponse { company }))
}

async fn change_status(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<StatusChange>,
) -> ApiResult<Json<CompanyResponse>> {
    principal.authorize(Operation::ChangeCompanyStatus)?;
    let status = parse_status(body.status.as_deref())?
        .ok_or_else(|| ApiError::bad_request("invalid status"))?;

    let company = state.db.companies().set_status(&id, status).await?;
    info!(company_id = %company.id, status = %status, "Company status changed");
    Ok(Json(CompanyResponse { company }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("  ")).unwrap(), None);
        assert_eq!(parse_status(Some("active")).unwrap(), Some(TenantStatus::Active));

        let err = parse_status(Some("archived")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "invalid status");
    }
}
