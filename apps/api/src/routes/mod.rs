//! Route handlers, grouped by resource.
//!
//! Every handler authorizes first (`principal.authorize(..)`), then validates
//! input, then touches the database.

pub mod auth;
pub mod companies;
pub mod health;
pub mod orders;
pub mod products;
pub mod shops;

use axum::Router;

use stocky_core::{Company, Principal};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Everything mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(companies::router())
        .merge(shops::router())
        .merge(products::router())
        .merge(orders::router())
}

/// The company a company admin acts for, whatever its status.
///
/// The company id in the token wins when this admin created it; otherwise
/// (stale token, company created after login) the admin's earliest company.
pub(crate) async fn admin_company(state: &AppState, principal: &Principal) -> ApiResult<Option<Company>> {
    if let Some(id) = principal.company_id.as_deref() {
        if let Some(company) = state.db.companies().get_by_id(id).await? {
            if company.created_by_user_id == principal.user_id {
                return Ok(Some(company));
            }
        }
    }
    Ok(state.db.companies().find_for_admin(&principal.user_id).await?)
}

/// Like [`admin_company`], but the company must be approved.
pub(crate) async fn active_admin_company(state: &AppState, principal: &Principal) -> ApiResult<Company> {
    admin_company(state, principal)
        .await?
        .filter(|company| company.status.is_operable())
        .ok_or_else(|| ApiError::bad_request("No active company found for user"))
}
