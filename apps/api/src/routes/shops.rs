//! `/shops`: super-admin view of retailers and their approval state.

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use stocky_core::{Operation, ShopWithOwner, TenantStatus};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, AppJson};
use crate::routes::companies::{parse_status, StatusChange};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ShopsResponse {
    pub shops: Vec<ShopWithOwner>,
}

#[derive(Debug, Serialize)]
pub struct ShopStatusView {
    pub id: String,
    pub name: String,
    pub status: TenantStatus,
}

#[derive(Debug, Serialize)]
pub struct ShopResponse {
    pub shop: ShopStatusView,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shops", get(list_shops))
        .route("/shops/{id}/status", patch(change_status))
}

async fn list_shops(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<ShopsResponse>> {
    principal.authorize(Operation::ListShops)?;

    let shops = state.db.shops().list_with_owner().await?;
    Ok(Json(ShopsResponse { shops }))
}

/// The owner's mirrored `shop_status` changes in the same transaction.
async fn change_status(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<StatusChange>,
) -> ApiResult<Json<ShopResponse>> {
    principal.authorize(Operation::ChangeShopStatus)?;
    let status = parse_status(body.status.as_deref())?
        .ok_or_else(|| ApiError::bad_request("invalid status"))?;

    let shop = state.db.shops().set_status(&id, status).await?;
    info!(shop_id = %shop.id, status = %status, "Shop status changed");
    Ok(Json(ShopResponse {
        shop: ShopStatusView {
            id: shop.id,
            name: shop.name,
            status: shop.status,
        },
    }))
}
