//! # Orders
//!
//! Shop owners place orders and read their history; company admins read
//! incoming orders and decide on them.
//!
//! ## Placement
//! ```text
//! POST /orders
//!   1. role SHOP_OWNER                    else 403
//!   2. OrderRequest::validate()           else 400 with message
//!   3. caller's shop active               else 403 "shop not active"
//!   4. company exists and active          else 404 "Company not found"
//!   5. build_order_items(live products)   else 400 "invalid items"
//!   6. order + items, one transaction     status pending
//!   7. "order placed" email               spawned, failures logged
//!   8. 201 { orderId }
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stocky_core::order::{build_order_items, reconcile_cart, CartReconciliation, NewOrder, OrderRequest};
use stocky_core::{Cart, Company, CoreError, Operation, Order, OrderStatus, OrderWithCompany, Principal, User};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, AppJson};
use crate::routes::admin_company;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedResponse {
    pub order_id: String,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct MyOrdersResponse {
    pub orders: Vec<OrderWithCompany>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub reconciliation: CartReconciliation,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderStatusChange {
    pub status: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_company_orders).post(place_order))
        .route("/orders/preview", post(preview_cart))
        .route("/orders/mine", get(list_my_orders))
        .route("/orders/{id}/status", patch(change_status))
}

/// Targets a company admin may request. `pending` is never a target.
fn parse_target(raw: Option<&str>) -> ApiResult<OrderStatus> {
    match raw.map(str::trim).map(str::parse::<OrderStatus>) {
        Some(Ok(status)) if status != OrderStatus::Pending => Ok(status),
        _ => Err(ApiError::bad_request("invalid status")),
    }
}

/// The calling shop owner, whose shop must be approved.
async fn active_shop_owner(state: &AppState, principal: &Principal) -> ApiResult<User> {
    let user = state
        .db
        .users()
        .get_by_id(&principal.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let shop = match user.linked_shop_id.as_deref() {
        Some(shop_id) => state.db.shops().get_by_id(shop_id).await?,
        None => None,
    };
    match shop {
        Some(shop) if shop.status.is_operable() => Ok(user),
        _ => {
            warn!(user_id = %user.id, "Order attempt from a shop that is not active");
            Err(ApiError::forbidden("shop not active"))
        }
    }
}

async fn active_company(state: &AppState, company_id: &str) -> ApiResult<Company> {
    state
        .db
        .companies()
        .get_active(company_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))
}

async fn place_order(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(body): AppJson<OrderRequest>,
) -> ApiResult<(StatusCode, Json<PlacedResponse>)> {
    principal.authorize(Operation::PlaceOrder)?;
    let request = body.validate()?;
    let owner = active_shop_owner(&state, &principal).await?;
    let company = active_company(&state, &request.company_id).await?;

    let products = state.db.products().get_many(&request.product_ids()).await?;
    let items = build_order_items(&company.id, &request.lines, &products)?;

    let order = state
        .db
        .orders()
        .place(&NewOrder {
            company_id: company.id.clone(),
            shop_owner_user_id: owner.id.clone(),
            items,
            details: request.details,
        })
        .await?;

    info!(
        order_id = %order.id,
        company_id = %company.id,
        user_id = %owner.id,
        lines = order.items.len(),
        total = %order.total(),
        "Order placed"
    );

    let mailer = state.mailer.clone();
    let (to, order_id, total) = (owner.email, order.id.clone(), order.total());
    tokio::spawn(async move {
        if let Err(e) = mailer.send_order_placed(&to, &order_id, total).await {
            warn!(order_id = %order_id, error = %e, "Order confirmation email failed");
        }
    });

    Ok((StatusCode::CREATED, Json(PlacedResponse { order_id: order.id })))
}

/// Compares a client cart with the live catalogue without placing anything.
async fn preview_cart(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(cart): AppJson<Cart>,
) -> ApiResult<Json<PreviewResponse>> {
    principal.authorize(Operation::PreviewCart)?;
    let company_id = cart.company_id().ok_or(CoreError::EmptyCart)?.to_string();
    active_shop_owner(&state, &principal).await?;
    let company = active_company(&state, &company_id).await?;

    let ids: Vec<String> = cart.lines.iter().map(|line| line.product_id.clone()).collect();
    let products = state.db.products().get_many(&ids).await?;

    let reconciliation = reconcile_cart(&company.id, &cart.lines, &products);
    Ok(Json(PreviewResponse { reconciliation }))
}

async fn list_company_orders(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<OrdersResponse>> {
    principal.authorize(Operation::ListCompanyOrders)?;

    let orders = match admin_company(&state, &principal).await? {
        Some(company) => state.db.orders().list_by_company(&company.id).await?,
        None => Vec::new(),
    };
    Ok(Json(OrdersResponse { orders }))
}

async fn list_my_orders(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<MyOrdersResponse>> {
    principal.authorize(Operation::ListOwnOrders)?;

    let orders = state.db.orders().list_by_shop_owner(&principal.user_id).await?;
    Ok(Json(MyOrdersResponse { orders }))
}

/// The SQL update only lands if the status is still the one checked here.
async fn change_status(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<OrderStatusChange>,
) -> ApiResult<Json<OrderResponse>> {
    principal.authorize(Operation::ChangeOrderStatus)?;

    let company = admin_company(&state, &principal)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))?;
    let order = state
        .db
        .orders()
        .get_for_company(&id, &company.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order"))?;

    let target = parse_target(body.status.as_deref())?;
    let next = order.status.transition_to(target)?;

    let order = state.db.orders().update_status(&order.id, order.status, next).await?;
    Ok(Json(OrderResponse { order }))
}
