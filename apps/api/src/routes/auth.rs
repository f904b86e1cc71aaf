//! `/auth`: registration, login, token refresh and the caller's profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stocky_core::account::{LoginRequest, ProfileUpdate, RegisterRequest};
use stocky_core::{Operation, Principal, Role, User, UserProfile};
use stocky_db::DbError;

use crate::auth::{hash_password, verify_password, CurrentUser, DUMMY_PASSWORD_HASH};
use crate::error::{ApiError, ApiResult, AppJson};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub tokens: Tokens,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me).patch(update_me))
}

fn principal_for(user: &User) -> Principal {
    Principal::new(user.id.clone(), user.role)
        .with_company(user.linked_company_id.clone())
        .with_shop(user.linked_shop_id.clone())
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<Tokens> {
    let principal = principal_for(user);
    Ok(Tokens {
        access_token: state.jwt.generate_access_token(&principal)?,
        refresh_token: state.jwt.generate_refresh_token(&principal)?,
    })
}

fn email_taken(err: DbError) -> ApiError {
    match err {
        DbError::UniqueViolation { .. } => ApiError::conflict("email already registered"),
        other => other.into(),
    }
}

async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let registration = body.validate()?;
    let hash = hash_password(&registration.password)?;

    let users = state.db.users();
    if users.get_by_email(&registration.email).await?.is_some() {
        return Err(ApiError::conflict("email already registered"));
    }

    let user = match (&registration.role, &registration.shop) {
        (Role::ShopOwner, Some(shop)) => {
            users
                .register_shop_owner(&registration.email, &hash, shop)
                .await
                .map_err(email_taken)?
                .0
        }
        _ => users
            .create(&registration.email, &hash, registration.role)
            .await
            .map_err(email_taken)?,
    };

    info!(user_id = %user.id, role = %user.role, "User registered");
    let tokens = issue_tokens(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserProfile::from(&user),
            tokens,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, password) = body.credentials()?;

    let user = state.db.users().get_by_email(&email).await?;
    let verified = verify_password(
        password,
        user.as_ref()
            .map_or(DUMMY_PASSWORD_HASH, |user| user.password_hash.as_str()),
    );
    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!(email = %email, "Login failed");
            return Err(ApiError::unauthorized("invalid credentials"));
        }
    };

    info!(user_id = %user.id, "User logged in");
    let tokens = issue_tokens(&state, &user)?;
    Ok(Json(AuthResponse {
        user: UserProfile::from(&user),
        tokens,
    }))
}

async fn refresh(
    State(state): State<AppState>,
    AppJson(body): AppJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = body
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("refreshToken required"))?;

    let claims = state.jwt.validate_refresh_token(token)?;
    let access_token = state.jwt.generate_access_token(&claims.principal())?;
    Ok(Json(RefreshResponse { access_token }))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    principal.authorize(Operation::ViewProfile)?;

    let user = state
        .db
        .users()
        .get_by_id(&principal.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(UserResponse {
        user: UserProfile::from(&user),
    }))
}

async fn update_me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(body): AppJson<ProfileUpdate>,
) -> ApiResult<Json<UserResponse>> {
    principal.authorize(Operation::ViewProfile)?;
    let update = body.validate()?;

    let users = state.db.users();
    let user = if update.is_empty() {
        users
            .get_by_id(&principal.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?
    } else {
        let hash = update.password.as_deref().map(hash_password).transpose()?;
        users
            .update_profile(&principal.user_id, update.email.as_deref(), hash.as_deref())
            .await
            .map_err(email_taken)?
    };

    Ok(Json(UserResponse {
        user: UserProfile::from(&user),
    }))
}
