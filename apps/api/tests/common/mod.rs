//! Shared harness: the full router over a fresh in-memory database,
//! driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use stocky_api::auth::hash_password;
use stocky_api::{app, ApiConfig, AppState, Mailer};
use stocky_core::Role;
use stocky_db::{Database, DbConfig};

pub const PASSWORD: &str = "secret123";
pub const ADMIN_EMAIL: &str = "root@stocky.test";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.clone(), ApiConfig::default(), Mailer::disabled());
        TestApp {
            router: app(state),
            db,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Super admins cannot register; insert one directly and log in.
    pub async fn super_admin(&self) -> String {
        if self.db.users().get_by_email(ADMIN_EMAIL).await.unwrap().is_none() {
            let hash = hash_password(PASSWORD).unwrap();
            self.db
                .users()
                .create(ADMIN_EMAIL, &hash, Role::SuperAdmin)
                .await
                .unwrap();
        }
        self.login(ADMIN_EMAIL).await
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["tokens"]["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn register_company_admin(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "email": email, "password": PASSWORD, "role": "COMPANY_ADMIN" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["tokens"]["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn register_shop_owner(&self, email: &str, shop_name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "role": "SHOP_OWNER",
                    "shop": { "name": shop_name, "address": "12 Market Road" }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["tokens"]["accessToken"].as_str().unwrap().to_string()
    }

    // =========================================================================
    // Tenants
    // =========================================================================

    /// Registers a company admin, creates their company and approves it.
    /// Returns `(token, company_id)`.
    pub async fn active_company(&self, email: &str, name: &str) -> (String, String) {
        let token = self.register_company_admin(email).await;
        let (status, body) = self
            .post(
                "/api/v1/companies",
                Some(&token),
                json!({ "name": name, "address": "Industrial Area", "contact": "0300-1234567" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create company failed: {body}");
        let company_id = body["company"]["id"].as_str().unwrap().to_string();

        let admin = self.super_admin().await;
        let (status, _) = self
            .post(&format!("/api/v1/companies/{company_id}/approve"), Some(&admin), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);

        (token, company_id)
    }

    /// Registers a shop owner and approves their shop. Returns the token.
    pub async fn active_shop_owner(&self, email: &str) -> String {
        let token = self.register_shop_owner(email, "Corner Store").await;
        let admin = self.super_admin().await;

        let (_, body) = self.get("/api/v1/shops", &admin).await;
        let shop_id = body["shops"]
            .as_array()
            .unwrap()
            .iter()
            .find(|shop| shop["ownerEmail"] == email)
            .and_then(|shop| shop["id"].as_str())
            .unwrap()
            .to_string();

        let (status, _) = self
            .patch(
                &format!("/api/v1/shops/{shop_id}/status"),
                &admin,
                json!({ "status": "active" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        token
    }

    /// Creates a product for the admin's company and returns its id.
    pub async fn create_product(&self, token: &str, sku: &str, price_cents: i64) -> String {
        let (status, body) = self
            .post(
                "/api/v1/products",
                Some(token),
                json!({
                    "name": format!("Product {sku}"),
                    "sku": sku,
                    "priceCents": price_cents,
                    "warehouseStock": 500
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product failed: {body}");
        body["product"]["id"].as_str().unwrap().to_string()
    }
}
