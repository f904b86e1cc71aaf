mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_company_approval_lifecycle() {
    let app = TestApp::new().await;
    let boss = app.register_company_admin("boss@supplier.test").await;
    let owner = app.register_shop_owner("owner@shop.test", "Corner Store").await;
    let admin = app.super_admin().await;

    let (status, body) = app.get("/api/v1/companies/me", &boss).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["company"].is_null());

    let (status, body) = app
        .post("/api/v1/companies", Some(&boss), json!({ "name": "  Acme Foods " }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["company"]["name"], "Acme Foods");
    assert_eq!(body["company"]["status"], "pending");
    let id = body["company"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.get("/api/v1/companies/me", &boss).await;
    assert_eq!(body["company"]["id"], id.as_str());

    // Pending companies are invisible to other tenants.
    let (_, body) = app.get("/api/v1/companies/public", &owner).await;
    assert!(body["companies"].as_array().unwrap().is_empty());
    let (status, body) = app
        .get(&format!("/api/v1/companies/{id}/public"), &owner)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Company not found");

    let (status, body) = app
        .post(&format!("/api/v1/companies/{id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["status"], "active");

    let (_, body) = app.get("/api/v1/companies/public", &owner).await;
    assert_eq!(body["companies"].as_array().unwrap().len(), 1);
    let (status, _) = app
        .get(&format!("/api/v1/companies/{id}/public"), &owner)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .patch(
            &format!("/api/v1/companies/{id}/status"),
            &admin,
            json!({ "status": "inactive" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["status"], "inactive");
    let (status, _) = app
        .get(&format!("/api/v1/companies/{id}/products/public"), &owner)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_company_administration_is_super_admin_only() {
    let app = TestApp::new().await;
    let (boss, company_id) = app.active_company("boss@supplier.test", "Acme").await;
    app.register_company_admin("other@supplier.test").await;
    let other = app.login("other@supplier.test").await;
    app.post("/api/v1/companies", Some(&other), json!({ "name": "Beta" }))
        .await;
    let admin = app.super_admin().await;

    let (status, body) = app.get("/api/v1/companies", &boss).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    let (status, _) = app
        .post(&format!("/api/v1/companies/{company_id}/approve"), Some(&boss), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get("/api/v1/companies", &admin).await;
    let names: Vec<&str> = body["companies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Beta", "Acme"]);

    let (_, body) = app.get("/api/v1/companies?status=pending", &admin).await;
    assert_eq!(body["companies"].as_array().unwrap().len(), 1);
    assert_eq!(body["companies"][0]["name"], "Beta");

    let (status, body) = app.get("/api/v1/companies?status=archived", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid status");

    let (status, _) = app
        .patch(
            &format!("/api/v1/companies/{company_id}/status"),
            &admin,
            json!({ "status": "archived" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/companies/00000000-0000-4000-8000-000000000000/approve",
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Super admins do not trade.
    let (status, _) = app
        .post("/api/v1/companies", Some(&admin), json!({ "name": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_shop_status_syncs_owner() {
    let app = TestApp::new().await;
    let owner = app.active_shop_owner("owner@shop.test").await;

    let (_, body) = app.get("/api/v1/auth/me", &owner).await;
    assert_eq!(body["user"]["shopStatus"], "active");

    let admin = app.super_admin().await;
    let (_, body) = app.get("/api/v1/shops", &admin).await;
    let shop_id = body["shops"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .patch(
            &format!("/api/v1/shops/{shop_id}/status"),
            &admin,
            json!({ "status": "inactive" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shop"]["id"], shop_id.as_str());
    assert_eq!(body["shop"]["name"], "Corner Store");
    assert_eq!(body["shop"]["status"], "inactive");

    let (_, body) = app.get("/api/v1/auth/me", &owner).await;
    assert_eq!(body["user"]["shopStatus"], "inactive");

    let (status, _) = app.get("/api/v1/shops", &owner).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_products_need_an_active_company() {
    let app = TestApp::new().await;
    let boss = app.register_company_admin("boss@supplier.test").await;

    let product = json!({ "name": "Rice", "sku": "RICE-5", "priceCents": 1250, "warehouseStock": 10 });

    let (status, body) = app.post("/api/v1/products", Some(&boss), product.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No active company found for user");

    app.post("/api/v1/companies", Some(&boss), json!({ "name": "Acme" }))
        .await;
    let (status, body) = app.post("/api/v1/products", Some(&boss), product).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No active company found for user");
}

#[tokio::test]
async fn test_product_catalogue() {
    let app = TestApp::new().await;
    let (boss, company_id) = app.active_company("boss@supplier.test", "Acme").await;
    let owner = app.active_shop_owner("owner@shop.test").await;

    let (status, body) = app
        .post(
            "/api/v1/products",
            Some(&boss),
            json!({
                "name": "Basmati Rice 5kg",
                "SKU": "RICE-5",
                "priceCents": 1250,
                "warehouseStock": 400,
                "expiryDate": "2027-01-31"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["sku"], "RICE-5");
    assert_eq!(body["product"]["companyId"], company_id.as_str());
    assert_eq!(body["product"]["expiryDate"], "2027-01-31");
    let rice = body["product"]["id"].as_str().unwrap().to_string();

    app.create_product(&boss, "OIL-1", 899).await;

    let (status, body) = app
        .post(
            "/api/v1/products",
            Some(&boss),
            json!({ "name": "Copy", "sku": "RICE-5", "priceCents": 1, "warehouseStock": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "SKU already exists for this company");

    let (status, body) = app
        .post("/api/v1/products", Some(&boss), json!({ "name": "No sku" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name, SKU, price, warehouseStock are required");

    let (_, body) = app.get("/api/v1/products", &boss).await;
    let skus: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sku"].as_str().unwrap())
        .collect();
    assert_eq!(skus, ["OIL-1", "RICE-5"]);

    let (status, body) = app
        .patch(
            &format!("/api/v1/products/{rice}"),
            &boss,
            json!({ "priceCents": 1400, "warehouseStock": 350 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["priceCents"], 1400);
    assert_eq!(body["product"]["warehouseStock"], 350);
    assert_eq!(body["product"]["name"], "Basmati Rice 5kg");

    let (status, _) = app
        .patch(&format!("/api/v1/products/{rice}"), &boss, json!({ "sku": "OIL-1" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .patch(&format!("/api/v1/products/{rice}"), &boss, json!({ "priceCents": -5 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Shop owners browse; they do not manage.
    let (status, body) = app
        .get(&format!("/api/v1/companies/{company_id}/products/public"), &owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    let (status, _) = app.get("/api/v1/products", &owner).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_products_are_company_scoped() {
    let app = TestApp::new().await;
    let (acme, _) = app.active_company("boss@acme.test", "Acme").await;
    let (beta, _) = app.active_company("boss@beta.test", "Beta").await;

    let rice = app.create_product(&acme, "RICE-5", 1250).await;
    // The same SKU is fine in another company.
    app.create_product(&beta, "RICE-5", 1300).await;

    let (_, body) = app.get("/api/v1/products", &beta).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["products"][0]["priceCents"], 1300);

    let (status, body) = app
        .patch(&format!("/api/v1/products/{rice}"), &beta, json!({ "priceCents": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}
