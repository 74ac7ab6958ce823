//! End-to-end flow through the HTTP router: session, profile,
//! recommendation, cart, checkout, delivery and the meal log back-fill.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use meal_server::cart::CartStore;
use meal_server::catalog::{RecipeApiError, RecipeQuery, RecipeSource};
use meal_server::core::build_app;
use meal_server::db::DbService;
use meal_server::{Config, ServerState};
use serde_json::{Value, json};
use shared::models::Meal;
use std::sync::Arc;
use std::time::Duration;

/// Recipe API that never answers with results
struct NoRecipes;

#[async_trait]
impl RecipeSource for NoRecipes {
    async fn search(&self, _query: &RecipeQuery) -> Result<Vec<Meal>, RecipeApiError> {
        Err(RecipeApiError::NotConfigured)
    }
}

struct TestApp {
    app: Router,
    state: ServerState,
    _dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env();
    config.work_dir = dir.path().to_string_lossy().into_owned();
    config.delivery_dwell_ms = [10; 4];
    config.payment_delay_ms = 0;

    let pool = DbService::in_memory().await.unwrap().pool;
    let cart_store = CartStore::open(config.cart_db_path()).unwrap();
    let state = ServerState::with_services(config, pool, cart_store, Arc::new(NoRecipes));
    TestApp {
        app: build_app(state.clone()),
        state,
        _dir: dir,
    }
}

impl TestApp {
    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = tower::ServiceExt::oneshot(self.app.clone(), request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn sign_in(&self, user_id: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/session",
                None,
                Some(json!({ "user_id": user_id, "display_name": "Ada" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = spawn_app().await;
    let (status, _) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .call("GET", "/api/cart", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recommendation_requires_complete_profile() {
    let app = spawn_app().await;
    let token = app.sign_in("u1").await;

    let (status, body) = app
        .call("GET", "/api/meals/recommendations", Some(&token), None)
        .await;
    assert!(status.is_client_error());
    assert_eq!(body["code"], 2002);

    let (status, body) = app
        .call(
            "PUT",
            "/api/profile",
            Some(&token),
            Some(json!({
                "name": "Ada",
                "age": 36,
                "height_cm": 180.0,
                "weight_kg": 75.0,
                "health_conditions": ["diabetes"],
                "allergies": []
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bmi"], 23.1);

    let (status, body) = app
        .call("GET", "/api/meals/recommendations", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["origin"], "catalog");
    let ids: Vec<&str> = body["data"]["meals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["m3"]);
}

#[tokio::test]
async fn test_checkout_delivery_and_backfill() {
    let app = spawn_app().await;
    let token = app.sign_in("u1").await;

    app.call(
        "POST",
        "/api/cart/items",
        Some(&token),
        Some(json!({ "meal_id": "m1", "quantity": 2 })),
    )
    .await;
    let (status, cart) = app
        .call(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "meal_id": "m2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["data"]["total_price"], "30.97");

    // 缺少卡信息: 购物车保持不变
    let (status, body) = app
        .call(
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({
                "delivery_address": "1 Main St",
                "payment": { "method": "credit_card" }
            })),
        )
        .await;
    assert!(status.is_client_error());
    assert_eq!(body["code"], 5004);

    let (status, body) = app
        .call(
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({
                "delivery_address": "1 Main St",
                "payment": {
                    "method": "credit_card",
                    "card": {
                        "card_number": "4242 4242 4242 4242",
                        "expiry": "12/30",
                        "cvc": "123",
                        "name_on_card": "Ada Lovelace"
                    }
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["total_price"], "36.96");
    assert_eq!(body["data"]["receipt"]["method_label"], "Credit Card");
    let order_id = body["data"]["order"]["id"].as_i64().unwrap();

    let (_, cart) = app.call("GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 0);

    // 等待配送模拟走完
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.tasks.running() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let (status, tracking) = app
        .call(
            "GET",
            &format!("/api/orders/{order_id}/tracking"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracking["data"]["status"], "delivered");
    assert_eq!(tracking["data"]["steps"].as_array().unwrap().len(), 5);

    let today = shared::util::today().format("%Y-%m-%d").to_string();
    let (_, log) = app
        .call(
            "GET",
            &format!("/api/meal-logs/date/{today}"),
            Some(&token),
            None,
        )
        .await;
    let types: Vec<&str> = log["data"]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["meal_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["breakfast", "lunch", "dinner"]);

    let (_, nutrition) = app
        .call(
            "GET",
            &format!("/api/meal-logs/date/{today}/nutrition"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(nutrition["data"]["entry_count"], 3);
    assert_eq!(nutrition["data"]["unknown_entries"], 0);

    let (_, orders) = app.call("GET", "/api/orders", Some(&token), None).await;
    assert_eq!(orders["data"][0]["id"], order_id);
}

#[tokio::test]
async fn test_checkout_rejects_blank_address_and_empty_cart() {
    let app = spawn_app().await;
    let token = app.sign_in("u1").await;
    let payment = json!({ "method": "digital_wallet" });

    let (_, body) = app
        .call(
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({ "delivery_address": "1 Main St", "payment": payment })),
        )
        .await;
    assert_eq!(body["code"], 3001);

    app.call(
        "POST",
        "/api/cart/items",
        Some(&token),
        Some(json!({ "meal_id": "m6" })),
    )
    .await;
    let (_, body) = app
        .call(
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({ "delivery_address": "   ", "payment": payment })),
        )
        .await;
    assert_eq!(body["code"], 4002);

    let (_, cart) = app.call("GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
