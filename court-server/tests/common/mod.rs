//! Shared helpers for router-level tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use court_server::auth::Role;
use court_server::{Config, OrderStorage, ServerState, build_router};
use shared::models::{Cart, CartItem, Vendor};

pub const COURT: &str = "court-1";

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
    _dir: tempfile::TempDir,
}

/// In-memory store, default charge rates (18 % / 5 % / ₹5)
pub fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config =
        Config::with_overrides(dir.path().to_string_lossy().to_string(), 0).expect("config");
    config.tax_rate = 0.18;
    config.service_charge_rate = 0.05;
    config.platform_charge = 5.0;
    config.timezone = "Asia/Kolkata".to_string();

    let storage = OrderStorage::open_in_memory().expect("in-memory store");
    let state = ServerState::new(config, storage).expect("state");
    let router = build_router(state.clone());
    TestApp {
        state,
        router,
        _dir: dir,
    }
}

impl TestApp {
    pub fn customer_token(&self, user_id: &str) -> String {
        self.state
            .get_jwt_service()
            .generate_token(user_id, Role::Customer, None, Some(COURT))
            .expect("token")
    }

    pub fn vendor_token(&self, vendor_id: &str) -> String {
        self.state
            .get_jwt_service()
            .generate_token(&format!("staff-{}", vendor_id), Role::Vendor, Some(vendor_id), Some(COURT))
            .expect("token")
    }

    pub fn seed_vendor(&self, id: &str) {
        self.state
            .orders
            .storage()
            .put_vendor(&Vendor {
                id: id.to_string(),
                court_id: COURT.to_string(),
                name: format!("Vendor {}", id),
                is_active: true,
                estimated_preparation_time: Some(10),
            })
            .expect("seed vendor");
    }

    pub fn seed_cart(&self, user_id: &str, items: &[(&str, &str, f64, u32)]) {
        let items = items
            .iter()
            .map(|(vendor_id, name, unit_price, quantity)| CartItem {
                vendor_id: vendor_id.to_string(),
                menu_item_id: format!("{}-{}", vendor_id, name),
                name: name.to_string(),
                unit_price: *unit_price,
                quantity: *quantity,
                customizations: vec![],
            })
            .collect();
        self.state
            .orders
            .storage()
            .put_cart(&Cart {
                user_id: user_id.to_string(),
                court_id: COURT.to_string(),
                items,
            })
            .expect("seed cart");
    }

    /// Send a request through the full middleware stack
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.dispatch(builder.body(body).expect("request")).await
    }

    /// Send a raw JSON-typed body, valid or not
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Checkout for `user_id` and return the response body
    pub async fn checkout(&self, user_id: &str) -> Value {
        let token = self.customer_token(user_id);
        let (status, body) = self
            .send(
                Method::POST,
                "/api/checkout",
                Some(&token),
                Some(serde_json::json!({ "paymentMethod": "upi" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {}", body);
        body
    }

    /// Sub-order id of `vendor_id` in a checkout response
    pub fn order_for(checkout: &Value, vendor_id: &str) -> String {
        checkout["orders"]
            .as_array()
            .expect("orders")
            .iter()
            .find(|o| o["vendorId"] == vendor_id)
            .and_then(|o| o["id"].as_str())
            .expect("order for vendor")
            .to_string()
    }
}
