#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use subscription_backend::{
    build_router,
    config::Config,
    error::{Error, Result},
    services::billing_service::{
        BillingProvider, CheckoutRequest, HostedSession, NewCustomer, PortalRequest,
    },
    utils::webhook_signature,
    AppState,
};
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test";
pub const ADMIN_KEY: &str = "admin-test-key";

#[derive(Debug, Clone, PartialEq)]
pub enum BillingCall {
    Customer(NewCustomer),
    Checkout(CheckoutRequest),
    Portal(PortalRequest),
}

/// In-process billing provider that hands out sequential ids and records calls.
#[derive(Default)]
pub struct FakeBilling {
    calls: Mutex<Vec<BillingCall>>,
    fail_customers: AtomicBool,
}

impl FakeBilling {
    /// Makes every later `create_customer` call fail like an unreachable provider.
    pub fn fail_customer_creation(&self) {
        self.fail_customers.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BillingCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BillingCall) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn create_customer(&self, customer: NewCustomer) -> Result<String> {
        let n = self.record(BillingCall::Customer(customer));
        if self.fail_customers.load(Ordering::SeqCst) {
            return Err(Error::Upstream("card processor unavailable".into()));
        }
        Ok(format!("cus_{}", n))
    }

    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<HostedSession> {
        let n = self.record(BillingCall::Checkout(request));
        Ok(HostedSession {
            id: format!("cs_{}", n),
            url: format!("https://checkout.stripe.test/cs_{}", n),
        })
    }

    async fn create_portal_session(&self, request: PortalRequest) -> Result<HostedSession> {
        let n = self.record(BillingCall::Portal(request));
        Ok(HostedSession {
            id: format!("bps_{}", n),
            url: format!("https://billing.stripe.test/bps_{}", n),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        jwt_secret: "test_secret_key".into(),
        token_ttl_hours: 24,
        stripe_secret_key: "sk_test".into(),
        stripe_webhook_secret: WEBHOOK_SECRET.into(),
        stripe_price_id: "price_monthly".into(),
        stripe_api_base: "http://127.0.0.1:9".into(),
        public_url: "https://app.example.com".into(),
        trial_days: 14,
        plan_price: Decimal::new(999, 2),
        admin_api_key: Some(ADMIN_KEY.into()),
        static_dir: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub billing: Arc<FakeBilling>,
}

impl TestApp {
    pub fn new() -> Self {
        let billing = Arc::new(FakeBilling::default());
        let state = AppState::new(test_config(), billing.clone());
        let router = build_router(state.clone());
        Self {
            router,
            state,
            billing,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, JsonValue) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, body: JsonValue, token: Option<&str>) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Signs up a user and returns `(token, customer_id)`.
    pub async fn signup(&self, email: &str, name: &str) -> (String, String) {
        let (status, body) = self
            .post_json(
                "/api/signup",
                serde_json::json!({ "email": email, "password": "hunter2hunter2", "name": name }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        let token = body["token"].as_str().unwrap().to_string();
        let customer_id = self
            .state
            .users
            .get(email)
            .await
            .and_then(|u| u.customer_id)
            .unwrap();
        (token, customer_id)
    }

    pub async fn deliver_webhook(&self, event: &JsonValue) -> (StatusCode, JsonValue) {
        let payload = event.to_string();
        let header = webhook_signature::sign(
            WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
            payload.as_bytes(),
        );
        let req = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("stripe-signature", header)
            .body(Body::from(payload))
            .unwrap();
        self.send(req).await
    }
}

pub fn subscription_event(kind: &str, customer: &str, sub_id: &str, status: &str, trial_end: Option<i64>) -> JsonValue {
    serde_json::json!({
        "id": format!("evt_{}_{}", kind, sub_id),
        "type": kind,
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": {
            "id": sub_id,
            "object": "subscription",
            "customer": customer,
            "status": status,
            "trial_end": trial_end,
        }}
    })
}

pub fn invoice_event(kind: &str, customer: &str) -> JsonValue {
    serde_json::json!({
        "id": format!("evt_{}_{}", kind, customer),
        "type": kind,
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": {
            "id": "in_123",
            "object": "invoice",
            "customer": customer,
            "subscription": "sub_123",
        }}
    })
}
