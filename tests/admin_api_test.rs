mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{invoice_event, subscription_event, TestApp, ADMIN_KEY};

fn stats_request(key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/admin/stats");
    if let Some(key) = key {
        builder = builder.header("x-admin-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn stats_require_admin_key() {
    let app = TestApp::new();

    let (status, body) = app.send(stats_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_admin_key");

    let (status, body) = app.send(stats_request(Some("guess"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_admin_key");
}

#[tokio::test]
async fn stats_count_statuses_and_revenue() {
    let app = TestApp::new();
    let (_, c1) = app.signup("r1@example.com", "R1").await;
    let (_, c2) = app.signup("r2@example.com", "R2").await;
    let (_, c3) = app.signup("r3@example.com", "R3").await;
    app.signup("r4@example.com", "R4").await;

    app.deliver_webhook(&invoice_event("invoice.payment_succeeded", &c1))
        .await;
    app.deliver_webhook(&invoice_event("invoice.payment_succeeded", &c2))
        .await;
    app.deliver_webhook(&subscription_event(
        "customer.subscription.created",
        &c3,
        "sub_r3",
        "trialing",
        None,
    ))
    .await;

    let (status, body) = app.send(stats_request(Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], 4);
    assert_eq!(body["active"], 2);
    assert_eq!(body["trialing"], 1);
    assert_eq!(body["none"], 1);
    assert_eq!(body["pastDue"], 0);
    assert_eq!(body["mrr"], "19.98");
}
