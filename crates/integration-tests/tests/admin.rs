//! Back-office client against the fake API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use quickpick_admin::{AdminClient, AdminError, OrderFilter};
use quickpick_api::{ApiError, Credentials, MemorySessionStore, Restored, Route, SessionStore};
use quickpick_core::{OrderId, OrderStatus, PaymentStatus, UserId};
use quickpick_integration_tests::{FakeApi, Method, StatusCode, TOKEN, fixtures};
use serde_json::json;

async fn signed_in_admin(api: &FakeApi) -> AdminClient {
    let store = api.signed_in(fixtures::user("admin1", true, 0.0));
    let admin = AdminClient::with_store(&api.config(), store).unwrap();
    assert!(matches!(admin.restore().await, Restored::Active(_)));
    admin
}

#[tokio::test]
async fn test_login_refuses_customer_accounts() {
    let api = FakeApi::start().await;
    api.on(
        Method::POST,
        "auth/login",
        json!({ "token": TOKEN, "user": fixtures::user("u1", false, 0.0) }),
    );
    let store = Arc::new(MemorySessionStore::new());
    let admin = AdminClient::with_store(&api.config(), store.clone()).unwrap();

    let credentials = Credentials::parse("u1@example.com", "secret1").unwrap();
    let err = admin.login(&credentials).await.unwrap_err();

    assert!(matches!(err, AdminError::NotAdmin));
    assert_eq!(err.redirect(), Some(&Route::AdminLogin));
    assert!(store.load().unwrap().is_none());
    assert!(admin.current_user().await.is_none());
}

#[tokio::test]
async fn test_restore_drops_demoted_admin() {
    let api = FakeApi::start().await;
    let store = api.signed_in(fixtures::user("u1", false, 0.0));
    let admin = AdminClient::with_store(&api.config(), store.clone()).unwrap();

    assert_eq!(admin.restore().await, Restored::SignedOut(Route::AdminLogin));
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_expired_admin_session_redirects_to_admin_login() {
    let api = FakeApi::start().await;
    let admin = signed_in_admin(&api).await;
    api.on_status(
        Method::GET,
        "orders",
        StatusCode::UNAUTHORIZED,
        json!({ "message": "Token expired" }),
    );

    let err = admin.get_orders(&OrderFilter::default()).await.unwrap_err();

    assert_eq!(err.redirect(), Some(&Route::AdminLogin));
    assert!(admin.current_user().await.is_none());
}

#[tokio::test]
async fn test_order_filters_and_status_update() {
    let api = FakeApi::start().await;
    let admin = signed_in_admin(&api).await;
    api.on(
        Method::GET,
        "orders",
        json!([fixtures::order("o1", "pending", "cash", 27.88)]),
    )
    .on(
        Method::PUT,
        "orders/o1/status",
        fixtures::order("o1", "shipped", "cash", 27.88),
    );

    let filter = OrderFilter {
        status: Some(OrderStatus::Pending),
        ..OrderFilter::default()
    };
    let orders = admin.get_orders(&filter).await.unwrap();
    let order = orders.first().unwrap();
    assert_eq!(
        api.requests_to(&Method::GET, "orders")
            .first()
            .unwrap()
            .query
            .as_deref(),
        Some("status=pending")
    );

    let updated = admin
        .update_order_status(order, OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Shipped);
    let sent = api.requests_to(&Method::PUT, "orders/o1/status");
    assert_eq!(sent.first().unwrap().body, json!({ "status": "shipped" }));
}

#[tokio::test]
async fn test_final_orders_are_not_sent() {
    let api = FakeApi::start().await;
    let admin = signed_in_admin(&api).await;
    api.on(
        Method::GET,
        "orders/o9",
        fixtures::order("o9", "delivered", "card", 12.0),
    );

    let order = admin.get_order(&OrderId::new("o9")).await.unwrap();
    let err = admin
        .update_order_status(&order, OrderStatus::Pending)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Api(ApiError::Validation(_))));
    assert!(api.requests_to(&Method::PUT, "orders/o9/status").is_empty());
}

#[tokio::test]
async fn test_payment_status_update() {
    let api = FakeApi::start().await;
    let admin = signed_in_admin(&api).await;
    api.on(
        Method::PUT,
        "orders/o1/payment-status",
        fixtures::order("o1", "pending", "card", 27.88),
    );

    admin
        .update_payment_status(&OrderId::new("o1"), PaymentStatus::Paid)
        .await
        .unwrap();

    let sent = api.requests_to(&Method::PUT, "orders/o1/payment-status");
    assert_eq!(sent.first().unwrap().body, json!({ "payment_status": "paid" }));
}

#[tokio::test]
async fn test_toggle_admin_flips_flag_but_not_for_self() {
    let api = FakeApi::start().await;
    let admin = signed_in_admin(&api).await;
    api.on(Method::PUT, "users/u1/admin", fixtures::user("u1", true, 0.0));

    let customer = serde_json::from_value(fixtures::user("u1", false, 0.0)).unwrap();
    let promoted = admin.toggle_admin(&customer).await.unwrap();
    assert!(promoted.is_admin);
    let sent = api.requests_to(&Method::PUT, "users/u1/admin");
    assert_eq!(sent.first().unwrap().body, json!({ "is_admin": true }));

    let me = admin.current_user().await.unwrap();
    assert!(admin.toggle_admin(&me).await.is_err());
    assert!(admin.delete_user(&UserId::new("admin1")).await.is_err());
    assert!(api.requests_to(&Method::PUT, "users/admin1/admin").is_empty());
    assert!(api.requests_to(&Method::DELETE, "users/admin1").is_empty());
}
