//! Checkout against the fake API: local validation, wallet debits, and the
//! order request.

#![allow(clippy::unwrap_used)]

use quickpick_api::{ApiError, Restored, Route, SessionStore};
use quickpick_core::{AddressId, Delivery, Money, PaymentMethod, ProductId};
use quickpick_integration_tests::{FakeApi, Method, StatusCode, TOKEN, fixtures};
use quickpick_storefront::{
    AddressChoice, AppliedPromotion, CheckoutError, CheckoutForm, Storefront,
};
use serde_json::json;

/// A started storefront with `p1` (10.00, 5 in stock) and a default
/// address `a1` on file.
async fn shop_with_balance(api: &FakeApi, balance: f64) -> Storefront {
    let store = api.signed_in(fixtures::user("u1", false, balance));
    api.on(Method::GET, "wallet/balance", json!({ "balance": balance }))
        .on(Method::GET, "products/p1", fixtures::product("p1", 10.0, 5))
        .on(Method::GET, "user/addresses", json!([fixtures::address("a1", true)]));

    let shop = Storefront::with_store(api.config(), store).unwrap();
    assert!(matches!(shop.start().await, Restored::Active(_)));
    shop.addresses().load().await.unwrap();
    shop
}

async fn fill_cart(shop: &Storefront, quantity: u32) {
    let product = shop.catalog().product(&ProductId::new("p1")).await.unwrap();
    shop.cart().add(&product, quantity).await.unwrap();
}

fn form(payment: PaymentMethod) -> CheckoutForm {
    CheckoutForm {
        address: Some(AddressChoice::Saved(AddressId::new("a1"))),
        delivery: Delivery::instant(),
        payment: Some(payment),
        ..CheckoutForm::default()
    }
}

#[tokio::test]
async fn test_empty_cart_sends_no_order() {
    let api = FakeApi::start().await;
    let shop = shop_with_balance(&api, 100.0).await;

    let err = shop
        .checkout()
        .submit(&form(PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(api.requests_to(&Method::POST, "orders").is_empty());
}

#[tokio::test]
async fn test_insufficient_wallet_blocks_submission() {
    let api = FakeApi::start().await;
    let shop = shop_with_balance(&api, 5.0).await;
    fill_cart(&shop, 1).await;

    let err = shop
        .checkout()
        .submit(&form(PaymentMethod::Wallet))
        .await
        .unwrap_err();

    match err {
        CheckoutError::InsufficientBalance { balance, required } => {
            assert_eq!(balance, Money::from_cents(500));
            assert_eq!(required, Money::from_cents(1489));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
    assert!(api.requests_to(&Method::POST, "orders").is_empty());
    assert_eq!(shop.wallet().balance().await, Money::from_cents(500));
}

#[tokio::test]
async fn test_cash_order_clears_cart_and_confirms() {
    let api = FakeApi::start().await;
    let shop = shop_with_balance(&api, 0.0).await;
    api.on(
        Method::POST,
        "orders",
        json!({ "order": fixtures::order("o1", "pending", "cash", 27.88) }),
    );
    fill_cart(&shop, 2).await;

    let route = shop
        .checkout()
        .submit(&form(PaymentMethod::Cash))
        .await
        .unwrap();

    let Route::OrderConfirmation(order) = route else {
        panic!("expected the confirmation route");
    };
    assert_eq!(order.id.as_str(), "o1");
    assert!(shop.cart().is_empty().await);

    let sent = api.requests_to(&Method::POST, "orders");
    assert_eq!(sent.len(), 1);
    let request = sent.first().unwrap();
    let body = &request.body;
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {TOKEN}").as_str())
    );
    assert_eq!(body["payment_method"], "cash");
    assert_eq!(body["address_id"], "a1");
    assert_eq!(body["items"][0]["product_id"], "p1");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert!((body["total"].as_f64().unwrap() - 27.88).abs() < 1e-9);
    assert_eq!(body["shipping_address"]["city"], "Cairo");
}

#[tokio::test]
async fn test_rejected_wallet_order_restores_balance() {
    let api = FakeApi::start().await;
    let shop = shop_with_balance(&api, 50.0).await;
    api.on_status(
        Method::POST,
        "orders",
        StatusCode::BAD_REQUEST,
        json!({ "message": "Product p1 is out of stock" }),
    );
    fill_cart(&shop, 1).await;

    let err = shop
        .checkout()
        .submit(&form(PaymentMethod::Wallet))
        .await
        .unwrap_err();

    match err {
        CheckoutError::Api(ApiError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Product p1 is out of stock");
        }
        other => panic!("expected an API rejection, got {other:?}"),
    }
    assert_eq!(shop.wallet().balance().await, Money::from_cents(5000));
    assert!(!shop.cart().is_empty().await);
}

#[tokio::test]
async fn test_expired_session_on_submit_signs_out() {
    let api = FakeApi::start().await;
    let store = api.signed_in(fixtures::user("u1", false, 0.0));
    api.on(Method::GET, "wallet/balance", json!({ "balance": 0 }))
        .on(Method::GET, "products/p1", fixtures::product("p1", 10.0, 5))
        .on(Method::GET, "user/addresses", json!([fixtures::address("a1", true)]))
        .on_status(
            Method::POST,
            "orders",
            StatusCode::UNAUTHORIZED,
            json!({ "message": "jwt expired" }),
        );

    let shop = Storefront::with_store(api.config(), store.clone()).unwrap();
    shop.start().await;
    shop.addresses().load().await.unwrap();
    fill_cart(&shop, 1).await;

    let err = shop
        .checkout()
        .submit(&form(PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert_eq!(err.redirect(), Some(&Route::Login));
    assert!(!shop.session().is_authenticated().await);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_fully_discounted_wallet_order_is_placed() {
    let api = FakeApi::start().await;
    let shop = shop_with_balance(&api, 0.0).await;
    api.on(
        Method::POST,
        "orders",
        json!({ "order": fixtures::order("o2", "pending", "wallet", 0.0) }),
    );
    fill_cart(&shop, 1).await;

    let free = CheckoutForm {
        promotion: Some(AppliedPromotion {
            code: "FREE100".to_owned(),
            discount: "100".parse().unwrap(),
        }),
        ..form(PaymentMethod::Wallet)
    };
    let route = shop.checkout().submit(&free).await.unwrap();

    assert!(matches!(route, Route::OrderConfirmation(ref order) if order.id.as_str() == "o2"));
    let sent = api.requests_to(&Method::POST, "orders");
    assert_eq!(sent.len(), 1);
    let body = &sent.first().unwrap().body;
    assert_eq!(body["payment_method"], "wallet");
    assert_eq!(body["promo_code"], "FREE100");
    assert!(body["total"].as_f64().unwrap().abs() < 1e-9);
    assert_eq!(shop.wallet().balance().await, Money::ZERO);
    assert!(shop.wallet().transactions().await.is_empty());
}
