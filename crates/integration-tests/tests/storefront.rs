//! Wallet, catalog, address book and account against the fake API.

#![allow(clippy::unwrap_used)]

use quickpick_api::ApiError;
use quickpick_core::{AddressId, CategoryId, Money, ProductQuery, TransactionKind};
use quickpick_integration_tests::{FakeApi, Method, StatusCode, fixtures};
use quickpick_storefront::{ProfileUpdate, Storefront, WalletError};
use serde_json::json;

async fn started(api: &FakeApi, balance: f64) -> Storefront {
    let store = api.signed_in(fixtures::user("u1", false, balance));
    api.on(Method::GET, "wallet/balance", json!({ "balance": balance }));
    let shop = Storefront::with_store(api.config(), store).unwrap();
    shop.start().await;
    shop
}

#[tokio::test]
async fn test_add_funds_takes_server_balance() {
    let api = FakeApi::start().await;
    let shop = started(&api, 50.0).await;
    // The server is authoritative even when its arithmetic differs.
    api.on(Method::POST, "wallet/add", json!({ "balance": 74.5 }));

    let balance = shop
        .wallet()
        .add_funds(Money::from_cents(2500))
        .await
        .unwrap();

    assert_eq!(balance, Money::from_cents(7450));
    assert_eq!(shop.wallet().balance().await, Money::from_cents(7450));
    let log = shop.wallet().transactions().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log.first().unwrap().kind, TransactionKind::Deposit);

    let sent = api.requests_to(&Method::POST, "wallet/add");
    assert!((sent.first().unwrap().body["amount"].as_f64().unwrap() - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_withdraw_rejected_by_server_keeps_balance() {
    let api = FakeApi::start().await;
    let shop = started(&api, 10.0).await;
    api.on_status(
        Method::POST,
        "wallet/withdraw",
        StatusCode::BAD_REQUEST,
        json!({ "message": "Insufficient balance" }),
    );

    let err = shop
        .wallet()
        .withdraw_funds(Money::from_cents(2000))
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::Api(ApiError::Api { status: 400, .. })));
    assert_eq!(shop.wallet().balance().await, Money::from_cents(1000));
    assert!(shop.wallet().transactions().await.is_empty());
}

#[tokio::test]
async fn test_non_positive_amount_sends_nothing() {
    let api = FakeApi::start().await;
    let shop = started(&api, 10.0).await;

    let err = shop.wallet().add_funds(Money::ZERO).await.unwrap_err();

    assert!(matches!(err, WalletError::InvalidAmount(_)));
    assert!(api.requests_to(&Method::POST, "wallet/add").is_empty());
}

#[tokio::test]
async fn test_categories_are_cached_and_hidden_ones_dropped() {
    let api = FakeApi::start().await;
    api.on(
        Method::GET,
        "categories",
        json!([fixtures::category("c1", true), fixtures::category("c2", false)]),
    )
    .on(Method::GET, "categories/c2", fixtures::category("c2", false));
    let shop = started(&api, 0.0).await;

    let first = shop.catalog().categories().await.unwrap();
    let second = shop.catalog().categories().await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert_eq!(api.requests_to(&Method::GET, "categories").len(), 1);

    let hidden = shop.catalog().category(&CategoryId::new("c2")).await;
    assert!(matches!(hidden, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_search_results_are_not_cached() {
    let api = FakeApi::start().await;
    api.on(
        Method::GET,
        "products",
        json!({ "products": [fixtures::product("p1", 2.0, 3)], "page": 1, "totalPages": 4 }),
    );
    let shop = started(&api, 0.0).await;
    let search = ProductQuery {
        search: Some("milk".to_owned()),
        ..ProductQuery::default()
    };

    shop.catalog().products(&search).await.unwrap();
    let page = shop.catalog().products(&search).await.unwrap();

    assert_eq!(page.pages, Some(4));
    let sent = api.requests_to(&Method::GET, "products");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent.first().unwrap().query.as_deref(), Some("search=milk"));

    shop.catalog().products(&ProductQuery::default()).await.unwrap();
    shop.catalog().products(&ProductQuery::default()).await.unwrap();
    assert_eq!(api.requests_to(&Method::GET, "products").len(), 3);
}

#[tokio::test]
async fn test_address_book_selects_default_and_encodes_ids() {
    let api = FakeApi::start().await;
    api.on(
        Method::GET,
        "user/addresses",
        json!([fixtures::address("a1", false), fixtures::address("a 2", true)]),
    )
    .on(Method::DELETE, "user/addresses/a%202", json!(null));
    let shop = started(&api, 0.0).await;

    shop.addresses().load().await.unwrap();
    assert_eq!(
        shop.addresses().selected().await.unwrap().id,
        AddressId::new("a 2")
    );

    shop.addresses().remove(&AddressId::new("a 2")).await.unwrap();
    assert!(shop.addresses().find(&AddressId::new("a 2")).await.is_none());
}

#[tokio::test]
async fn test_profile_update_replaces_cached_user() {
    let api = FakeApi::start().await;
    let shop = started(&api, 0.0).await;
    let mut renamed = fixtures::user("u1", false, 0.0);
    renamed["name"] = json!("Hana A.");
    api.on(Method::PUT, "user/profile", renamed);

    let update = ProfileUpdate {
        name: Some("Hana A.".to_owned()),
        ..ProfileUpdate::default()
    };
    shop.account().update_profile(&update).await.unwrap();

    assert_eq!(shop.session().current_user().await.unwrap().name, "Hana A.");
    let sent = api.requests_to(&Method::PUT, "user/profile");
    assert_eq!(sent.first().unwrap().body, json!({ "name": "Hana A." }));
}

#[tokio::test]
async fn test_expired_session_forgets_per_user_state() {
    let api = FakeApi::start().await;
    api.on(
        Method::GET,
        "user/addresses",
        json!([fixtures::address("a1", true)]),
    );
    let shop = started(&api, 35.0).await;
    shop.addresses().load().await.unwrap();
    assert_eq!(shop.wallet().balance().await, Money::from_cents(3500));
    assert!(shop.addresses().selected().await.is_some());

    api.on_status(
        Method::GET,
        "wallet/balance",
        StatusCode::UNAUTHORIZED,
        json!({ "message": "jwt expired" }),
    );
    let err = shop.wallet().refresh().await.unwrap_err();

    assert!(matches!(err, WalletError::Api(ApiError::Unauthorized { .. })));
    assert!(!shop.session().is_authenticated().await);
    assert_eq!(shop.wallet().balance().await, Money::ZERO);
    assert!(shop.addresses().all().await.is_empty());
    assert!(shop.addresses().selected().await.is_none());
    assert!(shop.payment_methods().all().await.is_empty());
}
