use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use order_fulfillment_engine::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, StoreId},
    events::EventProducers,
    helpers::calculate_signature,
    OrderFlowApi,
};
use serde_json::json;

use crate::{
    auth::TokenVerifier,
    endpoint_tests::{
        helpers::{issue_token, test_auth_config, test_gateway_config, TEST_GATEWAY_SECRET},
        mocks::MockBackend,
    },
    routes::verify_payment,
};

/// Materialises the `Order` the mock claims to have stored for a given `NewOrder`.
fn stored(order: NewOrder, store_id: &StoreId) -> Order {
    let total = order.total();
    Order {
        id: 1,
        order_id: OrderId::generate(),
        customer: order.customer,
        store_id: store_id.clone(),
        items: order.items,
        payment_method: order.payment_method,
        payment_status: order.payment_status,
        razorpay_payment_id: Some(order.razorpay_payment_id),
        razorpay_order_id: Some(order.razorpay_order_id),
        address_id: order.address_id,
        shipping_address: None,
        status: OrderStatus::OrderPlaced,
        tracking_id: None,
        tracking_url: None,
        courier: None,
        shipping_fee: order.shipping_fee,
        total,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn post_confirmation(
    backend: MockBackend,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let api = OrderFlowApi::new(backend, EventProducers::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(test_gateway_config()))
            .app_data(web::Data::new(TokenVerifier::new(&test_auth_config())))
            .route("/api/payments/verify", web::post().to(verify_payment::<MockBackend>)),
    )
    .await;
    let req = TestRequest::post().uri("/api/payments/verify").set_json(body).to_request();
    let res = test::call_service(&app, req).await;
    let status = res.status();
    let body: serde_json::Value = test::read_body_json(res).await;
    (status, body)
}

fn confirmation_body(signature: &str, payload: serde_json::Value) -> serde_json::Value {
    json!({
        "razorpay_payment_id": "pay_123",
        "razorpay_order_id": "order_123",
        "razorpay_signature": signature,
        "paymentPayload": payload,
    })
}

fn guest_payload() -> serde_json::Value {
    json!({
        "items": [{ "id": "P1", "quantity": 2, "price": 59_900 }],
        "paymentMethod": "CARD",
        "shippingFee": 4_900,
        "guestInfo": { "name": "Asha Verma", "email": "asha@example.com", "phone": "9000000001" },
    })
}

#[actix_web::test]
async fn valid_confirmation_creates_an_order() {
    let mut backend = MockBackend::new();
    backend
        .expect_resolve_store_for_products()
        .withf(|ids| ids == ["P1".to_string()])
        .returning(|_| Ok(StoreId::from("store-1")));
    backend
        .expect_insert_order()
        .withf(|order, store| order.razorpay_payment_id == "pay_123" && store.as_str() == "store-1")
        .returning(|order, store| Ok((stored(order, store), true)));
    backend.expect_adjust_stock_for_order().returning(|_| Ok(Vec::new()));

    let signature = calculate_signature("order_123", "pay_123", TEST_GATEWAY_SECRET);
    let (status, body) = post_confirmation(backend, confirmation_body(&signature, guest_payload())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["orderId"].is_string());
    assert_eq!(body["orderId"], body["_id"]);
}

#[actix_web::test]
async fn tampered_signature_is_rejected_before_any_storage_call() {
    // no expectations: any storage call would panic the mock and fail the test
    let backend = MockBackend::new();
    let (status, body) =
        post_confirmation(backend, confirmation_body("definitely-not-a-signature", guest_payload())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payment verification failed");
}

#[actix_web::test]
async fn a_valid_token_wins_over_a_guest_block() {
    let mut backend = MockBackend::new();
    backend.expect_resolve_store_for_products().returning(|_| Ok(StoreId::from("store-1")));
    backend
        .expect_insert_order()
        .withf(|order, _| {
            order.customer.user_id().map(|u| u.as_str()) == Some("user-7") && order.customer.guest().is_none()
        })
        .returning(|order, store| Ok((stored(order, store), true)));
    backend.expect_adjust_stock_for_order().returning(|_| Ok(Vec::new()));

    let mut payload = guest_payload();
    payload["token"] = json!(issue_token("user-7"));
    let signature = calculate_signature("order_123", "pay_123", TEST_GATEWAY_SECRET);
    let (status, body) = post_confirmation(backend, confirmation_body(&signature, payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn an_unusable_token_degrades_to_guest_checkout() {
    let mut backend = MockBackend::new();
    backend.expect_resolve_store_for_products().returning(|_| Ok(StoreId::from("store-1")));
    backend
        .expect_insert_order()
        .withf(|order, _| order.customer.guest().map(|g| g.name.as_str()) == Some("Asha Verma"))
        .returning(|order, store| Ok((stored(order, store), true)));
    backend.expect_adjust_stock_for_order().returning(|_| Ok(Vec::new()));

    let mut payload = guest_payload();
    payload["token"] = json!("not-a-jwt");
    let signature = calculate_signature("order_123", "pay_123", TEST_GATEWAY_SECRET);
    let (status, body) = post_confirmation(backend, confirmation_body(&signature, payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn a_confirmation_without_any_identity_is_rejected() {
    let backend = MockBackend::new();
    let payload = json!({
        "items": [{ "id": "P1", "quantity": 1, "price": 59_900 }],
        "paymentMethod": "CARD",
        "shippingFee": 0,
    });
    let signature = calculate_signature("order_123", "pay_123", TEST_GATEWAY_SECRET);
    let (status, body) = post_confirmation(backend, confirmation_body(&signature, payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn replayed_confirmations_return_the_stored_order_without_new_side_effects() {
    let mut backend = MockBackend::new();
    backend.expect_resolve_store_for_products().returning(|_| Ok(StoreId::from("store-1")));
    // `false` marks the replay; the handler must not call adjust_stock_for_order (no expectation is set for it)
    backend.expect_insert_order().returning(|order, store| Ok((stored(order, store), false)));

    let signature = calculate_signature("order_123", "pay_123", TEST_GATEWAY_SECRET);
    let (status, body) = post_confirmation(backend, confirmation_body(&signature, guest_payload())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn negative_amounts_never_reach_storage() {
    let backend = MockBackend::new();
    let mut payload = guest_payload();
    payload["items"] = json!([{ "id": "P1", "quantity": 1, "price": -5 }]);
    let signature = calculate_signature("order_123", "pay_123", TEST_GATEWAY_SECRET);
    let (status, body) = post_confirmation(backend, confirmation_body(&signature, payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
