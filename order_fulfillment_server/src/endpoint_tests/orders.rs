use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use order_fulfillment_engine::{
    db_types::{OrderStatus, Store},
    events::EventProducers,
    FulfillmentApi,
};
use serde_json::json;

use crate::{
    auth::TokenVerifier,
    endpoint_tests::{
        helpers::{expired_token, issue_token, sample_order, test_auth_config},
        mocks::MockBackend,
    },
    routes::{delete_order, store_order_by_id, store_orders, update_address, update_order},
};

const ORDER_URL: &str = "/api/store/orders/64fe12ab34cd56ef78ab90cd";

fn seller_store() -> Store {
    Store { store_id: "store-1".into(), owner_user_id: "seller-1".into(), name: "Acme Outfitters".into() }
}

async fn call(backend: MockBackend, req: TestRequest) -> (StatusCode, serde_json::Value) {
    let api = FulfillmentApi::new(backend, EventProducers::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(TokenVerifier::new(&test_auth_config())))
            .service(
                web::scope("/api/store/orders")
                    .route("", web::get().to(store_orders::<MockBackend>))
                    .route("/{order_id}", web::get().to(store_order_by_id::<MockBackend>))
                    .route("/{order_id}", web::put().to(update_order::<MockBackend>))
                    .route("/{order_id}", web::delete().to(delete_order::<MockBackend>))
                    .route("/{order_id}/address", web::patch().to(update_address::<MockBackend>)),
            ),
    )
    .await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body: serde_json::Value = test::read_body_json(res).await;
    (status, body)
}

fn authorized(req: TestRequest) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", issue_token("seller-1"))))
}

#[actix_web::test]
async fn update_requires_a_bearer_token() {
    let (status, body) = call(MockBackend::new(), TestRequest::put().uri(ORDER_URL).set_json(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn expired_tokens_are_rejected() {
    let req = TestRequest::put()
        .uri(ORDER_URL)
        .insert_header(("Authorization", format!("Bearer {}", expired_token("seller-1"))))
        .set_json(json!({ "status": "SHIPPED" }));
    let (status, _) = call(MockBackend::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_user_without_a_store_is_forbidden() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(None));
    let req = authorized(TestRequest::put().uri(ORDER_URL)).set_json(json!({ "status": "SHIPPED" }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn sellers_can_update_status_and_tracking() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend
        .expect_fetch_order_for_store()
        .returning(|store, _| Ok(Some(sample_order(store.as_str(), OrderStatus::OrderPlaced))));
    backend
        .expect_update_order()
        .withf(|store, _, update| {
            store.as_str() == "store-1"
                && update.status == Some(OrderStatus::Shipped)
                && update.tracking_id.as_deref() == Some("AWB123")
        })
        .returning(|store, _, update| {
            let mut order = sample_order(store.as_str(), update.status.unwrap());
            order.tracking_id = update.tracking_id;
            order.courier = update.courier;
            Ok(Some(order))
        });
    let req = authorized(TestRequest::put().uri(ORDER_URL))
        .set_json(json!({ "status": "SHIPPED", "trackingId": "AWB123", "courier": "BlueDart" }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["status"], "SHIPPED");
    assert_eq!(body["order"]["trackingId"], "AWB123");
    assert_eq!(body["message"], "Order updated successfully");
}

#[actix_web::test]
async fn orders_of_other_stores_are_reported_as_missing() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    // the store-scoped lookup hides the foreign order; update_order must never run (no expectation set)
    backend.expect_fetch_order_for_store().returning(|_, _| Ok(None));
    let req = authorized(TestRequest::put().uri(ORDER_URL)).set_json(json!({ "status": "SHIPPED" }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The data was not found. Order not found or unauthorized");
}

#[actix_web::test]
async fn backward_transitions_are_rejected_without_a_write() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend
        .expect_fetch_order_for_store()
        .returning(|store, _| Ok(Some(sample_order(store.as_str(), OrderStatus::Shipped))));
    let req = authorized(TestRequest::put().uri(ORDER_URL)).set_json(json!({ "status": "PROCESSING" }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn unknown_patch_fields_are_ignored_not_applied() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend
        .expect_fetch_order_for_store()
        .returning(|store, _| Ok(Some(sample_order(store.as_str(), OrderStatus::OrderPlaced))));
    backend
        .expect_update_order()
        .withf(|_, _, update| update.status == Some(OrderStatus::Confirmed))
        .returning(|store, _, update| Ok(Some(sample_order(store.as_str(), update.status.unwrap()))));
    // `total` and `storeId` are not in the allow-list; serde drops them before the engine ever sees the patch
    let req = authorized(TestRequest::put().uri(ORDER_URL))
        .set_json(json!({ "status": "CONFIRMED", "total": 1, "storeId": "store-2" }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["storeId"], "store-1");
}

#[actix_web::test]
async fn address_updates_validate_the_required_subset() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    let req = authorized(TestRequest::patch().uri(&format!("{ORDER_URL}/address")))
        .set_json(json!({ "shippingAddress": { "street": "14 MG Road" } }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("street, city, and country"));
}

#[actix_web::test]
async fn address_updates_reach_storage_when_complete() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend
        .expect_fetch_order_by_id()
        .returning(|_| Ok(Some(sample_order("store-1", OrderStatus::OrderPlaced))));
    backend
        .expect_set_shipping_address()
        .withf(|store, _, address| store.as_str() == "store-1" && address.city == "Bengaluru")
        .returning(|store, _, address| {
            let mut order = sample_order(store.as_str(), OrderStatus::OrderPlaced);
            order.shipping_address = Some(address);
            Ok(Some(order))
        });
    let req = authorized(TestRequest::patch().uri(&format!("{ORDER_URL}/address"))).set_json(json!({
        "shippingAddress": { "street": "14 MG Road", "city": "Bengaluru", "country": "India" }
    }));
    let (status, body) = call(backend, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["shippingAddress"]["city"], "Bengaluru");
    assert_eq!(body["message"], "Shipping address added successfully");
}

#[actix_web::test]
async fn deletion_is_scoped_and_reports_missing_orders() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend.expect_delete_order().returning(|_, _| Ok(false));
    let (status, body) = call(backend, authorized(TestRequest::delete().uri(ORDER_URL))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn deletion_succeeds_for_the_owner() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend
        .expect_delete_order()
        .withf(|store, order| store.as_str() == "store-1" && order.as_str() == "64fe12ab34cd56ef78ab90cd")
        .returning(|_, _| Ok(true));
    let (status, body) = call(backend, authorized(TestRequest::delete().uri(ORDER_URL))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Order deleted successfully");
}

#[actix_web::test]
async fn sellers_see_their_order_list() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_store_for_owner().returning(|_| Ok(Some(seller_store())));
    backend
        .expect_fetch_orders_for_store()
        .returning(|store| Ok(vec![sample_order(store.as_str(), OrderStatus::Processing)]));
    let (status, body) = call(backend, authorized(TestRequest::get().uri("/api/store/orders"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["orders"][0]["status"], "PROCESSING");
}
