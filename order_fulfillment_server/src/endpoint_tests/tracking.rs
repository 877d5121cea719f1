use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use order_fulfillment_engine::{db_types::OrderStatus, TrackingApi};
use serde_json::Value;

use crate::{
    endpoint_tests::{helpers::sample_order, mocks::MockBackend},
    routes::track_order,
};

async fn get(backend: MockBackend, uri: &str) -> (StatusCode, Value) {
    let api = TrackingApi::new(backend);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(api))
            .route("/api/track-order", web::get().to(track_order::<MockBackend>)),
    )
    .await;
    let res = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

#[actix_web::test]
async fn an_empty_query_is_rejected_before_any_storage_call() {
    // no expectations are set, so a storage call would fail the test
    let (status, body) = get(MockBackend::new(), "/api/track-order").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = get(MockBackend::new(), "/api/track-order?phone=%20&awb=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn lookup_by_awb_returns_the_customer_projection() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order_by_phone_or_tracking()
        .withf(|query| query.awb.as_deref() == Some("AWB123") && query.phone.is_none())
        .returning(|_| {
            let mut order = sample_order("store-1", OrderStatus::Shipped);
            order.tracking_id = Some("AWB123".into());
            Ok(Some(order))
        });
    let (status, body) = get(backend, "/api/track-order?awb=AWB123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let order = &body["order"];
    assert_eq!(order["status"], "SHIPPED");
    assert_eq!(order["trackingId"], "AWB123");
    assert_eq!(order["steps"].as_array().unwrap().len(), 13);
    // seller internals must not leak into the public projection
    let rendered = order.to_string();
    assert!(!rendered.contains("storeId"));
    assert!(!rendered.contains("razorpay"));
}

#[actix_web::test]
async fn lookup_by_phone_passes_the_trimmed_number_through() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order_by_phone_or_tracking()
        .withf(|query| query.phone.as_deref() == Some("9000000001"))
        .returning(|_| Ok(Some(sample_order("store-1", OrderStatus::OutForDelivery))));
    let (status, body) = get(backend, "/api/track-order?phone=%209000000001%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "OUT_FOR_DELIVERY");
}

#[actix_web::test]
async fn unknown_orders_yield_a_not_found_signal() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_phone_or_tracking().returning(|_| Ok(None));
    let (status, body) = get(backend, "/api/track-order?awb=NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
