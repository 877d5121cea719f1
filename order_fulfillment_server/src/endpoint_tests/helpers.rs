use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use ofg_common::{Money, Secret};
use order_fulfillment_engine::db_types::{
    CustomerIdentity,
    GuestInfo,
    Order,
    OrderId,
    OrderItem,
    OrderStatus,
    PaymentMethod,
    PaymentStatus,
};

use crate::{
    auth::IdTokenClaims,
    config::{AuthConfig, GatewayConfig},
};

// Test-only keys. DO NOT re-use these anywhere.
pub const TEST_VERIFICATION_KEY: &str = "ofs-endpoint-test-verification-key";
pub const TEST_GATEWAY_SECRET: &str = "ofs-endpoint-test-gateway-secret";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig { verification_key: Secret::new(TEST_VERIFICATION_KEY.to_string()) }
}

pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig { secret: Secret::new(TEST_GATEWAY_SECRET.to_string()) }
}

pub fn issue_token(user_id: &str) -> String {
    let claims = IdTokenClaims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        name: Some("Test Seller".to_string()),
        email: Some("seller@example.com".to_string()),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_VERIFICATION_KEY.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn expired_token(user_id: &str) -> String {
    let claims = IdTokenClaims {
        sub: user_id.to_string(),
        exp: (Utc::now() - Duration::hours(1)).timestamp(),
        name: None,
        email: None,
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_VERIFICATION_KEY.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// A stored guest order belonging to the given store. Guest identity keeps the mutation paths free of user-registry
/// lookups, so tests that want one can add it explicitly.
pub fn sample_order(store_id: &str, status: OrderStatus) -> Order {
    Order {
        id: 1,
        order_id: OrderId("64fe12ab34cd56ef78ab90cd".to_string()),
        customer: CustomerIdentity::Guest(GuestInfo {
            name: "Asha Verma".into(),
            email: "asha@example.com".into(),
            phone: "9000000001".into(),
        }),
        store_id: store_id.into(),
        items: vec![OrderItem { product_id: "P1".into(), quantity: 2, price: Money::from(59_900) }],
        payment_method: PaymentMethod::Card,
        payment_status: PaymentStatus::Paid,
        razorpay_payment_id: Some("pay_123".into()),
        razorpay_order_id: Some("order_123".into()),
        address_id: None,
        shipping_address: None,
        status,
        tracking_id: None,
        tracking_url: None,
        courier: None,
        shipping_fee: Money::from(4_900),
        total: Money::from(124_700),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
