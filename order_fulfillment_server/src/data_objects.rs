use std::fmt::Display;

use ofg_common::{Money, MoneyConversionError};
use order_fulfillment_engine::db_types::{GuestInfo, OrderItem, PaymentMethod, ShippingAddress};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The payment gateway's confirmation callback, exactly as the storefront forwards it.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "paymentPayload")]
    pub payment_payload: PaymentPayload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub items: Vec<PurchasedItem>,
    pub payment_method: PaymentMethod,
    /// In minor units (paise).
    #[serde(default)]
    pub shipping_fee: i64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub address_id: Option<String>,
    #[serde(default)]
    pub guest_info: Option<GuestInfo>,
}

/// One cart line as submitted at checkout. `price` is the unit price in minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchasedItem {
    pub id: String,
    pub quantity: i64,
    #[serde(default)]
    pub price: i64,
}

impl PurchasedItem {
    pub fn into_order_item(self) -> Result<OrderItem, MoneyConversionError> {
        let price = Money::try_from_paise(self.price)?;
        Ok(OrderItem { product_id: self.id, quantity: self.quantity, price })
    }
}

/// Body of the seller address-update endpoint. The address itself is optional at the serde level so that a missing
/// block maps to the endpoint's 400 message rather than a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressUpdateRequest {
    #[serde(rename = "shippingAddress")]
    pub shipping_address: Option<ShippingAddress>,
}

/// Query parameters of the public tracking endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingQueryParams {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub awb: Option<String>,
}
