use chrono::{DateTime, Utc};
use ofg_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{
    GuestInfo,
    Order,
    OrderId,
    OrderItem,
    OrderStatus,
    PaymentMethod,
    PaymentStatus,
    ShippingAddress,
    StockFault,
    StoreId,
    UserId,
};

//--------------------------------------      OrderUpdate      -------------------------------------------------------
/// The allow-listed mutable fields of an order. Only fields carried here can ever be patched; everything else an
/// update request may contain is dropped before it reaches the engine. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub tracking_id: Option<String>,
    pub tracking_url: Option<String>,
    pub courier: Option<String>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && !self.touches_tracking()
    }

    pub fn touches_tracking(&self) -> bool {
        self.tracking_id.is_some() || self.tracking_url.is_some() || self.courier.is_some()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_tracking_id<S: Into<String>>(mut self, tracking_id: S) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn with_tracking_url<S: Into<String>>(mut self, tracking_url: S) -> Self {
        self.tracking_url = Some(tracking_url.into());
        self
    }

    pub fn with_courier<S: Into<String>>(mut self, courier: S) -> Self {
        self.courier = Some(courier.into());
        self
    }
}

//--------------------------------------     TrackingQuery     -------------------------------------------------------
/// The public lookup's search terms. At least one of the two must be present; blank strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingQuery {
    pub phone: Option<String>,
    pub awb: Option<String>,
}

impl TrackingQuery {
    pub fn new(phone: Option<&str>, awb: Option<&str>) -> Self {
        let phone = phone.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        let awb = awb.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        Self { phone, awb }
    }

    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.awb.is_none()
    }
}

//--------------------------------------      SellerOrder      -------------------------------------------------------
/// The full order projection returned to the owning seller. Identity is flattened back to the optional-field wire
/// encoding the dashboard expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrder {
    #[serde(rename = "_id")]
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_info: Option<GuestInfo>,
    pub store_id: StoreId,
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub status: OrderStatus,
    pub tracking_id: Option<String>,
    pub tracking_url: Option<String>,
    pub courier: Option<String>,
    pub shipping_fee: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for SellerOrder {
    fn from(order: Order) -> Self {
        let user_id = order.customer.user_id().cloned();
        let guest_info = order.customer.guest().cloned();
        Self {
            order_id: order.order_id,
            user_id,
            guest_info,
            store_id: order.store_id,
            items: order.items,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            razorpay_payment_id: order.razorpay_payment_id,
            razorpay_order_id: order.razorpay_order_id,
            address_id: order.address_id,
            shipping_address: order.shipping_address,
            status: order.status,
            tracking_id: order.tracking_id,
            tracking_url: order.tracking_url,
            courier: order.courier,
            shipping_fee: order.shipping_fee,
            total: order.total,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

//--------------------------------------     ProgressStep      -------------------------------------------------------
/// One entry of the "steps completed" strip on the tracking page. Purely derived display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStep {
    pub name: String,
    pub completed: bool,
    pub active: bool,
}

/// Derives the progress strip for a status: every status in display order, marked completed up to and including the
/// current one. This is display sugar over [`OrderStatus::ALL`]; it carries no authority over transitions.
pub fn progress_steps(status: OrderStatus) -> Vec<ProgressStep> {
    let current = status.sequence_index();
    OrderStatus::ALL
        .iter()
        .enumerate()
        .map(|(idx, step)| ProgressStep {
            name: step.to_string().replace('_', " "),
            completed: idx <= current,
            active: idx == current,
        })
        .collect()
}

//--------------------------------------     TrackedOrder      -------------------------------------------------------
/// The customer-safe projection served by the public tracking lookup. Deliberately excludes the store id and the raw
/// gateway correlation ids.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedOrder {
    #[serde(rename = "_id")]
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub tracking_id: Option<String>,
    pub tracking_url: Option<String>,
    pub courier: Option<String>,
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderItem>,
    pub shipping_fee: Money,
    pub total: Money,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub steps: Vec<ProgressStep>,
}

impl From<Order> for TrackedOrder {
    fn from(order: Order) -> Self {
        let steps = progress_steps(order.status);
        Self {
            order_id: order.order_id,
            status: order.status,
            payment_status: order.payment_status,
            tracking_id: order.tracking_id,
            tracking_url: order.tracking_url,
            courier: order.courier,
            items: order.items,
            shipping_fee: order.shipping_fee,
            total: order.total,
            shipping_address: order.shipping_address,
            created_at: order.created_at,
            steps,
        }
    }
}

//--------------------------------------      PlacedOrder      -------------------------------------------------------
/// The outcome of processing a verified payment confirmation. `created` is false when the confirmation was a replay
/// of an already-recorded payment, in which case no side effects ran.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub created: bool,
    pub stock_faults: Vec<StockFault>,
}
