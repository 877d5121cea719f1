use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ofg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public identifier of an order. Assigned by the engine at insert time and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh 24-hex-character identifier.
    pub fn generate() -> Self {
        let bytes: [u8; 12] = rand::random();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------        StoreId        -------------------------------------------------------
/// Identifies the seller fulfilling an order. Fixed at order creation.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct StoreId(pub String);

impl StoreId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for StoreId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        UserId         -------------------------------------------------------
/// A registered customer identifier, as minted by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for UserId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------      OrderStatus      -------------------------------------------------------
/// The shipping lifecycle of an order. The wire and storage representation is the SCREAMING_SNAKE form
/// (`ORDER_PLACED`, `OUT_FOR_DELIVERY`, ...).
///
/// The main line `OrderPlaced → ... → Delivered` is ordered. An update may move an order from an earlier main-line
/// status to any strictly later one (sellers may skip stages), never backwards. `Cancelled` is reachable from any
/// main-line status before delivery. Returns only run `Delivered → ReturnRequested → Returned`. `Returned` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    OrderPlaced,
    Confirmed,
    Processing,
    PickupRequested,
    WaitingForPickup,
    PickedUp,
    WarehouseReceived,
    Shipped,
    OutForDelivery,
    Delivered,
    ReturnRequested,
    Returned,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in the sequence the tracking UI renders as progress steps.
    pub const ALL: [OrderStatus; 13] = [
        OrderStatus::OrderPlaced,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::PickupRequested,
        OrderStatus::WaitingForPickup,
        OrderStatus::PickedUp,
        OrderStatus::WarehouseReceived,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::ReturnRequested,
        OrderStatus::Returned,
        OrderStatus::Cancelled,
    ];

    /// Position of this status in the main delivery line (`OrderPlaced`..=`Delivered`), if it is on it.
    fn main_line_index(&self) -> Option<usize> {
        let idx = Self::ALL.iter().position(|s| s == self)?;
        (idx <= 9).then_some(idx)
    }

    /// Position in the full display sequence. Infallible since [`Self::ALL`] is exhaustive.
    pub fn sequence_index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// The transition table. A same-status "transition" returns false; callers distinguish the no-op case
    /// themselves where it matters.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (*self, next) {
            (from, to) if from == to => false,
            (Returned | Cancelled, _) => false,
            (ReturnRequested, Returned) => true,
            (ReturnRequested, _) => false,
            (Delivered, ReturnRequested) => true,
            (Delivered, _) => false,
            (_, Cancelled) => true,
            (from, to) => match (from.main_line_index(), to.main_line_index()) {
                (Some(f), Some(t)) => t > f,
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .find(|status| status.to_string() == s)
            .copied()
            .ok_or_else(|| StatusConversionError(s.to_string()))
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::OrderPlaced => "ORDER_PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::PickupRequested => "PICKUP_REQUESTED",
            OrderStatus::WaitingForPickup => "WAITING_FOR_PICKUP",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::WarehouseReceived => "WAREHOUSE_RECEIVED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::ReturnRequested => "RETURN_REQUESTED",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

//--------------------------------------     PaymentStatus     -------------------------------------------------------
/// Settlement state of the payment backing an order. `pending` may move to `paid` or `failed`; a settled payment is
/// never reopened. The storage layer refuses to touch payment columns after insert, so the invariant is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!((self, next), (PaymentStatus::Pending, PaymentStatus::Paid | PaymentStatus::Failed))
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

//--------------------------------------     PaymentMethod     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Card,
    Cod,
    Upi,
    Netbanking,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::Cod => write!(f, "COD"),
            PaymentMethod::Upi => write!(f, "UPI"),
            PaymentMethod::Netbanking => write!(f, "NETBANKING"),
        }
    }
}

//--------------------------------------      GuestInfo        -------------------------------------------------------
/// Contact details identifying a guest checkout. All three fields are required for a guest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl GuestInfo {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty() && !self.phone.trim().is_empty()
    }
}

//--------------------------------------   CustomerIdentity    -------------------------------------------------------
/// Who placed the order: exactly one of a registered customer or a guest contact block. The storage layer flattens
/// this to nullable columns; everywhere else the sum type makes the "never both, never neither" rule unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdentity {
    Registered { user_id: UserId },
    Guest(GuestInfo),
}

impl CustomerIdentity {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            CustomerIdentity::Registered { user_id } => Some(user_id),
            CustomerIdentity::Guest(_) => None,
        }
    }

    pub fn guest(&self) -> Option<&GuestInfo> {
        match self {
            CustomerIdentity::Registered { .. } => None,
            CustomerIdentity::Guest(info) => Some(info),
        }
    }
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// A line item as purchased. `price` is the unit price at purchase time; the catalogue may move on afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i64,
    #[serde(rename = "priceAtPurchase")]
    pub price: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

//--------------------------------------   ShippingAddress     -------------------------------------------------------
/// Delivery address. Street, city and country are required; everything else defaults to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub district: String,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty() && !self.city.trim().is_empty() && !self.country.trim().is_empty()
    }
}

//--------------------------------------        Order          -------------------------------------------------------
/// The authoritative, persisted representation of an order.
#[derive(Debug, Clone)]
pub struct Order {
    /// Internal row id. Not exposed on any public surface.
    pub id: i64,
    pub order_id: OrderId,
    pub customer: CustomerIdentity,
    pub store_id: StoreId,
    pub items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    /// Reference into the customer's saved address book, if one was used at checkout.
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

impl Order {
    /// The phone number notifications should go to: the shipping address wins, guest contact is the fallback.
    pub fn contact_phone(&self) -> Option<&str> {
        let address_phone = self
            .shipping_address
            .as_ref()
            .map(|a| a.phone.as_str())
            .filter(|p| !p.trim().is_empty());
        address_phone.or_else(|| self.customer.guest().map(|g| g.phone.as_str()).filter(|p| !p.trim().is_empty()))
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A not-yet-persisted order, as assembled from a verified payment confirmation. The fulfilling store is resolved
/// from the referenced products before insertion, and the identifier and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: CustomerIdentity,
    pub items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_fee: Money,
    /// Payment-gateway correlation id. Creation is idempotent on this value.
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub address_id: Option<String>,
}

impl NewOrder {
    pub fn new(customer: CustomerIdentity, items: Vec<OrderItem>, payment_method: PaymentMethod) -> Self {
        Self {
            customer,
            items,
            payment_method,
            payment_status: PaymentStatus::Paid,
            shipping_fee: Money::default(),
            razorpay_payment_id: String::default(),
            razorpay_order_id: String::default(),
            address_id: None,
        }
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum::<Money>() + self.shipping_fee
    }
}

//--------------------------------------       Product         -------------------------------------------------------
/// The slice of the externally-owned product catalogue the engine touches: store attribution and stock.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub product_id: String,
    pub store_id: StoreId,
    pub name: String,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Store          -------------------------------------------------------
/// Seller registry entry; `owner_user_id` is what the ownership check resolves a bearer identity against.
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub store_id: StoreId,
    pub owner_user_id: UserId,
    pub name: String,
}

//--------------------------------------      UserContact      -------------------------------------------------------
/// Read-only projection of the external user registry, used to address notifications for registered customers.
#[derive(Debug, Clone, FromRow)]
pub struct UserContact {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

//--------------------------------------      StockFault       -------------------------------------------------------
/// A single line item whose stock decrement could not be applied. Reported, logged, never fatal: the order remains
/// the source of truth for the sale, stock is a best-effort side ledger.
#[derive(Debug, Clone, Serialize)]
pub struct StockFault {
    pub product_id: String,
    pub quantity: i64,
    pub reason: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in OrderStatus::ALL {
            let s = status.to_string();
            assert_eq!(s.parse::<OrderStatus>().unwrap(), status);
        }
        assert!("SHIPPED_MAYBE".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn main_line_moves_forward_only() {
        use OrderStatus::*;
        assert!(OrderPlaced.can_transition_to(Confirmed));
        assert!(Processing.can_transition_to(Shipped));
        assert!(OrderPlaced.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn cancellation_and_returns() {
        use OrderStatus::*;
        assert!(OrderPlaced.can_transition_to(Cancelled));
        assert!(OutForDelivery.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(Delivered.can_transition_to(ReturnRequested));
        assert!(ReturnRequested.can_transition_to(Returned));
        assert!(!ReturnRequested.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(ReturnRequested));
        assert!(!Returned.can_transition_to(OrderPlaced));
        assert!(!Cancelled.can_transition_to(OrderPlaced));
    }

    #[test]
    fn payment_status_never_reopens() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Paid));
    }

    #[test]
    fn order_totals_include_shipping() {
        let items = vec![
            OrderItem { product_id: "P1".into(), quantity: 2, price: Money::from(10_000) },
            OrderItem { product_id: "P2".into(), quantity: 1, price: Money::from(5_000) },
        ];
        let mut order = NewOrder::new(
            CustomerIdentity::Registered { user_id: "u-1".into() },
            items,
            PaymentMethod::Card,
        );
        order.shipping_fee = Money::from(500);
        assert_eq!(order.total(), Money::from(25_500));
    }

    #[test]
    fn contact_phone_prefers_shipping_address() {
        let guest = CustomerIdentity::Guest(GuestInfo {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "9000000001".into(),
        });
        let mut order = Order {
            id: 1,
            order_id: OrderId::generate(),
            customer: guest,
            store_id: "store-1".into(),
            items: vec![],
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Paid,
            razorpay_payment_id: None,
            razorpay_order_id: None,
            address_id: None,
            shipping_address: None,
            status: OrderStatus::OrderPlaced,
            tracking_id: None,
            tracking_url: None,
            courier: None,
            shipping_fee: Money::default(),
            total: Money::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(order.contact_phone(), Some("9000000001"));
        order.shipping_address = Some(ShippingAddress { phone: "9000000002".into(), ..Default::default() });
        assert_eq!(order.contact_phone(), Some("9000000002"));
    }
}
