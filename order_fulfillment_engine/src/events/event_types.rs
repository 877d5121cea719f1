use crate::db_types::{Order, OrderStatus, StockFault};

/// Where notifications for an order should go. Resolved from the user registry for registered customers, from the
/// guest contact block otherwise, with the shipping address as a final fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Fired once per freshly created order. Replayed confirmations do not fire it again.
#[derive(Debug, Clone)]
pub struct OrderPlacedEvent {
    pub order: Order,
    pub stock_faults: Vec<StockFault>,
}

impl OrderPlacedEvent {
    pub fn new(order: Order, stock_faults: Vec<StockFault>) -> Self {
        Self { order, stock_faults }
    }
}

/// Fired after a seller mutation when the status or any tracking field changed.
#[derive(Debug, Clone)]
pub struct OrderUpdatedEvent {
    pub order: Order,
    pub previous_status: OrderStatus,
    pub status_changed: bool,
    pub tracking_changed: bool,
    pub contact: CustomerContact,
}
