use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, ShippingAddress, StockFault, StoreId},
    order_objects::OrderUpdate,
    traits::OrderQueryError,
};

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The order does not belong to your store")]
    OrderNotOwned,
    #[error("The product {0} does not exist")]
    ProductNotFound(String),
    #[error("Order items reference products from more than one store")]
    MixedStoreItems,
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("The requested order change would result in a no-op.")]
    OrderModificationNoOp,
    #[error("An order cannot move from {from} to {to}")]
    StatusTransitionForbidden { from: OrderStatus, to: OrderStatus },
    #[error("{0}")]
    QueryError(#[from] OrderQueryError),
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentError::DatabaseError(e.to_string())
    }
}

/// This trait defines the highest level of behaviour for backends supporting the order fulfillment engine: verified
/// order creation with its inventory side effects, and the seller-scoped mutation surface.
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Resolves the single store fulfilling the given products. Every referenced product must exist and all of them
    /// must belong to the same store.
    async fn resolve_store_for_products(&self, product_ids: &[String]) -> Result<StoreId, FulfillmentError>;

    /// Inserts the order, assigning its identifier and timestamps. Insertion is idempotent on the gateway payment
    /// id: replaying a confirmation for an already-recorded payment returns the existing order and `false` in the
    /// second slot, and the caller must skip every further side effect.
    async fn insert_order(&self, order: NewOrder, store_id: &StoreId) -> Result<(Order, bool), FulfillmentError>;

    /// Decrements stock for every line item of a freshly created order. Each item is adjusted independently with a
    /// conditional decrement (never below zero); failures are reported per item and do not abort the rest.
    async fn adjust_stock_for_order(&self, order: &Order) -> Result<Vec<StockFault>, FulfillmentError>;

    /// Applies the allow-listed patch (`status`, `trackingId`, `trackingUrl`, `courier`) to the order, scoped by the
    /// owning store. Returns `None` when no order matches the (store, order) pair.
    async fn update_order(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, FulfillmentError>;

    /// Replaces the shipping address, scoped by the owning store.
    async fn set_shipping_address(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
        address: ShippingAddress,
    ) -> Result<Option<Order>, FulfillmentError>;

    /// Hard-removes an order after the ownership check. Returns `false` when nothing matched.
    async fn delete_order(&self, store_id: &StoreId, order_id: &OrderId) -> Result<bool, FulfillmentError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), FulfillmentError> {
        Ok(())
    }
}
