use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, StoreId, UserContact, UserId},
    order_objects::TrackingQuery,
};

#[derive(Debug, Clone, Error)]
pub enum OrderQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("At least one of phone or AWB number must be supplied")]
    EmptyQuery,
}

impl From<sqlx::Error> for OrderQueryError {
    fn from(e: sqlx::Error) -> Self {
        OrderQueryError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines the behaviour for querying orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches an order by its public identifier, regardless of owner.
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;

    /// Fetches an order scoped by the owning store. An order that exists but belongs to a different store is
    /// reported as absent, not as forbidden.
    async fn fetch_order_for_store(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
    ) -> Result<Option<Order>, OrderQueryError>;

    /// All orders for a store, newest first.
    async fn fetch_orders_for_store(&self, store_id: &StoreId) -> Result<Vec<Order>, OrderQueryError>;

    /// The unauthenticated tracking lookup. Matches the shipping-address phone number against `phone`, and the
    /// tracking id or order id against `awb`; the most recent match wins. An empty query is an
    /// [`OrderQueryError::EmptyQuery`] and must be rejected before any query is issued.
    async fn fetch_order_by_phone_or_tracking(&self, query: TrackingQuery) -> Result<Option<Order>, OrderQueryError>;

    /// Contact details for a registered customer, from the externally-owned user registry.
    async fn fetch_user_contact(&self, user_id: &UserId) -> Result<Option<UserContact>, OrderQueryError>;
}
