//! `SqliteDatabase` is a concrete implementation of an order fulfillment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, products, stores, users};
use crate::{
    db_types::{NewOrder, Order, OrderId, ShippingAddress, StockFault, Store, StoreId, UserContact, UserId},
    order_objects::{OrderUpdate, TrackingQuery},
    traits::{FulfillmentDatabase, FulfillmentError, OrderManagement, OrderQueryError, StoreManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool for the given URL.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Migrations are embedded in the binary and idempotent, so this is safe to call
    /// on every startup.
    pub async fn run_migrations(&self) -> Result<(), FulfillmentError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| FulfillmentError::DatabaseError(format!("Migration failure: {e}")))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn resolve_store_for_products(&self, product_ids: &[String]) -> Result<StoreId, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        products::resolve_store_for_products(product_ids, &mut conn).await
    }

    /// Records the order and its line items in a single transaction. The idempotency probe on the gateway payment
    /// id runs inside the same transaction, so a replayed confirmation can never insert a second order.
    async fn insert_order(&self, order: NewOrder, store_id: &StoreId) -> Result<(Order, bool), FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let (order, created) = orders::idempotent_insert(order, store_id, &mut tx).await?;
        tx.commit().await?;
        if created {
            debug!("🗃️ Order {} has been saved in the DB for store {store_id}", order.order_id);
        }
        Ok((order, created))
    }

    /// Adjusts stock per line item, each independently: one failing decrement neither blocks the others nor rolls
    /// anything back. The faults come back to the caller for warning-level reporting.
    async fn adjust_stock_for_order(&self, order: &Order) -> Result<Vec<StockFault>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let mut faults = Vec::new();
        for item in &order.items {
            match products::decrement_stock(&item.product_id, item.quantity, &mut conn).await {
                Ok(true) => {
                    trace!("🗃️ Stock for {} reduced by {}", item.product_id, item.quantity);
                },
                Ok(false) => faults.push(StockFault {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    reason: "insufficient stock".to_string(),
                }),
                Err(e) => faults.push(StockFault {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(faults)
    }

    async fn update_order(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order(store_id, order_id, update, &mut conn).await
    }

    async fn set_shipping_address(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
        address: ShippingAddress,
    ) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::set_shipping_address(store_id, order_id, address, &mut conn).await
    }

    async fn delete_order(&self, store_id: &StoreId, order_id: &OrderId) -> Result<bool, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::delete_order(store_id, order_id, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), FulfillmentError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn fetch_order_for_store(
        &self,
        store_id: &StoreId,
        order_id: &OrderId,
    ) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_for_store(store_id, order_id, &mut conn).await?)
    }

    async fn fetch_orders_for_store(&self, store_id: &StoreId) -> Result<Vec<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_store(store_id, &mut conn).await?)
    }

    async fn fetch_order_by_phone_or_tracking(&self, query: TrackingQuery) -> Result<Option<Order>, OrderQueryError> {
        if query.is_empty() {
            return Err(OrderQueryError::EmptyQuery);
        }
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_phone_or_tracking(&query, &mut conn).await?)
    }

    async fn fetch_user_contact(&self, user_id: &UserId) -> Result<Option<UserContact>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_contact(user_id, &mut conn).await?)
    }
}

impl StoreManagement for SqliteDatabase {
    async fn fetch_store_for_owner(&self, owner: &UserId) -> Result<Option<Store>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(stores::fetch_store_for_owner(owner, &mut conn).await?)
    }
}
