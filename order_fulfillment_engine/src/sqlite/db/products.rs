use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Product, StoreId},
    traits::FulfillmentError,
};

pub async fn fetch_product(product_id: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE product_id = $1").bind(product_id).fetch_optional(conn).await
}

/// Resolves the single store that fulfils all the given products. Every product must exist, and carts spanning more
/// than one store are rejected. The storefront groups checkouts per store; this enforces the same contract
/// server-side.
pub(crate) async fn resolve_store_for_products(
    product_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<StoreId, FulfillmentError> {
    let mut store: Option<StoreId> = None;
    for product_id in product_ids {
        let product = fetch_product(product_id, conn)
            .await?
            .ok_or_else(|| FulfillmentError::ProductNotFound(product_id.clone()))?;
        match &store {
            None => store = Some(product.store_id),
            Some(expected) if expected == &product.store_id => {},
            Some(_) => return Err(FulfillmentError::MixedStoreItems),
        }
    }
    store.ok_or_else(|| FulfillmentError::InvalidOrder("An order must contain at least one item".to_string()))
}

/// Conditionally decrements stock: the update only applies when at least `quantity` units are available, so stock
/// can never be driven negative, even by racing order creations. Returns `false` when the decrement did not apply.
pub(crate) async fn decrement_stock(
    product_id: &str,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE product_id = $2 AND stock >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    trace!("📝️ Stock decrement of {quantity} for {product_id}: {} row(s) affected", result.rows_affected());
    Ok(result.rows_affected() > 0)
}
