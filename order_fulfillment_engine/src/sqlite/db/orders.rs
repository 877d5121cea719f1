use chrono::{DateTime, Utc};
use log::{debug, trace};
use ofg_common::Money;
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{
        CustomerIdentity,
        GuestInfo,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        OrderStatus,
        PaymentMethod,
        PaymentStatus,
        ShippingAddress,
        StoreId,
        UserId,
    },
    order_objects::{OrderUpdate, TrackingQuery},
    traits::FulfillmentError,
};

/// The flat row shape of the `orders` table. The customer identity and shipping address are nullable column groups
/// here and nowhere else; [`OrderRow::into_order`] folds them back into the domain types.
#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    id: i64,
    order_id: OrderId,
    user_id: Option<UserId>,
    guest_name: Option<String>,
    guest_email: Option<String>,
    guest_phone: Option<String>,
    store_id: StoreId,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    razorpay_payment_id: Option<String>,
    razorpay_order_id: Option<String>,
    address_id: Option<String>,
    ship_name: Option<String>,
    ship_email: Option<String>,
    ship_phone: Option<String>,
    ship_street: Option<String>,
    ship_city: Option<String>,
    ship_state: Option<String>,
    ship_zip: Option<String>,
    ship_country: Option<String>,
    ship_district: Option<String>,
    status: OrderStatus,
    tracking_id: Option<String>,
    tracking_url: Option<String>,
    courier: Option<String>,
    shipping_fee: Money,
    total: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, sqlx::Error> {
        let OrderRow {
            id,
            order_id,
            user_id,
            guest_name,
            guest_email,
            guest_phone,
            store_id,
            payment_method,
            payment_status,
            razorpay_payment_id,
            razorpay_order_id,
            address_id,
            ship_name,
            ship_email,
            ship_phone,
            ship_street,
            ship_city,
            ship_state,
            ship_zip,
            ship_country,
            ship_district,
            status,
            tracking_id,
            tracking_url,
            courier,
            shipping_fee,
            total,
            created_at,
            updated_at,
        } = self;
        let customer = match (user_id, guest_name, guest_email, guest_phone) {
            (Some(user_id), None, None, None) => CustomerIdentity::Registered { user_id },
            (None, Some(name), Some(email), Some(phone)) => CustomerIdentity::Guest(GuestInfo { name, email, phone }),
            _ => {
                return Err(sqlx::Error::Decode(Box::from(format!(
                    "Order {order_id} does not carry exactly one customer identity"
                ))))
            },
        };
        let shipping_address = ship_street.map(|street| ShippingAddress {
            name: ship_name.unwrap_or_default(),
            email: ship_email.unwrap_or_default(),
            phone: ship_phone.unwrap_or_default(),
            street,
            city: ship_city.unwrap_or_default(),
            state: ship_state.unwrap_or_default(),
            zip: ship_zip.unwrap_or_default(),
            country: ship_country.unwrap_or_default(),
            district: ship_district.unwrap_or_default(),
        });
        Ok(Order {
            id,
            order_id,
            customer,
            store_id,
            items,
            payment_method,
            payment_status,
            razorpay_payment_id,
            razorpay_order_id,
            address_id,
            shipping_address,
            status,
            tracking_id,
            tracking_url,
            courier,
            shipping_fee,
            total,
            created_at,
            updated_at,
        })
    }
}

async fn load_items(order_row_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_row_id)
        .fetch_all(conn)
        .await
}

async fn assemble(row: Option<OrderRow>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match row {
        Some(row) => {
            let items = load_items(row.id, conn).await?;
            row.into_order(items).map(Some)
        },
        None => Ok(None),
    }
}

/// Inserts the order into the database, returning `false` in the second parameter if a confirmation for the same
/// gateway payment has already been recorded. In that case the stored order is returned untouched.
///
/// The probe-then-insert pair is not atomic against a concurrent identical confirmation, so the unique index on the
/// payment id is the backstop: losing that race degrades to the replay path instead of surfacing an error.
pub async fn idempotent_insert(
    order: NewOrder,
    store_id: &StoreId,
    conn: &mut SqliteConnection,
) -> Result<(Order, bool), FulfillmentError> {
    if let Some(existing) = fetch_order_by_payment_id(&order.razorpay_payment_id, conn).await? {
        return Ok((existing, false));
    }
    let payment_id = order.razorpay_payment_id.clone();
    match insert_order(order, store_id, conn).await {
        Ok(order) => {
            debug!("📝️ Order {} inserted with id {}", order.order_id, order.id);
            Ok((order, true))
        },
        Err(e) if is_unique_violation(&e) => {
            debug!("📝️ Lost an insert race for payment {payment_id}; returning the stored order");
            let existing = fetch_order_by_payment_id(&payment_id, conn).await?.ok_or_else(|| {
                FulfillmentError::DatabaseError(format!(
                    "Order for payment {payment_id} is missing right after a duplicate-insert rejection"
                ))
            })?;
            Ok((existing, false))
        },
        Err(e) => Err(e.into()),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}

/// Inserts a new order using the given connection. This is not atomic on its own: the line items land in a separate
/// table, so embed this call inside a transaction and pass `&mut *tx` as the connection argument.
async fn insert_order(order: NewOrder, store_id: &StoreId, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order_id = OrderId::generate();
    let total = order.total();
    let NewOrder {
        customer,
        items,
        payment_method,
        payment_status,
        shipping_fee,
        razorpay_payment_id,
        razorpay_order_id,
        address_id,
    } = order;
    let user_id = customer.user_id().cloned();
    let guest = customer.guest().cloned();
    let row: OrderRow = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                guest_name,
                guest_email,
                guest_phone,
                store_id,
                payment_method,
                payment_status,
                razorpay_payment_id,
                razorpay_order_id,
                address_id,
                shipping_fee,
                total
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(guest.as_ref().map(|g| g.name.clone()))
    .bind(guest.as_ref().map(|g| g.email.clone()))
    .bind(guest.as_ref().map(|g| g.phone.clone()))
    .bind(store_id)
    .bind(payment_method)
    .bind(payment_status)
    .bind(razorpay_payment_id)
    .bind(razorpay_order_id)
    .bind(address_id)
    .bind(shipping_fee)
    .bind(total)
    .fetch_one(&mut *conn)
    .await?;
    for item in &items {
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)")
            .bind(row.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *conn)
            .await?;
    }
    row.into_order(items)
}

/// Returns the order recorded for the given gateway payment id, if any. This is the idempotency probe.
pub async fn fetch_order_by_payment_id(
    payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE razorpay_payment_id = $1")
        .bind(payment_id)
        .fetch_optional(&mut *conn)
        .await?;
    assemble(row, conn).await
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(&mut *conn).await?;
    assemble(row, conn).await
}

/// The store-scoped fetch used by every seller operation. A mismatched store yields `None`, exactly like a missing
/// order.
pub async fn fetch_order_for_store(
    store_id: &StoreId,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1 AND store_id = $2")
        .bind(order_id.as_str())
        .bind(store_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    assemble(row, conn).await
}

pub async fn fetch_orders_for_store(store_id: &StoreId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let rows: Vec<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE store_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(store_id.as_str())
        .fetch_all(&mut *conn)
        .await?;
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = load_items(row.id, conn).await?;
        orders.push(row.into_order(items)?);
    }
    Ok(orders)
}

/// The public tracking lookup: the shipping-address phone number against `phone`, the tracking id or the order's own
/// identifier against `awb`. The most recent match wins.
pub async fn fetch_order_by_phone_or_tracking(
    query: &TrackingQuery,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE ($1 IS NOT NULL AND ship_phone = $1)
           OR ($2 IS NOT NULL AND (tracking_id = $2 OR order_id = $2))
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(query.phone.as_deref())
    .bind(query.awb.as_deref())
    .fetch_optional(&mut *conn)
    .await?;
    assemble(row, conn).await
}

/// Applies the allow-listed patch fields, scoped by the owning store. Returns `None` when no (store, order) pair
/// matched.
pub(crate) async fn update_order(
    store_id: &StoreId,
    order_id: &OrderId,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, FulfillmentError> {
    if update.is_empty() {
        debug!("📝️ No fields to update for order {order_id}. Update request skipped.");
        return Err(FulfillmentError::OrderModificationNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(status) = update.status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(tracking_id) = update.tracking_id {
        set_clause.push("tracking_id = ");
        set_clause.push_bind_unseparated(tracking_id);
    }
    if let Some(tracking_url) = update.tracking_url {
        set_clause.push("tracking_url = ");
        set_clause.push_bind_unseparated(tracking_url);
    }
    if let Some(courier) = update.courier {
        set_clause.push("courier = ");
        set_clause.push_bind_unseparated(courier);
    }
    builder.push(" WHERE order_id = ");
    builder.push_bind(order_id.as_str());
    builder.push(" AND store_id = ");
    builder.push_bind(store_id.as_str());
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let row: Option<OrderRow> = builder.build_query_as().fetch_optional(&mut *conn).await?;
    Ok(assemble(row, conn).await?)
}

pub(crate) async fn set_shipping_address(
    store_id: &StoreId,
    order_id: &OrderId,
    address: ShippingAddress,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, FulfillmentError> {
    let row: Option<OrderRow> = sqlx::query_as(
        r#"
        UPDATE orders SET
            updated_at = CURRENT_TIMESTAMP,
            ship_name = $1,
            ship_email = $2,
            ship_phone = $3,
            ship_street = $4,
            ship_city = $5,
            ship_state = $6,
            ship_zip = $7,
            ship_country = $8,
            ship_district = $9
        WHERE order_id = $10 AND store_id = $11
        RETURNING *
        "#,
    )
    .bind(address.name)
    .bind(address.email)
    .bind(address.phone)
    .bind(address.street)
    .bind(address.city)
    .bind(address.state)
    .bind(address.zip)
    .bind(address.country)
    .bind(address.district)
    .bind(order_id.as_str())
    .bind(store_id.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(assemble(row, conn).await?)
}

/// Hard-removes the order and its line items after the ownership check. Returns `false` when nothing matched.
pub(crate) async fn delete_order(
    store_id: &StoreId,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<bool, FulfillmentError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM orders WHERE order_id = $1 AND store_id = $2")
        .bind(order_id.as_str())
        .bind(store_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    let Some((id,)) = row else {
        return Ok(false);
    };
    sqlx::query("DELETE FROM order_items WHERE order_id = $1").bind(id).execute(&mut *conn).await?;
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}
