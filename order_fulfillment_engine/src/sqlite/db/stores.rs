use sqlx::SqliteConnection;

use crate::db_types::{Store, UserId};

pub async fn fetch_store_for_owner(owner: &UserId, conn: &mut SqliteConnection) -> Result<Option<Store>, sqlx::Error> {
    sqlx::query_as("SELECT store_id, owner_user_id, name FROM stores WHERE owner_user_id = $1")
        .bind(owner.as_str())
        .fetch_optional(conn)
        .await
}
