use sqlx::SqliteConnection;

use crate::db_types::{UserContact, UserId};

pub async fn fetch_user_contact(
    user_id: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<UserContact>, sqlx::Error> {
    sqlx::query_as("SELECT user_id, name, email FROM users WHERE user_id = $1")
        .bind(user_id.as_str())
        .fetch_optional(conn)
        .await
}
