use std::path::Path;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A unique throwaway database under the system temp directory, so parallel test binaries never collide.
pub fn random_db_url() -> String {
    format!("sqlite://{}/ofg_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Seeds the two-store catalogue the integration tests run against.
pub async fn seed_catalogue(db: &SqliteDatabase) {
    let pool = db.pool();
    for (store_id, owner, name) in
        [("store-1", "seller-1", "Acme Outfitters"), ("store-2", "seller-2", "Harbour Goods")]
    {
        sqlx::query("INSERT INTO stores (store_id, owner_user_id, name) VALUES ($1, $2, $3)")
            .bind(store_id)
            .bind(owner)
            .bind(name)
            .execute(pool)
            .await
            .expect("Error seeding stores");
    }
    sqlx::query("INSERT INTO users (user_id, name, email) VALUES ($1, $2, $3)")
        .bind("user-1")
        .bind("Priya Sharma")
        .bind("priya@example.com")
        .execute(pool)
        .await
        .expect("Error seeding users");
    for (product_id, store_id, name, stock) in [
        ("P1", "store-1", "Canvas Tote", 10_i64),
        ("P2", "store-1", "Steel Bottle", 5),
        ("P3", "store-2", "Desk Lamp", 3),
    ] {
        sqlx::query("INSERT INTO products (product_id, store_id, name, stock) VALUES ($1, $2, $3, $4)")
            .bind(product_id)
            .bind(store_id)
            .bind(name)
            .bind(stock)
            .execute(pool)
            .await
            .expect("Error seeding products");
    }
}
