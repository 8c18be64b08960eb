pub mod invoice_repository;

pub use invoice_repository::PostgresInvoiceRepository;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::infrastructure::config::DatabaseConfig;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
  PgPoolOptions::new()
    .max_connections(config.max_connections)
    .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
    .connect(&config.url)
    .await
}
