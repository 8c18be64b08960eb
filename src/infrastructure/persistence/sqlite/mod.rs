pub mod invoice_repository;

pub use invoice_repository::SqliteInvoiceRepository;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::config::DatabaseConfig;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");

/// In-memory databases live only as long as their connection
pub fn is_in_memory(url: &str) -> bool {
  url.contains(":memory:") || url.contains("mode=memory")
}

/// Opens the pool, creating the database file when it does not exist
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
  let options = SqliteConnectOptions::from_str(&config.url)?
    .foreign_keys(true)
    .create_if_missing(true);

  let pool_options = if is_in_memory(&config.url) {
    SqlitePoolOptions::new()
      .max_connections(1)
      .min_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
  } else {
    SqlitePoolOptions::new().max_connections(config.max_connections)
  };

  pool_options
    .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
    .connect_with(options)
    .await
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
  let config = DatabaseConfig {
    url: "sqlite::memory:".to_string(),
    max_connections: 1,
    connect_timeout_seconds: 5,
    acquire_timeout_seconds: 3,
  };
  let pool = connect(&config)
    .await
    .expect("Failed to open in-memory database");
  MIGRATOR
    .run(&pool)
    .await
    .expect("Failed to run migrations");
  pool
}

#[cfg(test)]
pub(crate) async fn memory_repository() -> SqliteInvoiceRepository {
  SqliteInvoiceRepository::new(memory_pool().await)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_in_memory() {
    assert!(is_in_memory("sqlite::memory:"));
    assert!(is_in_memory("sqlite://file:test?mode=memory&cache=shared"));
    assert!(!is_in_memory("sqlite://data/invoices.db"));
  }

  #[tokio::test]
  async fn test_migrations_create_invoices_table() {
    let pool = memory_pool().await;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoices")
      .fetch_one(&pool)
      .await
      .unwrap();

    assert_eq!(count, 0);
  }
}
