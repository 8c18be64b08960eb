use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::domain::invoice::{
  Invoice, InvoiceData, InvoiceId, InvoiceSearch, NewInvoice, Page, PageRequest,
  errors::InvoiceError, ports::InvoiceRepository,
};

const INVOICE_COLUMNS: &str = "id, invoice_number, seller_nip, buyer_nip, product_name, \
  net_amount, issuance_date, created_at, updated_at";

// $1 is the escaped pattern or NULL; the cast fixes its type for every use
const SEARCH_PREDICATE: &str = r#"($1::text IS NULL
  OR LOWER(invoice_number) LIKE $1 ESCAPE '\'
  OR LOWER(seller_nip) LIKE $1 ESCAPE '\'
  OR LOWER(buyer_nip) LIKE $1 ESCAPE '\'
  OR LOWER(product_name) LIKE $1 ESCAPE '\')"#;

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: i64,
  invoice_number: String,
  seller_nip: String,
  buyer_nip: String,
  product_name: String,
  net_amount: Decimal,
  issuance_date: Option<NaiveDate>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    let data = InvoiceData::parse(
      row.invoice_number,
      row.seller_nip,
      row.buyer_nip,
      row.product_name,
      row.net_amount,
      row.issuance_date,
    )?;

    let mut invoice = NewInvoice::new(data).with_id(row.id);
    invoice.created_at = row.created_at;
    invoice.updated_at = row.updated_at;
    Ok(invoice)
  }
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            INSERT INTO invoices (
                invoice_number, seller_nip, buyer_nip, product_name,
                net_amount, issuance_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(invoice.invoice_number.value())
    .bind(invoice.seller_nip.value())
    .bind(invoice.buyer_nip.value())
    .bind(invoice.product_name.value())
    .bind(invoice.net_amount.value())
    .bind(invoice.issuance_date)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET invoice_number = $2, seller_nip = $3, buyer_nip = $4,
                product_name = $5, net_amount = $6, issuance_date = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.seller_nip.value())
    .bind(invoice.buyer_nip.value())
    .bind(invoice.product_name.value())
    .bind(invoice.net_amount.value())
    .bind(invoice.issuance_date)
    .bind(invoice.updated_at)
    .fetch_optional(&self.pool)
    .await?
    .ok_or(InvoiceError::NotFound(invoice.id))?;

    row.try_into()
  }

  async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(Invoice::try_from).transpose()
  }

  async fn exists_by_number(
    &self,
    invoice_number: &str,
    exclude_id: Option<InvoiceId>,
  ) -> Result<bool, InvoiceError> {
    let exists: bool = sqlx::query_scalar(
      r#"
            SELECT EXISTS(
                SELECT 1 FROM invoices
                WHERE invoice_number = $1 AND ($2::bigint IS NULL OR id <> $2)
            )
            "#,
    )
    .bind(invoice_number)
    .bind(exclude_id)
    .fetch_one(&self.pool)
    .await?;

    Ok(exists)
  }

  async fn search(
    &self,
    search: &InvoiceSearch,
    page: PageRequest,
  ) -> Result<Page<Invoice>, InvoiceError> {
    let pattern = search.like_pattern();

    let total: i64 = sqlx::query_scalar(&format!(
      "SELECT COUNT(*) FROM invoices WHERE {SEARCH_PREDICATE}"
    ))
    .bind(pattern.as_deref())
    .fetch_one(&self.pool)
    .await?;

    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            WHERE {SEARCH_PREDICATE}
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#
    ))
    .bind(pattern.as_deref())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&self.pool)
    .await?;

    let invoices = rows
      .into_iter()
      .map(Invoice::try_from)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(invoices, page, total.max(0) as u64))
  }

  async fn delete(&self, id: InvoiceId) -> Result<(), InvoiceError> {
    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      return Err(InvoiceError::NotFound(id));
    }

    Ok(())
  }

  async fn ping(&self) -> Result<(), InvoiceError> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;
  use sqlx::postgres::PgPoolOptions;
  use testcontainers::ImageExt;
  use testcontainers_modules::postgres::Postgres;
  use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};

  async fn setup_test_db() -> (PgPool, ContainerAsync<Postgres>) {
    let container = Postgres::default()
      .with_tag("16-alpine")
      .start()
      .await
      .expect("Failed to start postgres container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
      .get_host_port_ipv4(5432)
      .await
      .expect("Failed to get port");
    let database_url = format!(
      "postgres://postgres:postgres@{}:{}/postgres",
      host, port
    );

    let pool = PgPoolOptions::new()
      .max_connections(5)
      .connect(&database_url)
      .await
      .expect("Failed to connect to test database");

    super::super::MIGRATOR
      .run(&pool)
      .await
      .expect("Failed to run migrations");

    (pool, container)
  }

  fn new_invoice(number: &str, product: &str) -> NewInvoice {
    NewInvoice::new(
      InvoiceData::parse(
        number.to_string(),
        "1234567890".to_string(),
        "0987654321".to_string(),
        product.to_string(),
        dec!(150.00),
        NaiveDate::from_ymd_opt(2024, 1, 15),
      )
      .unwrap(),
    )
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_create_find_update_delete() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresInvoiceRepository::new(pool);

    let mut invoice = repo.create(new_invoice("F/1/2024", "Widget")).await.unwrap();
    assert_eq!(repo.find_by_id(invoice.id).await.unwrap(), Some(invoice.clone()));

    invoice.update(
      InvoiceData::parse(
        "F/1/2024".to_string(),
        "1234567890".to_string(),
        "0987654321".to_string(),
        "Widget XL".to_string(),
        dec!(175.50),
        None,
      )
      .unwrap(),
    );
    let updated = repo.update(invoice.clone()).await.unwrap();
    assert_eq!(updated, invoice);

    repo.delete(invoice.id).await.unwrap();
    assert!(repo.find_by_id(invoice.id).await.unwrap().is_none());
    assert!(matches!(
      repo.delete(invoice.id).await,
      Err(InvoiceError::NotFound(_))
    ));
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_unique_index_and_exclusion() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresInvoiceRepository::new(pool);

    let first = repo.create(new_invoice("F/1/2024", "Widget")).await.unwrap();

    assert!(repo.exists_by_number("F/1/2024", None).await.unwrap());
    assert!(!repo
      .exists_by_number("F/1/2024", Some(first.id))
      .await
      .unwrap());
    assert!(matches!(
      repo.create(new_invoice("F/1/2024", "Gadget")).await,
      Err(InvoiceError::ConstraintViolation(_))
    ));
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_concurrent_creates_with_same_number() {
    let (pool, _container) = setup_test_db().await;
    let repo = std::sync::Arc::new(PostgresInvoiceRepository::new(pool));

    let a = {
      let repo = repo.clone();
      tokio::spawn(async move { repo.create(new_invoice("F/7/2024", "A")).await })
    };
    let b = {
      let repo = repo.clone();
      tokio::spawn(async move { repo.create(new_invoice("F/7/2024", "B")).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
      .iter()
      .any(|r| matches!(r, Err(InvoiceError::ConstraintViolation(_)))));
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_search_paginates_and_escapes() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresInvoiceRepository::new(pool);

    for n in 1..=12 {
      repo
        .create(new_invoice(&format!("F/{n}/2024"), "Widget"))
        .await
        .unwrap();
    }
    repo.create(new_invoice("S/1", "100% wool")).await.unwrap();

    let first = repo
      .search(&InvoiceSearch::all(), PageRequest::new(1))
      .await
      .unwrap();
    assert_eq!(first.total, 13);
    assert_eq!(first.items.len(), 10);
    assert!(first.items.windows(2).all(|w| w[0].id < w[1].id));

    let widgets = repo
      .search(&InvoiceSearch::new(Some("WIDGET".to_string())), PageRequest::new(2))
      .await
      .unwrap();
    assert_eq!(widgets.total, 12);
    assert_eq!(widgets.items.len(), 2);

    let percent = repo
      .search(&InvoiceSearch::new(Some("0%".to_string())), PageRequest::new(1))
      .await
      .unwrap();
    assert_eq!(percent.total, 1);
  }
}
