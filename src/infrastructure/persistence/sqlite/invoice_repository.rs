use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use crate::domain::invoice::{
  Invoice, InvoiceData, InvoiceId, InvoiceSearch, NewInvoice, Page, PageRequest,
  errors::InvoiceError, ports::InvoiceRepository,
};

const INVOICE_COLUMNS: &str = "id, invoice_number, seller_nip, buyer_nip, product_name, \
  net_amount, issuance_date, created_at, updated_at";

// One flat OR group over the searchable columns; ?1 is the escaped, folded
// pattern or NULL. Text columns are matched through their folded copies,
// NIPs are digits only and need no folding.
const SEARCH_PREDICATE: &str = r#"(?1 IS NULL
  OR invoice_number_folded LIKE ?1 ESCAPE '\'
  OR seller_nip LIKE ?1 ESCAPE '\'
  OR buyer_nip LIKE ?1 ESCAPE '\'
  OR product_name_folded LIKE ?1 ESCAPE '\')"#;

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: i64,
  invoice_number: String,
  seller_nip: String,
  buyer_nip: String,
  product_name: String,
  net_amount: String,
  issuance_date: Option<NaiveDate>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    let net_amount = Decimal::from_str(&row.net_amount).map_err(|e| {
      InvoiceError::CorruptRecord(format!(
        "invoice {} has net_amount '{}': {}",
        row.id, row.net_amount, e
      ))
    })?;
    let data = InvoiceData::parse(
      row.invoice_number,
      row.seller_nip,
      row.buyer_nip,
      row.product_name,
      net_amount,
      row.issuance_date,
    )?;

    let mut invoice = NewInvoice::new(data).with_id(row.id);
    invoice.created_at = row.created_at;
    invoice.updated_at = row.updated_at;
    Ok(invoice)
  }
}

pub struct SqliteInvoiceRepository {
  pool: SqlitePool,
}

impl SqliteInvoiceRepository {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for SqliteInvoiceRepository {
  async fn create(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            INSERT INTO invoices (
                invoice_number, seller_nip, buyer_nip, product_name,
                net_amount, issuance_date, created_at, updated_at,
                invoice_number_folded, product_name_folded
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(invoice.invoice_number.value())
    .bind(invoice.seller_nip.value())
    .bind(invoice.buyer_nip.value())
    .bind(invoice.product_name.value())
    .bind(invoice.net_amount.value().to_string())
    .bind(invoice.issuance_date)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .bind(InvoiceSearch::fold(invoice.invoice_number.value()))
    .bind(InvoiceSearch::fold(invoice.product_name.value()))
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET invoice_number = ?2, seller_nip = ?3, buyer_nip = ?4,
                product_name = ?5, net_amount = ?6, issuance_date = ?7,
                updated_at = ?8, invoice_number_folded = ?9,
                product_name_folded = ?10
            WHERE id = ?1
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.seller_nip.value())
    .bind(invoice.buyer_nip.value())
    .bind(invoice.product_name.value())
    .bind(invoice.net_amount.value().to_string())
    .bind(invoice.issuance_date)
    .bind(invoice.updated_at)
    .bind(InvoiceSearch::fold(invoice.invoice_number.value()))
    .bind(InvoiceSearch::fold(invoice.product_name.value()))
    .fetch_optional(&self.pool)
    .await?
    .ok_or(InvoiceError::NotFound(invoice.id))?;

    row.try_into()
  }

  async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
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
    let (count,): (i64,) = sqlx::query_as(
      r#"
            SELECT COUNT(*) FROM invoices
            WHERE invoice_number = ?1 AND (?2 IS NULL OR id <> ?2)
            "#,
    )
    .bind(invoice_number)
    .bind(exclude_id)
    .fetch_one(&self.pool)
    .await?;

    Ok(count > 0)
  }

  async fn search(
    &self,
    search: &InvoiceSearch,
    page: PageRequest,
  ) -> Result<Page<Invoice>, InvoiceError> {
    let pattern = search.like_pattern();

    let (total,): (i64,) = sqlx::query_as(&format!(
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
            LIMIT ?2 OFFSET ?3
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
    let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
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
