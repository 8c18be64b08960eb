use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{Invoice, InvoiceError, InvoiceSearch, InvoiceService, Page, PageRequest};

/// Date format of `updated_at_formatted`
pub const UPDATED_AT_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub struct ListInvoicesCommand {
  pub search: Option<String>,
  pub page: u32,
}

/// Invoice as shown on every page, with the list view's formatted date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDto {
  pub id: i64,
  pub invoice_number: String,
  pub seller_nip: String,
  pub buyer_nip: String,
  pub product_name: String,
  pub net_amount: Decimal,
  pub issuance_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub updated_at_formatted: String,
}

impl From<Invoice> for InvoiceDto {
  fn from(invoice: Invoice) -> Self {
    let updated_at_formatted = invoice.updated_on().format(UPDATED_AT_FORMAT).to_string();
    Self {
      id: invoice.id,
      invoice_number: invoice.invoice_number.into_inner(),
      seller_nip: invoice.seller_nip.into_inner(),
      buyer_nip: invoice.buyer_nip.into_inner(),
      product_name: invoice.product_name.into_inner(),
      net_amount: invoice.net_amount.value(),
      issuance_date: invoice.issuance_date,
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
      updated_at_formatted,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Page<InvoiceDto>,
  /// Normalized term actually applied, `None` when unfiltered
  pub search: Option<String>,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let search = InvoiceSearch::new(command.search);
    let page = PageRequest::new(command.page);

    let invoices = self
      .invoice_service
      .search_invoices(&search, page)
      .await?
      .map(InvoiceDto::from);

    tracing::debug!(
      search = ?search.term(),
      page = page.page(),
      total = invoices.total,
      "Listed invoices"
    );

    Ok(ListInvoicesResponse {
      invoices,
      search: search.term().map(str::to_string),
    })
  }
}
