use std::sync::Arc;

use super::entities::{Invoice, InvoiceData, InvoiceId, NewInvoice};
use super::errors::InvoiceError;
use super::ports::InvoiceRepository;
use super::search::{InvoiceSearch, Page, PageRequest};

/// Invoice register rules on top of the repository: number uniqueness and
/// not-found handling
pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceService {
  pub fn new(invoice_repo: Arc<dyn InvoiceRepository>) -> Self {
    Self { invoice_repo }
  }

  pub async fn search_invoices(
    &self,
    search: &InvoiceSearch,
    page: PageRequest,
  ) -> Result<Page<Invoice>, InvoiceError> {
    self.invoice_repo.search(search, page).await
  }

  pub async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::NotFound(invoice_id))
  }

  pub async fn create_invoice(&self, data: InvoiceData) -> Result<Invoice, InvoiceError> {
    self
      .ensure_number_available(data.invoice_number.value(), None)
      .await?;

    let invoice = self.invoice_repo.create(NewInvoice::new(data)).await?;
    tracing::info!(
      invoice_id = invoice.id,
      invoice_number = %invoice.invoice_number,
      "Invoice created"
    );
    Ok(invoice)
  }

  pub async fn update_invoice(
    &self,
    invoice_id: InvoiceId,
    data: InvoiceData,
  ) -> Result<Invoice, InvoiceError> {
    let mut invoice = self.get_invoice(invoice_id).await?;

    // the record may keep its own number
    self
      .ensure_number_available(data.invoice_number.value(), Some(invoice_id))
      .await?;

    invoice.update(data);
    let invoice = self.invoice_repo.update(invoice).await?;
    tracing::info!(invoice_id = invoice.id, "Invoice updated");
    Ok(invoice)
  }

  pub async fn delete_invoice(&self, invoice_id: InvoiceId) -> Result<(), InvoiceError> {
    let invoice = self.get_invoice(invoice_id).await?;
    self.invoice_repo.delete(invoice.id).await?;
    tracing::info!(invoice_id, "Invoice deleted");
    Ok(())
  }

  pub async fn check_health(&self) -> Result<(), InvoiceError> {
    self.invoice_repo.ping().await
  }

  async fn ensure_number_available(
    &self,
    invoice_number: &str,
    exclude_id: Option<InvoiceId>,
  ) -> Result<(), InvoiceError> {
    if self
      .invoice_repo
      .exists_by_number(invoice_number, exclude_id)
      .await?
    {
      return Err(InvoiceError::InvoiceNumberAlreadyExists(
        invoice_number.to_string(),
      ));
    }
    Ok(())
  }
}
