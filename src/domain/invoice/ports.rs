use async_trait::async_trait;

use super::entities::{Invoice, InvoiceId, NewInvoice};
use super::errors::InvoiceError;
use super::search::{InvoiceSearch, Page, PageRequest};

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  async fn create(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError>;
  /// Fails with `NotFound` when no row has the invoice's id
  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;
  async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceError>;
  async fn exists_by_number(
    &self,
    invoice_number: &str,
    exclude_id: Option<InvoiceId>,
  ) -> Result<bool, InvoiceError>;
  /// Ordered by ascending id
  async fn search(
    &self,
    search: &InvoiceSearch,
    page: PageRequest,
  ) -> Result<Page<Invoice>, InvoiceError>;
  /// Fails with `NotFound` when no row has the id
  async fn delete(&self, id: InvoiceId) -> Result<(), InvoiceError>;
  /// Round trip to the store, used by the health endpoint
  async fn ping(&self) -> Result<(), InvoiceError>;
}
