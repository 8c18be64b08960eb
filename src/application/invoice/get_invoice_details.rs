use serde::Deserialize;
use std::sync::Arc;

use super::list_invoices::InvoiceDto;
use crate::domain::invoice::{InvoiceError, InvoiceId, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct GetInvoiceDetailsCommand {
  pub invoice_id: InvoiceId,
}

pub struct GetInvoiceDetailsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: GetInvoiceDetailsCommand) -> Result<InvoiceDto, InvoiceError> {
    let invoice = self
      .invoice_service
      .get_invoice(command.invoice_id)
      .await?;

    Ok(invoice.into())
  }
}
