use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use super::list_invoices::InvoiceDto;
use crate::domain::invoice::{InvoiceData, InvoiceError, InvoiceId, InvoiceService};

/// Full replacement of the editable fields
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInvoiceCommand {
  pub invoice_id: InvoiceId,
  pub invoice_number: String,
  pub seller_nip: String,
  pub buyer_nip: String,
  pub product_name: String,
  pub net_amount: Decimal,
  pub issuance_date: Option<NaiveDate>,
}

pub type UpdateInvoiceResponse = InvoiceDto;

pub struct UpdateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: UpdateInvoiceCommand,
  ) -> Result<UpdateInvoiceResponse, InvoiceError> {
    let invoice_data = InvoiceData::parse(
      command.invoice_number,
      command.seller_nip,
      command.buyer_nip,
      command.product_name,
      command.net_amount,
      command.issuance_date,
    )?;

    let invoice = self
      .invoice_service
      .update_invoice(command.invoice_id, invoice_data)
      .await?;

    Ok(invoice.into())
  }
}
