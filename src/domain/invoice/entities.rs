use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{
  InvoiceNumber, NetAmount, Nip, NipRole, ProductName, ValueObjectError,
};

pub type InvoiceId = i64;

/// Current time at the precision the stores keep (microseconds)
fn now() -> DateTime<Utc> {
  Utc::now().trunc_subsecs(6)
}

/// Validated field set accepted by create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceData {
  pub invoice_number: InvoiceNumber,
  pub seller_nip: Nip,
  pub buyer_nip: Nip,
  pub product_name: ProductName,
  pub net_amount: NetAmount,
  pub issuance_date: Option<NaiveDate>,
}

impl InvoiceData {
  pub fn parse(
    invoice_number: String,
    seller_nip: String,
    buyer_nip: String,
    product_name: String,
    net_amount: Decimal,
    issuance_date: Option<NaiveDate>,
  ) -> Result<Self, ValueObjectError> {
    Ok(Self {
      invoice_number: InvoiceNumber::new(invoice_number)?,
      seller_nip: Nip::new(seller_nip, NipRole::Seller)?,
      buyer_nip: Nip::new(buyer_nip, NipRole::Buyer)?,
      product_name: ProductName::new(product_name)?,
      net_amount: NetAmount::new(net_amount)?,
      issuance_date,
    })
  }
}

// Invoice that has not been persisted yet; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
  pub invoice_number: InvoiceNumber,
  pub seller_nip: Nip,
  pub buyer_nip: Nip,
  pub product_name: ProductName,
  pub net_amount: NetAmount,
  pub issuance_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl NewInvoice {
  pub fn new(data: InvoiceData) -> Self {
    let now = now();
    Self {
      invoice_number: data.invoice_number,
      seller_nip: data.seller_nip,
      buyer_nip: data.buyer_nip,
      product_name: data.product_name,
      net_amount: data.net_amount,
      issuance_date: data.issuance_date,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn with_id(self, id: InvoiceId) -> Invoice {
    Invoice {
      id,
      invoice_number: self.invoice_number,
      seller_nip: self.seller_nip,
      buyer_nip: self.buyer_nip,
      product_name: self.product_name,
      net_amount: self.net_amount,
      issuance_date: self.issuance_date,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

// Invoice - the persisted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: InvoiceId,
  pub invoice_number: InvoiceNumber,
  pub seller_nip: Nip,
  pub buyer_nip: Nip,
  pub product_name: ProductName,
  pub net_amount: NetAmount,
  pub issuance_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  /// Overwrites every editable field and bumps `updated_at`
  pub fn update(&mut self, data: InvoiceData) {
    self.invoice_number = data.invoice_number;
    self.seller_nip = data.seller_nip;
    self.buyer_nip = data.buyer_nip;
    self.product_name = data.product_name;
    self.net_amount = data.net_amount;
    self.issuance_date = data.issuance_date;
    self.touch();
  }

  /// `updated_at` must strictly increase even when the clock has not moved
  /// past the stored microsecond
  fn touch(&mut self) {
    let floor = self.updated_at + Duration::microseconds(1);
    self.updated_at = now().max(floor);
  }

  pub fn updated_on(&self) -> NaiveDate {
    self.updated_at.date_naive()
  }
}
