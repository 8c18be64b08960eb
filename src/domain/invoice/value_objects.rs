use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const INVOICE_NUMBER_MAX_CHARS: usize = 50;
pub const PRODUCT_NAME_MAX_CHARS: usize = 255;
pub const NIP_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid seller NIP: {0}")]
  InvalidSellerNip(String),
  #[error("Invalid buyer NIP: {0}")]
  InvalidBuyerNip(String),
  #[error("Invalid product name: {0}")]
  InvalidProductName(String),
  #[error("Invalid net amount: {0}")]
  InvalidNetAmount(String),
}

impl ValueObjectError {
  /// Name of the input field the error belongs to
  pub fn field(&self) -> &'static str {
    match self {
      ValueObjectError::InvalidInvoiceNumber(_) => "invoice_number",
      ValueObjectError::InvalidSellerNip(_) => "seller_nip",
      ValueObjectError::InvalidBuyerNip(_) => "buyer_nip",
      ValueObjectError::InvalidProductName(_) => "product_name",
      ValueObjectError::InvalidNetAmount(_) => "net_amount",
    }
  }

  pub fn reason(&self) -> &str {
    match self {
      ValueObjectError::InvalidInvoiceNumber(reason)
      | ValueObjectError::InvalidSellerNip(reason)
      | ValueObjectError::InvalidBuyerNip(reason)
      | ValueObjectError::InvalidProductName(reason)
      | ValueObjectError::InvalidNetAmount(reason) => reason,
    }
  }
}

// Invoice Number - free text, unique across the register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.chars().count() > INVOICE_NUMBER_MAX_CHARS {
      return Err(ValueObjectError::InvalidInvoiceNumber(format!(
        "Invoice number cannot exceed {} characters",
        INVOICE_NUMBER_MAX_CHARS
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Which side of the transaction a NIP identifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NipRole {
  Seller,
  Buyer,
}

// NIP - Polish taxpayer identification number, exactly ten ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nip(String);

impl Nip {
  pub fn new(value: String, role: NipRole) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.len() != NIP_LENGTH || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
      let reason = format!("NIP must consist of exactly {} digits", NIP_LENGTH);
      return Err(match role {
        NipRole::Seller => ValueObjectError::InvalidSellerNip(reason),
        NipRole::Buyer => ValueObjectError::InvalidBuyerNip(reason),
      });
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for Nip {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Product Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductName(String);

impl ProductName {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidProductName(
        "Product name cannot be empty".to_string(),
      ));
    }
    if trimmed.chars().count() > PRODUCT_NAME_MAX_CHARS {
      return Err(ValueObjectError::InvalidProductName(format!(
        "Product name cannot exceed {} characters",
        PRODUCT_NAME_MAX_CHARS
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

// Net Amount - non-negative decimal, no currency attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetAmount(Decimal);

impl NetAmount {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ZERO {
      return Err(ValueObjectError::InvalidNetAmount(
        "Net amount cannot be negative".to_string(),
      ));
    }
    // normalize "-0" so it never renders with a sign
    Ok(Self(if value.is_zero() { value.abs() } else { value }))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

impl FromStr for NetAmount {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let value = Decimal::from_str(trimmed)
      .or_else(|_| Decimal::from_scientific(trimmed))
      .map_err(|_| ValueObjectError::InvalidNetAmount(format!("Not a number: {}", s)))?;
    Self::new(value)
  }
}

impl fmt::Display for NetAmount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
