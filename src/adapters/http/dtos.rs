use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::application::invoice::{
  CreateInvoiceCommand, InvoiceDto, ListInvoicesResponse, UpdateInvoiceCommand,
};
use crate::domain::invoice::{InvoiceId, NetAmount, Page, ValueObjectError};

lazy_static! {
  /// Ten ASCII digits; blank input is left to the `required` rule
  static ref NIP_PATTERN: Regex = Regex::new(r"^(?:[0-9]{10})?$").unwrap();
  static ref NUMERIC_PATTERN: Regex =
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap();
}

pub const ISSUANCE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Standard error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,
}

/// Per-field validation messages, keyed by input name
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// 422 JSON body for rejected invoice input
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
  pub message: String,
  pub errors: FormErrors,
}

impl ValidationErrorResponse {
  pub fn new(errors: FormErrors) -> Self {
    let message = errors
      .values()
      .flatten()
      .next()
      .cloned()
      .unwrap_or_else(|| "The given data was invalid.".to_string());
    Self { message, errors }
  }
}

pub fn taken_invoice_number_errors() -> FormErrors {
  FormErrors::from([(
    "invoice_number".to_string(),
    vec!["The invoice number has already been taken.".to_string()],
  )])
}

/// Field errors for a value object that rejected already-validated input
pub fn value_object_errors(error: &ValueObjectError) -> FormErrors {
  FormErrors::from([(error.field().to_string(), vec![error.reason().to_string()])])
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
  String(String),
  Number(serde_json::Number),
}

/// Accepts strings, JSON numbers and null so that both form and JSON bodies
/// reach validation instead of failing in the extractor
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
    Some(StringOrNumber::String(value)) => value,
    Some(StringOrNumber::Number(value)) => value.to_string(),
    None => String::new(),
  })
}

fn message(code: &'static str, message: &'static str) -> ValidationError {
  let mut error = ValidationError::new(code);
  error.message = Some(Cow::Borrowed(message));
  error
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("required"));
  }
  Ok(())
}

fn validate_net_amount(value: &str) -> Result<(), ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(message("required", "The net amount field is required."));
  }
  let amount = NUMERIC_PATTERN
    .is_match(value)
    .then(|| {
      Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
    })
    .flatten()
    .ok_or_else(|| message("numeric", "The net amount field must be a number."))?;
  if amount < Decimal::ZERO {
    return Err(message("min", "The net amount field must be at least 0."));
  }
  Ok(())
}

fn validate_issuance_date(value: &str) -> Result<(), ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Ok(());
  }
  NaiveDate::parse_from_str(value, ISSUANCE_DATE_FORMAT)
    .map(|_| ())
    .map_err(|_| message("date", "The issuance date field must be a valid date."))
}

/// Invoice fields as submitted by the create and edit forms (or as JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InvoiceForm {
  #[serde(default, deserialize_with = "lenient_string")]
  #[validate(
    custom(function = "validate_required", message = "The invoice number field is required."),
    length(
      max = 50,
      message = "The invoice number field must not be greater than 50 characters."
    )
  )]
  pub invoice_number: String,

  #[serde(default, deserialize_with = "lenient_string")]
  #[validate(
    custom(function = "validate_required", message = "The seller nip field is required."),
    regex(path = *NIP_PATTERN, message = "The seller nip field must be 10 digits.")
  )]
  pub seller_nip: String,

  #[serde(default, deserialize_with = "lenient_string")]
  #[validate(
    custom(function = "validate_required", message = "The buyer nip field is required."),
    regex(path = *NIP_PATTERN, message = "The buyer nip field must be 10 digits.")
  )]
  pub buyer_nip: String,

  #[serde(default, deserialize_with = "lenient_string")]
  #[validate(
    custom(function = "validate_required", message = "The product name field is required."),
    length(
      max = 255,
      message = "The product name field must not be greater than 255 characters."
    )
  )]
  pub product_name: String,

  #[serde(default, deserialize_with = "lenient_string")]
  #[validate(custom(function = "validate_net_amount"))]
  pub net_amount: String,

  #[serde(default, deserialize_with = "lenient_string")]
  #[validate(custom(function = "validate_issuance_date"))]
  pub issuance_date: String,

  /// HTML forms tunnel PUT/PATCH/DELETE through POST with this field
  #[serde(rename = "_method", default, skip_serializing)]
  pub method: Option<String>,
}

/// Field values that passed every static rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
  pub invoice_number: String,
  pub seller_nip: String,
  pub buyer_nip: String,
  pub product_name: String,
  pub net_amount: Decimal,
  pub issuance_date: Option<NaiveDate>,
}

impl ValidatedInvoice {
  pub fn into_create_command(self) -> CreateInvoiceCommand {
    CreateInvoiceCommand {
      invoice_number: self.invoice_number,
      seller_nip: self.seller_nip,
      buyer_nip: self.buyer_nip,
      product_name: self.product_name,
      net_amount: self.net_amount,
      issuance_date: self.issuance_date,
    }
  }

  pub fn into_update_command(self, invoice_id: InvoiceId) -> UpdateInvoiceCommand {
    UpdateInvoiceCommand {
      invoice_id,
      invoice_number: self.invoice_number,
      seller_nip: self.seller_nip,
      buyer_nip: self.buyer_nip,
      product_name: self.product_name,
      net_amount: self.net_amount,
      issuance_date: self.issuance_date,
    }
  }
}

impl InvoiceForm {
  /// Prefills the edit form from a stored invoice
  pub fn from_invoice(invoice: &InvoiceDto) -> Self {
    Self {
      invoice_number: invoice.invoice_number.clone(),
      seller_nip: invoice.seller_nip.clone(),
      buyer_nip: invoice.buyer_nip.clone(),
      product_name: invoice.product_name.clone(),
      net_amount: invoice.net_amount.to_string(),
      issuance_date: invoice
        .issuance_date
        .map(|date| date.format(ISSUANCE_DATE_FORMAT).to_string())
        .unwrap_or_default(),
      method: None,
    }
  }

  /// Surrounding whitespace is not part of any value
  pub fn trimmed(self) -> Self {
    Self {
      invoice_number: self.invoice_number.trim().to_string(),
      seller_nip: self.seller_nip.trim().to_string(),
      buyer_nip: self.buyer_nip.trim().to_string(),
      product_name: self.product_name.trim().to_string(),
      net_amount: self.net_amount.trim().to_string(),
      issuance_date: self.issuance_date.trim().to_string(),
      method: self.method,
    }
  }

  /// Runs every rule and collects all failures by field
  pub fn validated(&self) -> Result<ValidatedInvoice, FormErrors> {
    self.validate().map_err(|errors| form_errors(&errors))?;

    let net_amount = NetAmount::from_str(&self.net_amount)
      .map_err(|e| value_object_errors(&e))?
      .value();
    let issuance_date = if self.issuance_date.is_empty() {
      None
    } else {
      NaiveDate::parse_from_str(&self.issuance_date, ISSUANCE_DATE_FORMAT).ok()
    };

    Ok(ValidatedInvoice {
      invoice_number: self.invoice_number.clone(),
      seller_nip: self.seller_nip.clone(),
      buyer_nip: self.buyer_nip.clone(),
      product_name: self.product_name.clone(),
      net_amount,
      issuance_date,
    })
  }
}

/// Flattens validator output into the field → messages map the forms render
pub fn form_errors(errors: &ValidationErrors) -> FormErrors {
  errors
    .field_errors()
    .into_iter()
    .map(|(field, errors)| {
      let messages = errors
        .iter()
        .map(|error| {
          error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("The {} field is invalid.", field.replace('_', " ")))
        })
        .collect();
      (field.to_string(), messages)
    })
    .collect()
}

/// Query string of `GET /invoices`
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListQuery {
  pub search: Option<String>,
  pub page: Option<String>,
}

impl InvoiceListQuery {
  /// Missing, non-numeric and sub-1 pages all mean the first page
  pub fn page(&self) -> u32 {
    self
      .page
      .as_deref()
      .and_then(|p| p.trim().parse::<u32>().ok())
      .filter(|p| *p >= 1)
      .unwrap_or(1)
  }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
  pub current_page: u32,
  pub per_page: u32,
  pub total: u64,
  pub last_page: u32,
  pub from: Option<u64>,
  pub to: Option<u64>,
  pub has_previous: bool,
  pub has_next: bool,
  pub prev_page_url: Option<String>,
  pub next_page_url: Option<String>,
}

impl PaginationMeta {
  /// Links keep the active search term
  pub fn new<T>(page: &Page<T>, path: &str, search: Option<&str>) -> Self {
    let link = |target: u32| {
      let mut query: Vec<(&str, String)> = Vec::new();
      if let Some(search) = search {
        query.push(("search", search.to_string()));
      }
      query.push(("page", target.to_string()));
      match serde_urlencoded::to_string(&query) {
        Ok(qs) => format!("{}?{}", path, qs),
        Err(_) => format!("{}?page={}", path, target),
      }
    };

    Self {
      current_page: page.current_page,
      per_page: page.per_page,
      total: page.total,
      last_page: page.last_page(),
      from: page.from(),
      to: page.to(),
      has_previous: page.has_previous(),
      has_next: page.has_next(),
      prev_page_url: page
        .has_previous()
        .then(|| link((page.current_page - 1).min(page.last_page()))),
      next_page_url: page.has_next().then(|| link(page.current_page + 1)),
    }
  }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedInvoices {
  pub data: Vec<InvoiceDto>,
  pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct InvoiceFilters {
  pub search: Option<String>,
}

/// Everything the list page shows
#[derive(Debug, Serialize)]
pub struct InvoiceIndexPayload {
  pub invoices: PaginatedInvoices,
  pub filters: InvoiceFilters,
  pub success: Option<&'static str>,
}

impl InvoiceIndexPayload {
  pub fn new(response: ListInvoicesResponse, path: &str, success: Option<&'static str>) -> Self {
    let pagination = PaginationMeta::new(&response.invoices, path, response.search.as_deref());
    Self {
      invoices: PaginatedInvoices {
        data: response.invoices.items,
        pagination,
      },
      filters: InvoiceFilters {
        search: response.search,
      },
      success,
    }
  }
}

/// Create and edit pages: the invoice (on edit), submitted values and errors
#[derive(Debug, Serialize)]
pub struct InvoiceFormPayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub invoice: Option<InvoiceDto>,
  pub form: InvoiceForm,
  pub errors: FormErrors,
}
