//! One-shot success message carried across the post/redirect/get cycle.
//!
//! Mutating handlers return a `303 See Other` with a `flash` cookie holding a
//! message code. The list page resolves the code to text and tells the client
//! to drop the cookie, so the message shows exactly once.

use actix_web::{
  HttpRequest, HttpResponse,
  cookie::{Cookie, SameSite, time::Duration},
  http::header,
};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashMessage {
  InvoiceCreated,
  InvoiceUpdated,
  InvoiceDeleted,
}

impl FlashMessage {
  pub fn code(&self) -> &'static str {
    match self {
      FlashMessage::InvoiceCreated => "invoice_created",
      FlashMessage::InvoiceUpdated => "invoice_updated",
      FlashMessage::InvoiceDeleted => "invoice_deleted",
    }
  }

  /// Unknown codes yield `None`
  pub fn from_code(code: &str) -> Option<Self> {
    match code {
      "invoice_created" => Some(FlashMessage::InvoiceCreated),
      "invoice_updated" => Some(FlashMessage::InvoiceUpdated),
      "invoice_deleted" => Some(FlashMessage::InvoiceDeleted),
      _ => None,
    }
  }

  pub fn text(&self) -> &'static str {
    match self {
      FlashMessage::InvoiceCreated => "Invoice added.",
      FlashMessage::InvoiceUpdated => "Invoice updated.",
      FlashMessage::InvoiceDeleted => "Invoice deleted.",
    }
  }

  pub fn cookie(&self) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, self.code())
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .max_age(Duration::minutes(5))
      .finish()
  }

  /// Pending message of the current request, if any
  pub fn from_request(req: &HttpRequest) -> Option<Self> {
    req
      .cookie(FLASH_COOKIE)
      .and_then(|cookie| Self::from_code(cookie.value()))
  }

  /// Cookie that makes the client forget the consumed message
  pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, "")
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .max_age(Duration::seconds(0))
      .finish()
  }

  /// `303 See Other` to `location`, carrying this message
  pub fn redirect(self, location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
      .cookie(self.cookie())
      .insert_header((header::LOCATION, location.to_string()))
      .finish()
  }
}
