use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::invoice::{InvoiceError, InvoiceId};

use super::dtos::{ErrorResponse, FormErrors, ValidationErrorResponse};

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Rejected input (422 Unprocessable Entity)
  Validation(FormErrors),

  /// Unknown invoice id (404 Not Found)
  NotFound(InvoiceId),

  /// Unsupported `_method` override (405 Method Not Allowed)
  MethodNotAllowed(String),

  /// Store unreachable (503 Service Unavailable)
  Unavailable(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(errors) => write!(f, "Validation error: {:?}", errors),
      ApiError::NotFound(id) => write!(f, "Invoice not found: {}", id),
      ApiError::MethodNotAllowed(method) => write!(f, "Method not allowed: {}", method),
      ApiError::Unavailable(msg) => write!(f, "Service unavailable: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();

    if let ApiError::Validation(errors) = self {
      return HttpResponse::build(status)
        .content_type(ContentType::json())
        .json(ValidationErrorResponse::new(errors.clone()));
    }

    let (error_type, message) = match self {
      ApiError::Validation(_) => ("validation_error", "The given data was invalid."),
      ApiError::NotFound(_) => ("not_found", "Not Found"),
      ApiError::MethodNotAllowed(_) => ("method_not_allowed", "Method Not Allowed"),
      ApiError::Unavailable(msg) => {
        tracing::error!("Service unavailable: {}", msg);
        ("service_unavailable", "Service temporarily unavailable")
      }
      ApiError::Internal(msg) => {
        // Don't expose internal error details
        tracing::error!("Internal error: {}", msg);
        ("internal_error", "An internal server error occurred")
      }
    };

    let error_response = ErrorResponse {
      error: error_type.to_string(),
      message: message.to_string(),
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::Validation(err) => ApiError::Validation(super::dtos::value_object_errors(&err)),
      InvoiceError::InvoiceNumberAlreadyExists(_) => {
        ApiError::Validation(super::dtos::taken_invoice_number_errors())
      }
      InvoiceError::NotFound(id) => ApiError::NotFound(id),
      InvoiceError::Unavailable(msg) => ApiError::Unavailable(msg),
      InvoiceError::ConstraintViolation(msg) => {
        ApiError::Internal(format!("Constraint violation: {}", msg))
      }
      InvoiceError::CorruptRecord(msg) => ApiError::Internal(format!("Corrupt record: {}", msg)),
      InvoiceError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
    }
  }
}
