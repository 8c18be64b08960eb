use actix_web::{HttpResponse, web};
use serde_json::json;
use std::sync::Arc;

use crate::adapters::http::errors::ApiError;
use crate::domain::invoice::InvoiceService;

/// Health check endpoint; 503 when the database does not answer
pub async fn health_check(
  invoice_service: web::Data<Arc<InvoiceService>>,
) -> Result<HttpResponse, ApiError> {
  invoice_service.check_health().await?;
  Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}
