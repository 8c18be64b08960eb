pub mod dtos;
pub mod errors;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod templates;

// Re-export commonly used types
pub use dtos::{ErrorResponse, FormErrors, InvoiceForm, ValidationErrorResponse};
pub use errors::ApiError;
pub use flash::{FLASH_COOKIE, FlashMessage};
pub use middleware::{RequestId, RequestIdMiddleware};
pub use routes::{InvoiceRouteDependencies, configure_invoice_routes, configure_web_routes};
pub use templates::TemplateEngine;
