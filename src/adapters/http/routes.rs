use actix_web::web;
use std::sync::Arc;

use crate::application::invoice::{
  CreateInvoiceUseCase, DeleteInvoiceUseCase, GetInvoiceDetailsUseCase, ListInvoicesUseCase,
  UpdateInvoiceUseCase,
};
use crate::domain::invoice::InvoiceService;

use super::handlers::{invoices_web, pages};
use super::templates::TemplateEngine;

/// Everything the invoice pages need, shared by all workers
#[derive(Clone)]
pub struct InvoiceRouteDependencies {
  pub list_invoices_use_case: Arc<ListInvoicesUseCase>,
  pub create_invoice_use_case: Arc<CreateInvoiceUseCase>,
  pub get_invoice_details_use_case: Arc<GetInvoiceDetailsUseCase>,
  pub update_invoice_use_case: Arc<UpdateInvoiceUseCase>,
  pub delete_invoice_use_case: Arc<DeleteInvoiceUseCase>,
}

impl InvoiceRouteDependencies {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self {
      list_invoices_use_case: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
      create_invoice_use_case: Arc::new(CreateInvoiceUseCase::new(invoice_service.clone())),
      get_invoice_details_use_case: Arc::new(GetInvoiceDetailsUseCase::new(
        invoice_service.clone(),
      )),
      update_invoice_use_case: Arc::new(UpdateInvoiceUseCase::new(invoice_service.clone())),
      delete_invoice_use_case: Arc::new(DeleteInvoiceUseCase::new(invoice_service)),
    }
  }
}

/// Configure web UI routes
///
/// # Routes
///
/// - GET / - Redirect to /invoices
/// - GET /health - Liveness probe that round-trips to the database
pub fn configure_web_routes(
  cfg: &mut web::ServiceConfig,
  templates: TemplateEngine,
  invoice_service: Arc<InvoiceService>,
) {
  cfg
    .app_data(web::Data::new(templates))
    .app_data(web::Data::new(invoice_service))
    .route("/", web::get().to(invoices_web::home_redirect))
    .route("/health", web::get().to(pages::health_check));
}

/// Configure invoice routes
///
/// Mounts the resource under the provided scope (normally `/invoices`).
///
/// # Routes
///
/// - GET "" - List with `search` and `page` query parameters
/// - GET /create - Empty form
/// - POST "" - Create
/// - GET /{id}/edit - Prefilled form
/// - PUT|PATCH /{id} - Update
/// - DELETE /{id} - Delete
/// - POST /{id} - Update or delete chosen by the `_method` form field
pub fn configure_invoice_routes(cfg: &mut web::ServiceConfig, deps: InvoiceRouteDependencies) {
  cfg
    .app_data(web::Data::new(deps.list_invoices_use_case))
    .app_data(web::Data::new(deps.create_invoice_use_case))
    .app_data(web::Data::new(deps.get_invoice_details_use_case))
    .app_data(web::Data::new(deps.update_invoice_use_case))
    .app_data(web::Data::new(deps.delete_invoice_use_case))
    .service(
      web::resource("")
        .route(web::get().to(invoices_web::invoices_page))
        .route(web::post().to(invoices_web::store_invoice)),
    )
    .route("/create", web::get().to(invoices_web::invoice_create_page))
    .route("/{id}/edit", web::get().to(invoices_web::invoice_edit_page))
    .service(
      web::resource("/{id}")
        .route(web::put().to(invoices_web::update_invoice))
        .route(web::patch().to(invoices_web::update_invoice))
        .route(web::delete().to(invoices_web::delete_invoice))
        .route(web::post().to(invoices_web::invoice_method_override)),
    );
}
