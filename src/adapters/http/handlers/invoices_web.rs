use actix_web::{
  HttpRequest, HttpResponse,
  http::{
    StatusCode,
    header::{self, Accept, Header},
  },
  web,
};
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::http::{
  dtos::{
    FormErrors, InvoiceForm, InvoiceFormPayload, InvoiceIndexPayload, InvoiceListQuery,
  },
  errors::ApiError,
  flash::{FLASH_COOKIE, FlashMessage},
  templates::TemplateEngine,
};
use crate::application::invoice::{
  CreateInvoiceUseCase, DeleteInvoiceCommand, DeleteInvoiceUseCase, GetInvoiceDetailsCommand,
  GetInvoiceDetailsUseCase, InvoiceDto, ListInvoicesCommand, ListInvoicesUseCase,
  UpdateInvoiceUseCase,
};
use crate::domain::invoice::InvoiceId;

pub const INVOICES_PATH: &str = "/invoices";

/// Invoice input as an urlencoded form or a JSON document
pub type InvoiceBody = web::Either<web::Form<InvoiceForm>, web::Json<InvoiceForm>>;

fn into_form(body: InvoiceBody) -> InvoiceForm {
  match body {
    web::Either::Left(form) => form.into_inner(),
    web::Either::Right(json) => json.into_inner(),
  }
  .trimmed()
}

/// True when the client ranks `application/json` above HTML
pub fn wants_json(req: &HttpRequest) -> bool {
  Accept::parse(req)
    .ok()
    .and_then(|accept| accept.ranked().into_iter().next())
    .is_some_and(|mime| mime.essence_str() == "application/json")
}

fn render<T: Serialize>(
  templates: &TemplateEngine,
  template: &str,
  payload: &T,
  status: StatusCode,
) -> Result<HttpResponse, ApiError> {
  let context = tera::Context::from_serialize(payload)
    .map_err(|e| ApiError::Internal(format!("Template context error: {}", e)))?;

  let html = templates
    .render(template, &context)
    .map_err(|e| ApiError::Internal(format!("Template error: {}", e)))?;

  Ok(
    HttpResponse::build(status)
      .content_type("text/html; charset=utf-8")
      .body(html),
  )
}

fn respond<T: Serialize>(
  req: &HttpRequest,
  templates: &TemplateEngine,
  template: &str,
  payload: &T,
  status: StatusCode,
) -> Result<HttpResponse, ApiError> {
  if wants_json(req) {
    return Ok(HttpResponse::build(status).json(payload));
  }
  render(templates, template, payload, status)
}

/// Validation failures re-render the form for browsers and stay JSON otherwise
fn reject_form(
  req: &HttpRequest,
  templates: &TemplateEngine,
  template: &str,
  invoice: Option<InvoiceDto>,
  form: InvoiceForm,
  errors: FormErrors,
) -> Result<HttpResponse, ApiError> {
  if wants_json(req) {
    return Err(ApiError::Validation(errors));
  }
  tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Invoice form rejected");
  let payload = InvoiceFormPayload {
    invoice,
    form,
    errors,
  };
  render(templates, template, &payload, StatusCode::UNPROCESSABLE_ENTITY)
}

// GET / - Redirect to the invoice list
pub async fn home_redirect() -> HttpResponse {
  HttpResponse::Found()
    .insert_header((header::LOCATION, INVOICES_PATH))
    .finish()
}

// GET /invoices - Paginated, searchable invoice list
pub async fn invoices_page(
  req: HttpRequest,
  query: web::Query<InvoiceListQuery>,
  templates: web::Data<TemplateEngine>,
  list_invoices_use_case: web::Data<Arc<ListInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let flash = FlashMessage::from_request(&req);
  let query = query.into_inner();
  let page = query.page();

  let response = list_invoices_use_case
    .execute(ListInvoicesCommand {
      search: query.search,
      page,
    })
    .await?;

  let payload = InvoiceIndexPayload::new(response, INVOICES_PATH, flash.map(|f| f.text()));
  let mut response = respond(
    &req,
    &templates,
    "pages/invoices.html.tera",
    &payload,
    StatusCode::OK,
  )?;

  // the message has been shown, drop it
  if req.cookie(FLASH_COOKIE).is_some() {
    response
      .add_cookie(&FlashMessage::removal_cookie())
      .map_err(|e| ApiError::Internal(format!("Cookie error: {}", e)))?;
  }

  Ok(response)
}

// GET /invoices/create - Empty invoice form
pub async fn invoice_create_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
) -> Result<HttpResponse, ApiError> {
  let payload = InvoiceFormPayload {
    invoice: None,
    form: InvoiceForm::default(),
    errors: FormErrors::new(),
  };

  respond(
    &req,
    &templates,
    "pages/invoice_create.html.tera",
    &payload,
    StatusCode::OK,
  )
}

// POST /invoices - Create a new invoice
pub async fn store_invoice(
  req: HttpRequest,
  body: InvoiceBody,
  templates: web::Data<TemplateEngine>,
  create_invoice_use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let form = into_form(body);

  let validated = match form.validated() {
    Ok(validated) => validated,
    Err(errors) => {
      return reject_form(
        &req,
        &templates,
        "pages/invoice_create.html.tera",
        None,
        form,
        errors,
      );
    }
  };

  match create_invoice_use_case
    .execute(validated.into_create_command())
    .await
    .map_err(ApiError::from)
  {
    Ok(_) => Ok(FlashMessage::InvoiceCreated.redirect(INVOICES_PATH)),
    Err(ApiError::Validation(errors)) => reject_form(
      &req,
      &templates,
      "pages/invoice_create.html.tera",
      None,
      form,
      errors,
    ),
    Err(e) => Err(e),
  }
}

// GET /invoices/{id}/edit - Invoice form prefilled with the stored values
pub async fn invoice_edit_page(
  req: HttpRequest,
  path: web::Path<InvoiceId>,
  templates: web::Data<TemplateEngine>,
  get_invoice_details_use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let invoice = get_invoice_details_use_case
    .execute(GetInvoiceDetailsCommand {
      invoice_id: path.into_inner(),
    })
    .await?;

  let payload = InvoiceFormPayload {
    form: InvoiceForm::from_invoice(&invoice),
    invoice: Some(invoice),
    errors: FormErrors::new(),
  };

  respond(
    &req,
    &templates,
    "pages/invoice_edit.html.tera",
    &payload,
    StatusCode::OK,
  )
}

async fn apply_update(
  req: &HttpRequest,
  invoice_id: InvoiceId,
  form: InvoiceForm,
  templates: &TemplateEngine,
  get_invoice_details_use_case: &GetInvoiceDetailsUseCase,
  update_invoice_use_case: &UpdateInvoiceUseCase,
) -> Result<HttpResponse, ApiError> {
  // unknown ids are a 404 whatever the input
  let invoice = get_invoice_details_use_case
    .execute(GetInvoiceDetailsCommand { invoice_id })
    .await?;

  let validated = match form.validated() {
    Ok(validated) => validated,
    Err(errors) => {
      return reject_form(
        req,
        templates,
        "pages/invoice_edit.html.tera",
        Some(invoice),
        form,
        errors,
      );
    }
  };

  match update_invoice_use_case
    .execute(validated.into_update_command(invoice_id))
    .await
    .map_err(ApiError::from)
  {
    Ok(_) => Ok(FlashMessage::InvoiceUpdated.redirect(INVOICES_PATH)),
    Err(ApiError::Validation(errors)) => reject_form(
      req,
      templates,
      "pages/invoice_edit.html.tera",
      Some(invoice),
      form,
      errors,
    ),
    Err(e) => Err(e),
  }
}

async fn apply_delete(
  invoice_id: InvoiceId,
  delete_invoice_use_case: &DeleteInvoiceUseCase,
) -> Result<HttpResponse, ApiError> {
  delete_invoice_use_case
    .execute(DeleteInvoiceCommand { invoice_id })
    .await?;

  Ok(FlashMessage::InvoiceDeleted.redirect(INVOICES_PATH))
}

// PUT|PATCH /invoices/{id} - Replace the invoice's fields
pub async fn update_invoice(
  req: HttpRequest,
  path: web::Path<InvoiceId>,
  body: InvoiceBody,
  templates: web::Data<TemplateEngine>,
  get_invoice_details_use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
  update_invoice_use_case: web::Data<Arc<UpdateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  apply_update(
    &req,
    path.into_inner(),
    into_form(body),
    &templates,
    &get_invoice_details_use_case,
    &update_invoice_use_case,
  )
  .await
}

// DELETE /invoices/{id} - Remove the invoice
pub async fn delete_invoice(
  path: web::Path<InvoiceId>,
  delete_invoice_use_case: web::Data<Arc<DeleteInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  apply_delete(path.into_inner(), &delete_invoice_use_case).await
}

// POST /invoices/{id} - HTML form submission carrying `_method`
pub async fn invoice_method_override(
  req: HttpRequest,
  path: web::Path<InvoiceId>,
  body: InvoiceBody,
  templates: web::Data<TemplateEngine>,
  get_invoice_details_use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
  update_invoice_use_case: web::Data<Arc<UpdateInvoiceUseCase>>,
  delete_invoice_use_case: web::Data<Arc<DeleteInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let invoice_id = path.into_inner();
  let form = into_form(body);
  let method = form
    .method
    .as_deref()
    .map(|m| m.trim().to_ascii_uppercase())
    .unwrap_or_default();

  match method.as_str() {
    "PUT" | "PATCH" => {
      apply_update(
        &req,
        invoice_id,
        form,
        &templates,
        &get_invoice_details_use_case,
        &update_invoice_use_case,
      )
      .await
    }
    "DELETE" => apply_delete(invoice_id, &delete_invoice_use_case).await,
    _ => Err(ApiError::MethodNotAllowed(method)),
  }
}
