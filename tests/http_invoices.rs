//! End-to-end tests of the invoice pages against an in-memory SQLite store.

use actix_web::{
  App,
  cookie::Cookie,
  http::{StatusCode, header},
  test, web,
};
use serde_json::{Value, json};
use std::sync::Arc;

use invoice_desk::{
  adapters::http::{
    FLASH_COOKIE, InvoiceRouteDependencies, RequestIdMiddleware, TemplateEngine,
    configure_invoice_routes, configure_web_routes, middleware::REQUEST_ID_HEADER,
  },
  domain::invoice::InvoiceService,
  infrastructure::{config::DatabaseConfig, persistence},
};

fn memory_config() -> DatabaseConfig {
  DatabaseConfig {
    url: "sqlite::memory:".to_string(),
    max_connections: 5,
    connect_timeout_seconds: 5,
    acquire_timeout_seconds: 3,
  }
}

macro_rules! app {
  () => {{
    let repository = persistence::connect(&memory_config())
      .await
      .expect("in-memory database");
    let service = Arc::new(InvoiceService::new(repository));
    let deps = InvoiceRouteDependencies::new(service.clone());
    let templates = TemplateEngine::new().expect("templates");

    test::init_service(
      App::new()
        .wrap(RequestIdMiddleware)
        .configure(|cfg| configure_web_routes(cfg, templates, service))
        .service(web::scope("/invoices").configure(|cfg| configure_invoice_routes(cfg, deps))),
    )
    .await
  }};
}

fn form(number: &str) -> Vec<(&'static str, String)> {
  vec![
    ("invoice_number", number.to_string()),
    ("seller_nip", "1234567890".to_string()),
    ("buyer_nip", "0987654321".to_string()),
    ("product_name", "Widget".to_string()),
    ("net_amount", "150.00".to_string()),
    ("issuance_date", "2024-01-15".to_string()),
  ]
}

fn with(
  mut fields: Vec<(&'static str, String)>,
  name: &'static str,
  value: &str,
) -> Vec<(&'static str, String)> {
  fields.retain(|(field, _)| *field != name);
  fields.push((name, value.to_string()));
  fields
}

fn json_list(uri: &str) -> test::TestRequest {
  test::TestRequest::get()
    .uri(uri)
    .insert_header((header::ACCEPT, "application/json"))
}

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
  let body = test::read_body(resp).await;
  String::from_utf8(body.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_home_redirects_to_list() {
  let app = app!();

  let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

  assert_eq!(resp.status(), StatusCode::FOUND);
  assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/invoices");
}

#[actix_web::test]
async fn test_health_reports_ok() {
  let app = app!();

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn test_create_redirects_with_flash_shown_once() {
  let app = app!();

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/invoices")
      .set_form(form("F/1/2024"))
      .to_request(),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/invoices");
  let flash = resp
    .response()
    .cookies()
    .find(|c| c.name() == FLASH_COOKIE)
    .expect("flash cookie");
  assert_eq!(flash.value(), "invoice_created");

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/invoices")
      .cookie(Cookie::new(FLASH_COOKIE, "invoice_created"))
      .to_request(),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::OK);
  let removal = resp
    .response()
    .cookies()
    .find(|c| c.name() == FLASH_COOKIE)
    .expect("removal cookie");
  assert_eq!(removal.value(), "");

  let html = body_text(resp).await;
  assert!(html.contains("Invoice added."));
  assert!(html.contains("F&#x2F;1&#x2F;2024"));

  // without the cookie the message is gone
  let resp = test::call_service(&app, test::TestRequest::get().uri("/invoices").to_request()).await;
  assert!(resp.response().cookies().next().is_none());
  let html = body_text(resp).await;
  assert!(!html.contains("Invoice added."));
}

#[actix_web::test]
async fn test_duplicate_number_rerenders_form() {
  let app = app!();

  for expected in [StatusCode::SEE_OTHER, StatusCode::UNPROCESSABLE_ENTITY] {
    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/invoices")
        .set_form(form("F/1/2024"))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), expected);

    if expected == StatusCode::UNPROCESSABLE_ENTITY {
      let html = body_text(resp).await;
      assert!(html.contains("The invoice number has already been taken."));
      assert!(html.contains("value=\"1234567890\""));
    }
  }

  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  assert_eq!(list["invoices"]["pagination"]["total"], 1);
}

#[actix_web::test]
async fn test_invalid_json_submission_returns_field_errors() {
  let app = app!();

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/invoices")
      .insert_header((header::ACCEPT, "application/json"))
      .set_json(json!({
        "invoice_number": "F/2/2024",
        "seller_nip": "12345",
        "buyer_nip": "0987654321",
        "product_name": "Widget",
        "net_amount": 150,
      }))
      .to_request(),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(
    body["errors"]["seller_nip"][0],
    "The seller nip field must be 10 digits."
  );
  assert!(body["errors"].get("net_amount").is_none());
}

#[actix_web::test]
async fn test_json_list_shape_and_search() {
  let app = app!();

  for (number, product) in [("F/1/2024", "Blue widget"), ("F/2/2024", "Red gadget")] {
    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/invoices")
        .set_form(with(form(number), "product_name", product))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  }

  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  let data = list["invoices"]["data"].as_array().unwrap();
  assert_eq!(data.len(), 2);
  assert_eq!(data[0]["invoice_number"], "F/1/2024");
  assert_eq!(data[0]["net_amount"], "150.00");
  assert_eq!(data[0]["issuance_date"], "2024-01-15");
  assert!(data[0]["updated_at_formatted"].is_string());
  assert_eq!(list["invoices"]["pagination"]["current_page"], 1);
  assert_eq!(list["invoices"]["pagination"]["last_page"], 1);
  assert_eq!(list["filters"]["search"], Value::Null);

  let found: Value =
    test::call_and_read_body_json(&app, json_list("/invoices?search=GADGET").to_request()).await;
  let data = found["invoices"]["data"].as_array().unwrap();
  assert_eq!(data.len(), 1);
  assert_eq!(data[0]["invoice_number"], "F/2/2024");
  assert_eq!(found["filters"]["search"], "GADGET");
}

#[actix_web::test]
async fn test_bad_page_falls_back_to_first() {
  let app = app!();

  test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/invoices")
      .set_form(form("F/1/2024"))
      .to_request(),
  )
  .await;

  for uri in ["/invoices?page=abc", "/invoices?page=0", "/invoices?page=-3"] {
    let list: Value = test::call_and_read_body_json(&app, json_list(uri).to_request()).await;
    assert_eq!(list["invoices"]["pagination"]["current_page"], 1, "{uri}");
    assert_eq!(list["invoices"]["data"].as_array().unwrap().len(), 1, "{uri}");
  }
}

#[actix_web::test]
async fn test_pagination_links_keep_search() {
  let app = app!();

  for n in 1..=11 {
    test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/invoices")
        .set_form(form(&format!("F/{n}/2024")))
        .to_request(),
    )
    .await;
  }

  let list: Value =
    test::call_and_read_body_json(&app, json_list("/invoices?search=F&page=1").to_request()).await;
  let pagination = &list["invoices"]["pagination"];
  assert_eq!(pagination["total"], 11);
  assert_eq!(pagination["last_page"], 2);
  assert_eq!(pagination["next_page_url"], "/invoices?search=F&page=2");
  assert_eq!(pagination["prev_page_url"], Value::Null);

  let second: Value =
    test::call_and_read_body_json(&app, json_list("/invoices?search=F&page=2").to_request()).await;
  let data = second["invoices"]["data"].as_array().unwrap();
  assert_eq!(data.len(), 1);
  assert_eq!(data[0]["invoice_number"], "F/11/2024");
}

#[actix_web::test]
async fn test_edit_update_and_self_exclusion() {
  let app = app!();

  test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/invoices")
      .set_form(form("F/1/2024"))
      .to_request(),
  )
  .await;
  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  let id = list["invoices"]["data"][0]["id"].as_i64().unwrap();

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri(&format!("/invoices/{id}/edit"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let html = body_text(resp).await;
  assert!(html.contains(&format!("action=\"/invoices/{id}\"")));
  assert!(html.contains("value=\"150.00\""));

  // keeping its own number is allowed
  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri(&format!("/invoices/{id}"))
      .set_form(with(form("F/1/2024"), "net_amount", "200.50"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  let flash = resp
    .response()
    .cookies()
    .find(|c| c.name() == FLASH_COOKIE)
    .unwrap();
  assert_eq!(flash.value(), "invoice_updated");

  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  assert_eq!(list["invoices"]["data"][0]["net_amount"], "200.50");
}

#[actix_web::test]
async fn test_update_to_taken_number_is_rejected() {
  let app = app!();

  for number in ["F/1/2024", "F/2/2024"] {
    test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/invoices")
        .set_form(form(number))
        .to_request(),
    )
    .await;
  }
  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  let second = list["invoices"]["data"][1]["id"].as_i64().unwrap();

  let resp = test::call_service(
    &app,
    test::TestRequest::patch()
      .uri(&format!("/invoices/{second}"))
      .insert_header((header::ACCEPT, "application/json"))
      .set_form(form("F/1/2024"))
      .to_request(),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(
    body["errors"]["invoice_number"][0],
    "The invoice number has already been taken."
  );
}

#[actix_web::test]
async fn test_unknown_invoice_is_not_found() {
  let app = app!();

  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri("/invoices/999999/edit").to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  // 404 wins over invalid input
  let resp = test::call_service(
    &app,
    test::TestRequest::put()
      .uri("/invoices/999999")
      .set_form(with(form(""), "seller_nip", "12"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = test::call_service(
    &app,
    test::TestRequest::delete().uri("/invoices/999999").to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_method_override_from_html_forms() {
  let app = app!();

  test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/invoices")
      .set_form(form("F/1/2024"))
      .to_request(),
  )
  .await;
  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  let id = list["invoices"]["data"][0]["id"].as_i64().unwrap();

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri(&format!("/invoices/{id}"))
      .set_form(with(form("F/9/2024"), "_method", "PUT"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri(&format!("/invoices/{id}"))
      .set_form([("_method", "TRACE")])
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri(&format!("/invoices/{id}"))
      .set_form([("_method", "DELETE")])
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  let flash = resp
    .response()
    .cookies()
    .find(|c| c.name() == FLASH_COOKIE)
    .unwrap();
  assert_eq!(flash.value(), "invoice_deleted");

  let list: Value = test::call_and_read_body_json(&app, json_list("/invoices").to_request()).await;
  assert_eq!(list["invoices"]["pagination"]["total"], 0);
}

#[actix_web::test]
async fn test_empty_list_message() {
  let app = app!();

  let resp = test::call_service(&app, test::TestRequest::get().uri("/invoices").to_request()).await;

  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_text(resp).await.contains("No invoices found."));
}

#[actix_web::test]
async fn test_search_ignores_case_of_polish_letters() {
  let app = app!();

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/invoices")
      .set_form(with(form("F/1/2024"), "product_name", "ŁÓDŹ Śruby"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);

  for term in ["ŁÓDŹ", "łódź", "ŚRUBY"] {
    let uri = format!(
      "/invoices?{}",
      serde_urlencoded::to_string([("search", term)]).unwrap()
    );
    let list: Value = test::call_and_read_body_json(&app, json_list(&uri).to_request()).await;
    assert_eq!(list["invoices"]["pagination"]["total"], 1, "{term}");
    assert_eq!(list["invoices"]["data"][0]["product_name"], "ŁÓDŹ Śruby");
  }
}
