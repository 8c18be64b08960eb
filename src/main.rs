use actix_files as fs;
use actix_web::{App, HttpServer, middleware::Logger, web};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoice_desk::{
  adapters::http::{
    InvoiceRouteDependencies, RequestIdMiddleware, TemplateEngine, configure_invoice_routes,
    configure_web_routes,
  },
  domain::invoice::InvoiceService,
  infrastructure::{
    config::Config,
    persistence::{self, DatabaseSetupError},
  },
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoice_desk=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting invoice desk");

  // Load configuration
  let config = Config::load().map_err(|e| {
    tracing::error!("Failed to load configuration: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;
  tracing::info!("Configuration loaded successfully");

  // Connect, migrate and pick the repository for the configured URL
  let invoice_repo = persistence::connect(&config.database)
    .await
    .map_err(|e| {
      tracing::error!("Database setup failed: {}", e);
      match e {
        DatabaseSetupError::TimedOut(_) => {
          std::io::Error::new(std::io::ErrorKind::TimedOut, e.to_string())
        }
        DatabaseSetupError::UnsupportedUrl(_) => {
          std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        }
        DatabaseSetupError::Connection(sqlx::Error::Io(_)) => std::io::Error::new(
          std::io::ErrorKind::ConnectionRefused,
          "Could not connect to database. Is it running?",
        ),
        _ => std::io::Error::other(e.to_string()),
      }
    })?;

  let invoice_service = Arc::new(InvoiceService::new(invoice_repo));
  let invoice_routes = InvoiceRouteDependencies::new(invoice_service.clone());

  let templates = TemplateEngine::new().map_err(|e| {
    tracing::error!("Failed to load templates: {}", e);
    std::io::Error::other(format!("Template error: {}", e))
  })?;
  tracing::info!("Templates loaded");

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .wrap(RequestIdMiddleware)
      .configure(|cfg| configure_web_routes(cfg, templates.clone(), invoice_service.clone()))
      .service(
        web::scope("/invoices").configure(|cfg| configure_invoice_routes(cfg, invoice_routes.clone())),
      )
      // Static files
      .service(fs::Files::new("/static", "./static"))
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await
}
