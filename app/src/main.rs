// cartkeep_app/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod pipelines;
mod services;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat};
use crate::errors::AppError;
use crate::services::InMemoryUserDirectory;
use crate::state::{AppState, Backends};

use actix_web::{web as actix_data, App, HttpServer};
use cartkeep::catalog::seed::{default_products, import_products};
use cartkeep::{InMemoryCartStore, InMemoryCatalog, StoreError};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // RUST_LOG overrides the INFO default
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

async fn build_backends(config: &AppConfig) -> Result<Backends, AppError> {
  match &config.database_url {
    Some(url) => {
      let pool = db::connect(url).await?;
      db::apply_schema(&pool).await?;
      let catalog = Arc::new(db::PgCatalog::new(pool.clone()));
      Ok(Backends {
        catalog: catalog.clone(),
        catalog_import: catalog,
        carts: Arc::new(db::PgCartStore::new(pool.clone())),
        users: Arc::new(db::PgUserDirectory::new(pool)),
      })
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using in-memory storage. Data is lost on restart.");
      let catalog = Arc::new(InMemoryCatalog::new());
      Ok(Backends {
        catalog: catalog.clone(),
        catalog_import: catalog,
        carts: Arc::new(InMemoryCartStore::new()),
        users: Arc::new(InMemoryUserDirectory::new()),
      })
    }
  }
}

async fn seed_catalog(state: &AppState) -> Result<(), AppError> {
  match import_products(state.catalog_import.as_ref(), default_products()).await {
    Ok(products) => {
      tracing::info!(count = products.len(), "Catalog seeded.");
      Ok(())
    }
    Err(cartkeep::catalog::seed::ImportError::Store(StoreError::AlreadyExists(what))) => {
      tracing::info!(%what, "Catalog already seeded; skipping.");
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      // Tracing is not up yet; the log format itself comes from the config.
      eprintln!("Failed to load application configuration: {}", e);
      std::process::exit(1);
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting cart service...");

  let backends = match build_backends(&app_config).await {
    Ok(backends) => backends,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise storage backends.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };
  let app_state = AppState::new(backends, &app_config);

  if let Some(admin) = &app_config.admin {
    if let Err(e) = services::admin_bootstrap::ensure_admin(app_state.users.as_ref(), admin).await {
      tracing::error!(error = %e, "Failed to provision admin account.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  }

  if app_config.seed_db {
    if let Err(e) = seed_catalog(&app_state).await {
      tracing::error!(error = %e, "Failed to seed catalog.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
