// cartkeep_app/src/state.rs

use crate::config::AppConfig;
use crate::pipelines::{build_auth_pipelines, AuthPipelines};
use crate::services::{TokenService, UserDirectory};
use cartkeep::{CartEngine, CartStore, CatalogImport, CatalogReader};
use std::sync::Arc;

/// Storage backends the application runs against, either all Postgres or all in-memory.
pub struct Backends {
  pub catalog: Arc<dyn CatalogReader>,
  pub catalog_import: Arc<dyn CatalogImport>,
  pub carts: Arc<dyn CartStore>,
  pub users: Arc<dyn UserDirectory>,
}

#[derive(Clone)]
pub struct AppState {
  pub engine: Arc<CartEngine>,
  pub catalog: Arc<dyn CatalogReader>,
  pub catalog_import: Arc<dyn CatalogImport>,
  pub users: Arc<dyn UserDirectory>,
  pub tokens: Arc<TokenService>,
  pub auth: Arc<AuthPipelines>,
}

impl AppState {
  pub fn new(backends: Backends, config: &AppConfig) -> Self {
    let tokens = Arc::new(TokenService::new(config.token_secret.clone(), config.token_ttl));
    let engine = Arc::new(CartEngine::new(
      backends.catalog.clone(),
      backends.carts,
      config.engine_config(),
    ));
    let auth = Arc::new(build_auth_pipelines(backends.users.clone(), tokens.clone()));

    Self {
      engine,
      catalog: backends.catalog,
      catalog_import: backends.catalog_import,
      users: backends.users,
      tokens,
      auth,
    }
  }
}
