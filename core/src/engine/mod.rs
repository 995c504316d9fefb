// cartkeep/src/engine/mod.rs

//! The cart mutation engine.
//!
//! Every operation runs as a step pipeline against a fresh [`MutationCtx`].
//! Writes go through the store's version check; when another request saved
//! the same cart in between, the whole operation is re-run from its first
//! step (catalog lookup included) against the newer cart. Operations are
//! bounded in time as a whole, retries included.

pub mod context;
pub mod pipelines;
pub mod steps;
pub mod validation;

use crate::catalog::CatalogReader;
use crate::error::{CartError, CartResult};
use crate::model::Cart;
use crate::pipeline::ContextData;
use crate::store::CartStore;
use context::MutationCtx;
use pipelines::CartPipeline;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Tunables for retry and timeout behaviour.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Re-runs allowed after the first attempt hits a version conflict.
  pub max_conflict_retries: u32,
  /// Sleep before retry `n` is `conflict_backoff * n`.
  pub conflict_backoff: Duration,
  /// Upper bound for one operation, all attempts included.
  ///
  /// Expiry drops the in-flight store call. If the backend had already
  /// committed a save, the caller still gets `TransientStoreFailure` while the
  /// change is stored; re-sending an AddItem then adds the quantity again.
  /// Clients should re-read the cart before retrying after a timeout.
  pub operation_timeout: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_conflict_retries: 8,
      conflict_backoff: Duration::from_millis(5),
      operation_timeout: Duration::from_secs(5),
    }
  }
}

pub struct CartEngine {
  config: EngineConfig,
  get_or_create: CartPipeline,
  add: CartPipeline,
  update: CartPipeline,
  remove: CartPipeline,
}

impl CartEngine {
  pub fn new(catalog: Arc<dyn CatalogReader>, store: Arc<dyn CartStore>, config: EngineConfig) -> Self {
    Self {
      config,
      get_or_create: pipelines::get_or_create_cart_pipeline(store.clone()),
      add: pipelines::add_item_pipeline(catalog.clone(), store.clone()),
      update: pipelines::update_item_quantity_pipeline(catalog, store.clone()),
      remove: pipelines::remove_item_pipeline(store),
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Returns the user's cart, creating an empty one on first use.
  #[instrument(name = "CartEngine::get_or_create_cart", skip(self), err(Display))]
  pub async fn get_or_create_cart(&self, user_id: Uuid) -> CartResult<Cart> {
    self.execute(&self.get_or_create, MutationCtx::for_user(user_id)).await
  }

  /// Adds `quantity` (default 1) units of a product. An existing line keeps its
  /// price snapshot and accumulates; the accumulated total must fit in stock.
  #[instrument(name = "CartEngine::add_item", skip(self), err(Display))]
  pub async fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: Option<i64>) -> CartResult<Cart> {
    self.execute(&self.add, MutationCtx::new(user_id, product_id, quantity)).await
  }

  /// Sets a line to an absolute quantity; zero removes the line.
  #[instrument(name = "CartEngine::update_item_quantity", skip(self), err(Display))]
  pub async fn update_item_quantity(
    &self,
    user_id: Uuid,
    product_id: Uuid,
    quantity: Option<i64>,
  ) -> CartResult<Cart> {
    self.execute(&self.update, MutationCtx::new(user_id, product_id, quantity)).await
  }

  #[instrument(name = "CartEngine::remove_item", skip(self), err(Display))]
  pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> CartResult<Cart> {
    self.execute(&self.remove, MutationCtx::new(user_id, product_id, None)).await
  }

  async fn execute(&self, pipeline: &CartPipeline, seed: MutationCtx) -> CartResult<Cart> {
    let timeout = self.config.operation_timeout;
    match tokio::time::timeout(timeout, self.run_with_retries(pipeline, seed)).await {
      Ok(result) => result,
      Err(_) => {
        warn!(pipeline = pipeline.name(), ?timeout, "Cart operation timed out.");
        Err(CartError::TransientStoreFailure(format!(
          "{} did not complete within {:?}",
          pipeline.name(),
          timeout
        )))
      }
    }
  }

  async fn run_with_retries(&self, pipeline: &CartPipeline, seed: MutationCtx) -> CartResult<Cart> {
    let mut attempt: u32 = 0;
    loop {
      attempt += 1;
      let ctx = ContextData::new(seed.clone());

      match pipeline.run(ctx.clone()).await {
        Ok(_) => return finish(&ctx),
        Err(e) if e.is_retryable() && attempt <= self.config.max_conflict_retries => {
          debug!(pipeline = pipeline.name(), attempt, "Version conflict; retrying operation.");
          tokio::time::sleep(self.config.conflict_backoff * attempt).await;
        }
        Err(CartError::StoreConflict { user_id, .. }) => {
          warn!(pipeline = pipeline.name(), %user_id, attempts = attempt, "Giving up after repeated version conflicts.");
          return Err(CartError::StoreConflict {
            user_id,
            attempts: attempt,
          });
        }
        Err(e) => return Err(e),
      }
    }
  }
}

fn finish(ctx: &ContextData<MutationCtx>) -> CartResult<Cart> {
  ctx
    .write()
    .outcome()
    .ok_or_else(|| CartError::Internal("cart operation completed without producing a cart".to_string()))
}
