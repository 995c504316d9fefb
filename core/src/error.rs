// cartkeep/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

/// Wiring errors raised by the step runner itself, never by business logic.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Pipeline '{pipeline}' has no handler for step: {step_name}")]
  HandlerMissing { pipeline: &'static str, step_name: String },
}

/// Failures reported by catalog and cart backends.
#[derive(Debug, Error)]
pub enum StoreError {
  /// A uniqueness constraint was hit (second cart for a user, duplicate slug).
  #[error("Record already exists: {0}")]
  AlreadyExists(String),

  /// A conditional write found a newer version than the one the caller read.
  #[error("Version conflict for cart of user {user_id}: expected version {expected}")]
  VersionConflict { user_id: Uuid, expected: i64 },

  #[error("Storage backend failure: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for StoreError {
  fn from(err: AnyhowError) -> Self {
    StoreError::Backend { source: err }
  }
}

/// Every way a cart operation can fail.
#[derive(Debug, Error)]
pub enum CartError {
  #[error("Product not found: {product_id}")]
  ProductNotFound { product_id: Uuid },

  #[error("Cart not found for user {user_id}")]
  CartNotFound { user_id: Uuid },

  #[error("Item not found in cart: {product_id}")]
  ItemNotFound { product_id: Uuid },

  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),

  #[error("Not enough stock for product {product_id}: requested {requested}, available {available}")]
  InsufficientStock {
    product_id: Uuid,
    requested: i64,
    available: i64,
  },

  #[error("Not authenticated: {0}")]
  Unauthenticated(String),

  #[error("Concurrent modification of cart for user {user_id}; gave up after {attempts} attempt(s)")]
  StoreConflict { user_id: Uuid, attempts: u32 },

  #[error("Cart storage temporarily unavailable: {0}")]
  TransientStoreFailure(String),

  #[error("Pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Internal cart error: {0}")]
  Internal(String),
}

impl CartError {
  /// Only version conflicts are worth re-running an operation for.
  pub fn is_retryable(&self) -> bool {
    matches!(self, CartError::StoreConflict { .. })
  }

  pub(crate) fn insufficient_stock(product_id: Uuid, requested: i64, available: i64) -> Self {
    CartError::InsufficientStock {
      product_id,
      requested,
      available,
    }
  }
}

impl From<StoreError> for CartError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::VersionConflict { user_id, .. } => CartError::StoreConflict { user_id, attempts: 1 },
      StoreError::AlreadyExists(what) => {
        CartError::TransientStoreFailure(format!("unexpected uniqueness violation: {}", what))
      }
      StoreError::Backend { source } => CartError::TransientStoreFailure(source.to_string()),
    }
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
