// cartkeep/src/catalog/mod.rs

//! Catalog contracts. The cart engine only ever reads products; imports run
//! once, outside any request path.

pub mod memory;
pub mod seed;

use crate::error::StoreError;
use crate::model::Product;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryCatalog;

/// Synchronous-from-the-engine's-view product lookups.
///
/// Results are point-in-time snapshots; stock may move right after a read.
#[async_trait]
pub trait CatalogReader: Send + Sync {
  async fn lookup(&self, product_id: Uuid) -> Result<Option<Product>, StoreError>;

  /// Published products only.
  async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;

  /// Published products only.
  async fn list_published(&self) -> Result<Vec<Product>, StoreError>;
}

/// Bulk insert used by [`seed::import_products`].
#[async_trait]
pub trait CatalogImport: Send + Sync {
  /// Inserts all products or none. A slug that already exists fails the whole
  /// batch with `StoreError::AlreadyExists`.
  async fn insert_products(&self, products: Vec<Product>) -> Result<Vec<Product>, StoreError>;
}
