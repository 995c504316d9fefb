// cartkeep/src/catalog/memory.rs

use crate::catalog::{CatalogImport, CatalogReader};
use crate::error::StoreError;
use crate::model::Product;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Process-local catalog, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
  products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts or replaces a product.
  pub fn upsert(&self, product: Product) {
    self.products.write().insert(product.id, product);
  }

  /// Returns false if the product does not exist.
  pub fn set_price(&self, product_id: Uuid, price: Decimal) -> bool {
    self.modify(product_id, |p| p.price = price)
  }

  /// Returns false if the product does not exist.
  pub fn set_inventory(&self, product_id: Uuid, inventory: i64) -> bool {
    self.modify(product_id, |p| p.inventory = inventory)
  }

  fn modify(&self, product_id: Uuid, f: impl FnOnce(&mut Product)) -> bool {
    let mut products = self.products.write();
    match products.get_mut(&product_id) {
      Some(product) => {
        f(product);
        product.updated_at = Utc::now();
        true
      }
      None => false,
    }
  }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
  async fn lookup(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    Ok(self.products.read().get(&product_id).cloned())
  }

  async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
    let products = self.products.read();
    Ok(products.values().find(|p| p.is_published && p.slug == slug).cloned())
  }

  async fn list_published(&self) -> Result<Vec<Product>, StoreError> {
    let products = self.products.read();
    let mut published: Vec<Product> = products.values().filter(|p| p.is_published).cloned().collect();
    published.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
    Ok(published)
  }
}

#[async_trait]
impl CatalogImport for InMemoryCatalog {
  async fn insert_products(&self, products: Vec<Product>) -> Result<Vec<Product>, StoreError> {
    let mut stored = self.products.write();

    let mut slugs: HashSet<String> = stored.values().map(|p| p.slug.clone()).collect();
    for product in &products {
      if !slugs.insert(product.slug.clone()) || stored.contains_key(&product.id) {
        return Err(StoreError::AlreadyExists(format!("product slug '{}'", product.slug)));
      }
    }

    for product in &products {
      stored.insert(product.id, product.clone());
    }
    Ok(products)
  }
}
