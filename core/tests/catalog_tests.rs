// tests/catalog_tests.rs
mod common;

use cartkeep::catalog::seed::{default_products, import_products, ImportError};
use cartkeep::{CatalogReader, InMemoryCatalog, StoreError};
use common::*;

#[tokio::test]
async fn import_assigns_slugs_and_hides_unpublished_products() {
  setup_tracing();
  let catalog = InMemoryCatalog::new();

  let imported = import_products(&catalog, default_products()).await.unwrap();
  assert_eq!(imported.len(), 5);

  let published = catalog.list_published().await.unwrap();
  assert_eq!(published.len(), 4);
  assert!(published.iter().all(|p| p.is_published));

  let mug = catalog.find_by_slug("cool-mug").await.unwrap().unwrap();
  assert_eq!(mug.name, "Cool Mug");
  assert_eq!(mug.price, money(1250));
  assert_eq!(mug.inventory, 50);

  // Unpublished products are invisible by slug but still resolvable by id,
  // so carts that already hold them keep working.
  assert!(catalog.find_by_slug("stylish-baseball-cap").await.unwrap().is_none());
  let cap = imported.iter().find(|p| p.slug == "stylish-baseball-cap").unwrap();
  assert!(catalog.lookup(cap.id).await.unwrap().is_some());
}

#[tokio::test]
async fn importing_twice_fails_without_partial_inserts() {
  let catalog = InMemoryCatalog::new();
  import_products(&catalog, default_products()).await.unwrap();

  let mut batch = default_products();
  batch[0].name = "Brand New Thing".to_string();
  let err = import_products(&catalog, batch).await.unwrap_err();

  assert!(matches!(err, ImportError::Store(StoreError::AlreadyExists(_))));
  assert!(catalog.find_by_slug("brand-new-thing").await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_products_are_rejected_before_any_insert() {
  let catalog = InMemoryCatalog::new();
  let mut batch = default_products();
  batch[4].inventory = -1;

  let err = import_products(&catalog, batch).await.unwrap_err();
  assert!(matches!(err, ImportError::InvalidProduct { ref name, .. } if name == "Eco-Friendly Water Bottle"));
  assert!(catalog.list_published().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_slugs_within_one_batch_are_rejected() {
  let catalog = InMemoryCatalog::new();
  let mut batch = default_products();
  batch[1].name = "Awesome  T-shirt".to_string();

  let err = import_products(&catalog, batch).await.unwrap_err();
  assert!(matches!(err, ImportError::Store(StoreError::AlreadyExists(_))));
}
