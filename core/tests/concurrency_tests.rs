// tests/concurrency_tests.rs
mod common;

use cartkeep::{CartEngine, CartError, CartStore, EngineConfig, InMemoryCartStore};
use common::*;
use futures_util::future::join_all;
use std::sync::{atomic::Ordering, Arc};
use std::time::Duration;
use uuid::Uuid;

fn patient_config() -> EngineConfig {
  EngineConfig {
    max_conflict_retries: 64,
    conflict_backoff: Duration::from_millis(1),
    operation_timeout: Duration::from_secs(10),
  }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_concurrent_adds_are_both_counted() {
  setup_tracing();
  let fx = fixture_with_config(patient_config());
  let user = Uuid::new_v4();
  let mug = fx.stock("Cool Mug", 1250, 2);

  let a = tokio::spawn({
    let engine = fx.engine.clone();
    async move { engine.add_item(user, mug.id, Some(1)).await }
  });
  let b = tokio::spawn({
    let engine = fx.engine.clone();
    async move { engine.add_item(user, mug.id, Some(1)).await }
  });
  a.await.unwrap().unwrap();
  b.await.unwrap().unwrap();

  let cart = fx.engine.get_or_create_cart(user).await.unwrap();
  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.item(mug.id).unwrap().quantity, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn many_concurrent_adds_match_a_serial_order() {
  let fx = fixture_with_config(patient_config());
  let user = Uuid::new_v4();
  let shirt = fx.stock("Awesome T-Shirt", 1999, 100);
  let mug = fx.stock("Cool Mug", 1250, 100);

  let tasks = (0..24).map(|i| {
    let engine = fx.engine.clone();
    let product_id = if i % 2 == 0 { shirt.id } else { mug.id };
    tokio::spawn(async move { engine.add_item(user, product_id, Some(1)).await })
  });
  for result in join_all(tasks).await {
    result.unwrap().unwrap();
  }

  let cart = fx.engine.get_or_create_cart(user).await.unwrap();
  assert_eq!(cart.item(shirt.id).unwrap().quantity, 12);
  assert_eq!(cart.item(mug.id).unwrap().quantity, 12);
  // One save per successful add.
  assert_eq!(cart.version, 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_adds_never_oversell_accumulated_stock() {
  let fx = fixture_with_config(patient_config());
  let user = Uuid::new_v4();
  let cap = fx.stock("Stylish Baseball Cap", 1575, 5);

  let tasks = (0..10).map(|_| {
    let engine = fx.engine.clone();
    tokio::spawn(async move { engine.add_item(user, cap.id, Some(1)).await })
  });
  let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

  let ok = results.iter().filter(|r| r.is_ok()).count();
  let short = results
    .iter()
    .filter(|r| matches!(r, Err(CartError::InsufficientStock { .. })))
    .count();
  assert_eq!(ok, 5);
  assert_eq!(short, 5);

  let cart = fx.engine.get_or_create_cart(user).await.unwrap();
  assert_eq!(cart.item(cap.id).unwrap().quantity, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_reads_share_one_cart() {
  let fx = fixture();
  let user = Uuid::new_v4();

  let tasks = (0..8).map(|_| {
    let engine = fx.engine.clone();
    tokio::spawn(async move { engine.get_or_create_cart(user).await })
  });
  let ids: Vec<Uuid> = join_all(tasks)
    .await
    .into_iter()
    .map(|r| r.unwrap().unwrap().id)
    .collect();

  assert!(ids.windows(2).all(|w| w[0] == w[1]));
  assert_eq!(fx.store.len(), 1);
}

#[tokio::test]
async fn persistent_conflicts_surface_after_bounded_retries() {
  setup_tracing();
  let catalog = Arc::new(cartkeep::InMemoryCatalog::new());
  let mug = product("Cool Mug", 1250, 10);
  catalog.upsert(mug.clone());
  let store = Arc::new(AlwaysConflictingStore::default());
  let engine = CartEngine::new(
    catalog,
    store.clone(),
    EngineConfig {
      max_conflict_retries: 3,
      conflict_backoff: Duration::from_millis(1),
      operation_timeout: Duration::from_secs(5),
    },
  );

  let user = Uuid::new_v4();
  let err = engine.add_item(user, mug.id, Some(1)).await.unwrap_err();

  assert!(matches!(err, CartError::StoreConflict { user_id, attempts: 4 } if user_id == user));
  assert_eq!(store.save_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn slow_store_yields_transient_failure() {
  let catalog = Arc::new(cartkeep::InMemoryCatalog::new());
  let store = Arc::new(SlowStore {
    inner: InMemoryCartStore::new(),
    delay: Duration::from_millis(200),
  });
  let engine = CartEngine::new(
    catalog,
    store.clone(),
    EngineConfig {
      operation_timeout: Duration::from_millis(50),
      ..EngineConfig::default()
    },
  );

  let user = Uuid::new_v4();
  let err = engine.get_or_create_cart(user).await.unwrap_err();
  assert!(matches!(err, CartError::TransientStoreFailure(ref m) if m.contains("get_or_create_cart")));
}

#[tokio::test]
async fn timeout_after_commit_reports_transient_but_keeps_the_change() {
  let catalog = Arc::new(cartkeep::InMemoryCatalog::new());
  let gadget = product("Gadget", 1500, 10);
  catalog.upsert(gadget.clone());
  let store = Arc::new(SlowAckStore {
    inner: InMemoryCartStore::new(),
    ack_delay: Duration::from_millis(200),
  });
  let engine = CartEngine::new(
    catalog,
    store.clone(),
    EngineConfig {
      operation_timeout: Duration::from_millis(50),
      ..EngineConfig::default()
    },
  );

  let user = Uuid::new_v4();
  let err = engine.add_item(user, gadget.id, Some(2)).await.unwrap_err();
  assert!(matches!(err, CartError::TransientStoreFailure(ref m) if m.contains("add_item")));

  // The save went through before the deadline hit.
  let stored = store.inner.get_by_user(user).await.unwrap().expect("cart was committed");
  assert_eq!(stored.item(gadget.id).map(|i| i.quantity), Some(2));

  // A blind retry applies the addition a second time.
  tokio::time::sleep(Duration::from_millis(250)).await;
  let _ = engine.add_item(user, gadget.id, Some(2)).await;
  let stored = store.inner.get_by_user(user).await.unwrap().expect("cart exists");
  assert_eq!(stored.item(gadget.id).map(|i| i.quantity), Some(4));
}

#[tokio::test]
async fn broken_store_is_transient_and_not_retried() {
  let catalog = Arc::new(cartkeep::InMemoryCatalog::new());
  let engine = CartEngine::new(catalog, Arc::new(BrokenStore), EngineConfig::default());

  let err = engine.get_or_create_cart(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, CartError::TransientStoreFailure(ref m) if m.contains("connection refused")));
  assert!(!err.is_retryable());
}
