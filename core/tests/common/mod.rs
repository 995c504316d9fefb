// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use cartkeep::{
  Cart, CartEngine, CartStore, EngineConfig, InMemoryCartStore, InMemoryCatalog, Product, StoreError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

// --- Fixtures ---

pub struct Fixture {
  pub catalog: Arc<InMemoryCatalog>,
  pub store: Arc<InMemoryCartStore>,
  pub engine: Arc<CartEngine>,
}

impl Fixture {
  /// Puts a published product into the catalog and returns it.
  pub fn stock(&self, name: &str, cents: i64, inventory: i64) -> Product {
    let product = product(name, cents, inventory);
    self.catalog.upsert(product.clone());
    product
  }
}

pub fn fixture() -> Fixture {
  fixture_with_config(EngineConfig::default())
}

pub fn fixture_with_config(config: EngineConfig) -> Fixture {
  let catalog = Arc::new(InMemoryCatalog::new());
  let store = Arc::new(InMemoryCartStore::new());
  let engine = Arc::new(CartEngine::new(catalog.clone(), store.clone(), config));
  Fixture { catalog, store, engine }
}

pub fn product(name: &str, cents: i64, inventory: i64) -> Product {
  let now = Utc::now();
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    slug: cartkeep::model::slugify(name),
    description: format!("{} for testing", name),
    price: Decimal::new(cents, 2),
    inventory,
    images: vec![format!("/images/{}.jpg", cartkeep::model::slugify(name))],
    is_published: true,
    created_at: now,
    updated_at: now,
  }
}

pub fn money(cents: i64) -> Decimal {
  Decimal::new(cents, 2)
}

// --- Store wrappers for failure scenarios ---

/// Delays every call by `delay` before delegating.
pub struct SlowStore {
  pub inner: InMemoryCartStore,
  pub delay: Duration,
}

#[async_trait]
impl CartStore for SlowStore {
  async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.get_by_user(user_id).await
  }

  async fn create_empty(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.create_empty(user_id).await
  }

  async fn save(&self, cart: Cart, expected_version: i64) -> Result<Cart, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.save(cart, expected_version).await
  }
}

/// Commits saves right away, then stalls before acknowledging them.
pub struct SlowAckStore {
  pub inner: InMemoryCartStore,
  pub ack_delay: Duration,
}

#[async_trait]
impl CartStore for SlowAckStore {
  async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
    self.inner.get_by_user(user_id).await
  }

  async fn create_empty(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    self.inner.create_empty(user_id).await
  }

  async fn save(&self, cart: Cart, expected_version: i64) -> Result<Cart, StoreError> {
    let saved = self.inner.save(cart, expected_version).await;
    tokio::time::sleep(self.ack_delay).await;
    saved
  }
}

/// Every save loses the race; counts how often it was asked.
#[derive(Default)]
pub struct AlwaysConflictingStore {
  pub inner: InMemoryCartStore,
  pub save_calls: AtomicUsize,
}

#[async_trait]
impl CartStore for AlwaysConflictingStore {
  async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
    self.inner.get_by_user(user_id).await
  }

  async fn create_empty(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    self.inner.create_empty(user_id).await
  }

  async fn save(&self, cart: Cart, expected_version: i64) -> Result<Cart, StoreError> {
    self.save_calls.fetch_add(1, Ordering::SeqCst);
    Err(StoreError::VersionConflict {
      user_id: cart.user_id,
      expected: expected_version,
    })
  }
}

/// Backend that is down.
pub struct BrokenStore;

#[async_trait]
impl CartStore for BrokenStore {
  async fn get_by_user(&self, _user_id: Uuid) -> Result<Option<Cart>, StoreError> {
    Err(anyhow::anyhow!("connection refused").into())
  }

  async fn create_empty(&self, _user_id: Uuid) -> Result<Cart, StoreError> {
    Err(anyhow::anyhow!("connection refused").into())
  }

  async fn save(&self, _cart: Cart, _expected_version: i64) -> Result<Cart, StoreError> {
    Err(anyhow::anyhow!("connection refused").into())
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
