// cartkeep/src/store/memory.rs

use crate::error::StoreError;
use crate::model::Cart;
use crate::store::CartStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Process-local cart store with the same compare-and-swap semantics as the
/// Postgres store.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
  carts: Mutex<HashMap<Uuid, Cart>>,
}

impl InMemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.carts.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.carts.lock().is_empty()
  }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
  async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
    Ok(self.carts.lock().get(&user_id).cloned())
  }

  #[instrument(name = "InMemoryCartStore::create_empty", skip(self), err(Display))]
  async fn create_empty(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    let mut carts = self.carts.lock();
    if carts.contains_key(&user_id) {
      return Err(StoreError::AlreadyExists(format!("cart for user {}", user_id)));
    }
    let cart = Cart::empty(user_id);
    carts.insert(user_id, cart.clone());
    debug!(cart_id = %cart.id, "Created empty cart.");
    Ok(cart)
  }

  #[instrument(
    name = "InMemoryCartStore::save",
    skip(self, cart),
    fields(user_id = %cart.user_id, items = cart.items.len()),
    err(Display)
  )]
  async fn save(&self, cart: Cart, expected_version: i64) -> Result<Cart, StoreError> {
    let mut carts = self.carts.lock();
    match carts.get_mut(&cart.user_id) {
      Some(stored) if stored.version == expected_version => {
        stored.items = cart.items;
        stored.updated_at = cart.updated_at;
        stored.version = expected_version + 1;
        debug!(version = stored.version, "Cart saved.");
        Ok(stored.clone())
      }
      _ => Err(StoreError::VersionConflict {
        user_id: cart.user_id,
        expected: expected_version,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::CartItem;
  use rust_decimal::Decimal;

  #[tokio::test]
  async fn create_empty_is_unique_per_user() {
    let store = InMemoryCartStore::new();
    let user_id = Uuid::new_v4();
    let cart = store.create_empty(user_id).await.unwrap();
    assert_eq!(cart.version, 0);
    assert!(matches!(store.create_empty(user_id).await, Err(StoreError::AlreadyExists(_))));
    assert_eq!(store.len(), 1);
  }

  #[tokio::test]
  async fn save_rejects_stale_versions() {
    let store = InMemoryCartStore::new();
    let user_id = Uuid::new_v4();
    let mut cart = store.create_empty(user_id).await.unwrap();
    cart.items.push(CartItem {
      product_id: Uuid::new_v4(),
      quantity: 1,
      price_snapshot: Decimal::ONE,
      name: "Thing".into(),
      image: "/images/thing.jpg".into(),
    });

    let saved = store.save(cart.clone(), 0).await.unwrap();
    assert_eq!(saved.version, 1);
    assert_eq!(saved.id, cart.id);

    let stale = store.save(cart, 0).await;
    assert!(matches!(stale, Err(StoreError::VersionConflict { expected: 0, .. })));
    assert_eq!(store.get_by_user(user_id).await.unwrap().unwrap().version, 1);
  }

  #[tokio::test]
  async fn save_without_a_cart_is_a_conflict() {
    let store = InMemoryCartStore::new();
    let result = store.save(Cart::empty(Uuid::new_v4()), 0).await;
    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
  }
}
