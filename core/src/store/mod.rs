// cartkeep/src/store/mod.rs

//! Durable cart storage, one cart per user.

pub mod memory;

use crate::error::StoreError;
use crate::model::Cart;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryCartStore;

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError>;

  /// Creates and returns an empty cart at version 0.
  ///
  /// Fails with `StoreError::AlreadyExists` if the user already has a cart;
  /// callers treat that as a lost creation race and re-read.
  async fn create_empty(&self, user_id: Uuid) -> Result<Cart, StoreError>;

  /// Replaces the items of `cart.user_id`'s cart, but only if the stored
  /// version still equals `expected_version`. On success the stored version is
  /// `expected_version + 1` and the stored cart is returned.
  ///
  /// Fails with `StoreError::VersionConflict` when another writer got there
  /// first. The write is all-or-nothing.
  async fn save(&self, cart: Cart, expected_version: i64) -> Result<Cart, StoreError>;
}
