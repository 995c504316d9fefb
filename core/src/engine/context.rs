// cartkeep/src/engine/context.rs

use crate::model::{Cart, Product};
use uuid::Uuid;

/// Per-attempt state shared by the steps of one cart operation.
///
/// A fresh copy of the seed is used for every attempt, so a retry after a
/// version conflict never sees data read by the failed attempt.
#[derive(Debug, Clone)]
pub struct MutationCtx {
  pub user_id: Uuid,
  pub product_id: Uuid,
  /// Raw quantity as supplied by the caller.
  pub requested_quantity: Option<i64>,
  /// Quantity after validation.
  pub quantity: u32,
  pub product: Option<Product>,
  /// Working copy of the cart, as read from the store and then edited.
  pub cart: Option<Cart>,
  /// What the store returned from `save`.
  pub saved: Option<Cart>,
}

impl MutationCtx {
  pub fn new(user_id: Uuid, product_id: Uuid, requested_quantity: Option<i64>) -> Self {
    Self {
      user_id,
      product_id,
      requested_quantity,
      quantity: 0,
      product: None,
      cart: None,
      saved: None,
    }
  }

  /// Context for operations that do not target a product.
  pub fn for_user(user_id: Uuid) -> Self {
    Self::new(user_id, Uuid::nil(), None)
  }

  /// The cart the operation ends with: the saved cart if anything was written,
  /// otherwise the one that was read or created.
  pub fn outcome(&mut self) -> Option<Cart> {
    self.saved.take().or_else(|| self.cart.take())
  }
}
