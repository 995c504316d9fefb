// cartkeep/src/model/cart.rs

use crate::error::{CartError, CartResult};
use crate::model::product::Product;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// One product line in a cart.
///
/// `price_snapshot` is the unit price the shopper saw when the line was first
/// added. Quantity changes never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub product_id: Uuid,
  pub quantity: u32,
  pub price_snapshot: Decimal,
  pub name: String,
  pub image: String,
}

impl CartItem {
  /// A fresh line priced at the product's current price.
  pub fn snapshot_of(product: &Product, quantity: u32) -> Self {
    Self {
      product_id: product.id,
      quantity,
      price_snapshot: product.price,
      name: product.name.clone(),
      image: product.primary_image().to_string(),
    }
  }

  pub fn line_total(&self) -> Decimal {
    self.price_snapshot * Decimal::from(self.quantity)
  }
}

/// The single cart of one user.
///
/// `version` increases by one on every successful save and is what the store
/// compares against to reject writes based on a stale read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<CartItem>,
  pub version: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn empty(user_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      items: Vec::new(),
      version: 0,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
    self.items.iter().find(|i| i.product_id == product_id)
  }

  pub fn item_mut(&mut self, product_id: Uuid) -> Option<&mut CartItem> {
    self.items.iter_mut().find(|i| i.product_id == product_id)
  }

  /// Removes the line for `product_id`, returning it if it was present.
  pub fn take_item(&mut self, product_id: Uuid) -> Option<CartItem> {
    let idx = self.items.iter().position(|i| i.product_id == product_id)?;
    Some(self.items.remove(idx))
  }

  pub fn total_price(&self) -> Decimal {
    self.items.iter().map(CartItem::line_total).sum()
  }

  pub fn total_items(&self) -> u64 {
    self.items.iter().map(|i| u64::from(i.quantity)).sum()
  }

  /// Normalises a cart right before it is written.
  ///
  /// Zero-quantity lines are dropped, duplicate product lines are rejected and
  /// `updated_at` is set to `now`. `version` is left alone; the store owns it.
  pub fn prepare_for_save(mut self, now: DateTime<Utc>) -> CartResult<Cart> {
    self.items.retain(|i| i.quantity > 0);

    let mut seen = HashSet::with_capacity(self.items.len());
    if let Some(dup) = self.items.iter().find(|i| !seen.insert(i.product_id)) {
      return Err(CartError::Internal(format!(
        "cart {} holds more than one line for product {}",
        self.id, dup.product_id
      )));
    }

    self.updated_at = now;
    Ok(self)
  }

  /// Serialisable view with computed totals.
  pub fn view(&self) -> CartView<'_> {
    CartView {
      cart: self,
      total_price: self.total_price(),
      total_items: self.total_items(),
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView<'a> {
  #[serde(flatten)]
  cart: &'a Cart,
  total_price: Decimal,
  total_items: u64,
}
