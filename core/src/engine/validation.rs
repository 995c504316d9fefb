// cartkeep/src/engine/validation.rs

//! Input checks run as the first step of each mutation.

use crate::error::{CartError, CartResult};
use crate::model::Product;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

/// Quantity for AddItem: defaults to 1, must be at least 1.
pub fn validate_add_quantity(quantity: Option<i64>) -> CartResult<u32> {
  let quantity = quantity.unwrap_or(1);
  if quantity < 1 {
    return Err(CartError::InvalidQuantity(format!(
      "quantity to add must be at least 1, got {}",
      quantity
    )));
  }
  bounded(quantity)
}

/// Absolute quantity for UpdateItemQuantity: required, zero means remove.
pub fn validate_target_quantity(quantity: Option<i64>) -> CartResult<u32> {
  let quantity = quantity.ok_or_else(|| {
    CartError::InvalidQuantity("please provide a valid quantity (0 or more)".to_string())
  })?;
  if quantity < 0 {
    return Err(CartError::InvalidQuantity(format!(
      "quantity must be 0 or more, got {}",
      quantity
    )));
  }
  bounded(quantity)
}

fn bounded(quantity: i64) -> CartResult<u32> {
  u32::try_from(quantity)
    .ok()
    .filter(|q| *q <= MAX_LINE_QUANTITY)
    .ok_or_else(|| CartError::InvalidQuantity(format!("quantity {} exceeds {}", quantity, MAX_LINE_QUANTITY)))
}

/// Fails with `InsufficientStock` unless `product` currently has `wanted` units.
pub fn ensure_in_stock(product: &Product, wanted: u32) -> CartResult<()> {
  if product.inventory < i64::from(wanted) {
    return Err(CartError::insufficient_stock(
      product.id,
      i64::from(wanted),
      product.inventory,
    ));
  }
  Ok(())
}
