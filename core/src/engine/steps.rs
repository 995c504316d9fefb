// cartkeep/src/engine/steps.rs

//! Step handlers shared by the cart pipelines. Each takes the run's
//! `ContextData` and drops every lock guard before awaiting.

use crate::catalog::CatalogReader;
use crate::engine::context::MutationCtx;
use crate::engine::validation::{ensure_in_stock, validate_add_quantity, validate_target_quantity, MAX_LINE_QUANTITY};
use crate::error::{CartError, CartResult, StoreError};
use crate::model::{Cart, CartItem, Product};
use crate::pipeline::{ContextData, PipelineControl};
use crate::store::CartStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

type Ctx = ContextData<MutationCtx>;

fn missing(what: &str) -> CartError {
  CartError::Internal(format!("{} not loaded by an earlier step", what))
}

pub async fn validate_add_input(ctx: Ctx) -> CartResult<PipelineControl> {
  let mut guard = ctx.write();
  guard.quantity = validate_add_quantity(guard.requested_quantity)?;
  Ok(PipelineControl::Continue)
}

pub async fn validate_update_input(ctx: Ctx) -> CartResult<PipelineControl> {
  let mut guard = ctx.write();
  guard.quantity = validate_target_quantity(guard.requested_quantity)?;
  Ok(PipelineControl::Continue)
}

pub async fn lookup_product(catalog: Arc<dyn CatalogReader>, ctx: Ctx) -> CartResult<PipelineControl> {
  let product_id = ctx.read().product_id;
  let product = catalog
    .lookup(product_id)
    .await?
    .ok_or(CartError::ProductNotFound { product_id })?;
  debug!(%product_id, inventory = product.inventory, price = %product.price, "Product snapshot fetched.");
  ctx.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

/// Checks the quantity being requested right now against current stock.
pub async fn check_stock(ctx: Ctx) -> CartResult<PipelineControl> {
  let guard = ctx.read();
  let product = guard.product.as_ref().ok_or_else(|| missing("product"))?;
  ensure_in_stock(product, guard.quantity)?;
  Ok(PipelineControl::Continue)
}

/// Loads the cart if one exists and stops the run; otherwise lets the run
/// carry on to creation.
pub async fn load_cart_or_continue(store: Arc<dyn CartStore>, ctx: Ctx) -> CartResult<PipelineControl> {
  let user_id = ctx.read().user_id;
  match store.get_by_user(user_id).await? {
    Some(cart) => {
      ctx.write().cart = Some(cart);
      Ok(PipelineControl::Stop)
    }
    None => Ok(PipelineControl::Continue),
  }
}

pub async fn create_empty_cart(store: Arc<dyn CartStore>, ctx: Ctx) -> CartResult<PipelineControl> {
  let user_id = ctx.read().user_id;
  let cart = create_or_reread(store.as_ref(), user_id).await?;
  ctx.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

pub async fn load_or_create_cart(store: Arc<dyn CartStore>, ctx: Ctx) -> CartResult<PipelineControl> {
  let user_id = ctx.read().user_id;
  let cart = match store.get_by_user(user_id).await? {
    Some(cart) => cart,
    None => create_or_reread(store.as_ref(), user_id).await?,
  };
  ctx.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

pub async fn load_existing_cart(store: Arc<dyn CartStore>, ctx: Ctx) -> CartResult<PipelineControl> {
  let user_id = ctx.read().user_id;
  let cart = store
    .get_by_user(user_id)
    .await?
    .ok_or(CartError::CartNotFound { user_id })?;
  ctx.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

/// Creating a cart can lose a race against a concurrent request for the same
/// user; the winner's cart is then the one to use.
async fn create_or_reread(store: &dyn CartStore, user_id: Uuid) -> CartResult<Cart> {
  match store.create_empty(user_id).await {
    Ok(cart) => {
      info!(%user_id, cart_id = %cart.id, "Created cart for user.");
      Ok(cart)
    }
    Err(StoreError::AlreadyExists(_)) => {
      debug!(%user_id, "Cart created concurrently; re-reading.");
      store.get_by_user(user_id).await?.ok_or_else(|| {
        CartError::TransientStoreFailure(format!("cart for user {} reported as existing but not readable", user_id))
      })
    }
    Err(e) => Err(e.into()),
  }
}

pub async fn locate_item(ctx: Ctx) -> CartResult<PipelineControl> {
  let guard = ctx.read();
  let cart = guard.cart.as_ref().ok_or_else(|| missing("cart"))?;
  if cart.item(guard.product_id).is_none() {
    return Err(CartError::ItemNotFound {
      product_id: guard.product_id,
    });
  }
  Ok(PipelineControl::Continue)
}

/// Adds to an existing line (keeping its price snapshot) or appends a new line
/// priced at the product's current price.
pub async fn merge_line_item(ctx: Ctx) -> CartResult<PipelineControl> {
  let mut guard = ctx.write();
  let MutationCtx {
    quantity,
    product,
    cart,
    ..
  } = &mut *guard;
  let product: &Product = product.as_ref().ok_or_else(|| missing("product"))?;
  let cart = cart.as_mut().ok_or_else(|| missing("cart"))?;

  match cart.item_mut(product.id) {
    Some(existing) => {
      let new_total = existing
        .quantity
        .checked_add(*quantity)
        .filter(|total| *total <= MAX_LINE_QUANTITY)
        .ok_or_else(|| {
          CartError::InvalidQuantity(format!(
            "line quantity would exceed {} for product {}",
            MAX_LINE_QUANTITY, product.id
          ))
        })?;
      if let Err(e) = ensure_in_stock(product, new_total) {
        warn!(
          product_id = %product.id,
          in_cart = existing.quantity,
          adding = *quantity,
          available = product.inventory,
          "Accumulated quantity exceeds stock."
        );
        return Err(e);
      }
      existing.quantity = new_total;
    }
    None => cart.items.push(CartItem::snapshot_of(product, *quantity)),
  }
  Ok(PipelineControl::Continue)
}

/// Sets the line to the validated absolute quantity; zero removes it.
pub async fn apply_quantity(ctx: Ctx) -> CartResult<PipelineControl> {
  let mut guard = ctx.write();
  let (product_id, quantity) = (guard.product_id, guard.quantity);
  let cart = guard.cart.as_mut().ok_or_else(|| missing("cart"))?;

  if quantity == 0 {
    cart.take_item(product_id);
    return Ok(PipelineControl::Continue);
  }
  let item = cart.item_mut(product_id).ok_or(CartError::ItemNotFound { product_id })?;
  item.quantity = quantity;
  Ok(PipelineControl::Continue)
}

pub async fn drop_line_item(ctx: Ctx) -> CartResult<PipelineControl> {
  let mut guard = ctx.write();
  let product_id = guard.product_id;
  let cart = guard.cart.as_mut().ok_or_else(|| missing("cart"))?;
  cart
    .take_item(product_id)
    .ok_or(CartError::ItemNotFound { product_id })?;
  Ok(PipelineControl::Continue)
}

/// Normalises the working cart and writes it with a version check against the
/// version it was read at.
pub async fn persist_cart(store: Arc<dyn CartStore>, ctx: Ctx) -> CartResult<PipelineControl> {
  let cart = ctx.read().cart.clone().ok_or_else(|| missing("cart"))?;
  let expected_version = cart.version;
  let prepared = cart.prepare_for_save(Utc::now())?;

  let saved = store.save(prepared, expected_version).await?;
  debug!(user_id = %saved.user_id, version = saved.version, items = saved.items.len(), "Cart persisted.");
  ctx.write().saved = Some(saved);
  Ok(PipelineControl::Continue)
}
