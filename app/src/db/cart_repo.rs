// cartkeep_app/src/db/cart_repo.rs

use crate::db::backend_error;
use async_trait::async_trait;
use cartkeep::{Cart, CartItem, CartStore, StoreError};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

const CART_COLUMNS: &str = "id, user_id, items, version, created_at, updated_at";

/// One row per user; `version` is bumped by every accepted save.
pub struct PgCartStore {
  pool: PgPool,
}

impl PgCartStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  fn cart_from_row(row: &PgRow) -> Result<Cart, StoreError> {
    let items: Json<Vec<CartItem>> = row.try_get("items").map_err(backend_error)?;
    Ok(Cart {
      id: row.try_get("id").map_err(backend_error)?,
      user_id: row.try_get("user_id").map_err(backend_error)?,
      items: items.0,
      version: row.try_get("version").map_err(backend_error)?,
      created_at: row.try_get("created_at").map_err(backend_error)?,
      updated_at: row.try_get("updated_at").map_err(backend_error)?,
    })
  }
}

#[async_trait]
impl CartStore for PgCartStore {
  #[instrument(name = "PgCartStore::get_by_user", skip(self), err(Display))]
  async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
    let row = sqlx::query(&format!("SELECT {} FROM carts WHERE user_id = $1", CART_COLUMNS))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;
    row.as_ref().map(Self::cart_from_row).transpose()
  }

  #[instrument(name = "PgCartStore::create_empty", skip(self), err(Display))]
  async fn create_empty(&self, user_id: Uuid) -> Result<Cart, StoreError> {
    let fresh = Cart::empty(user_id);
    let row = sqlx::query(&format!(
      r#"
      INSERT INTO carts (id, user_id, items, version, created_at, updated_at)
      VALUES ($1, $2, '[]'::jsonb, 0, $3, $3)
      ON CONFLICT (user_id) DO NOTHING
      RETURNING {}
      "#,
      CART_COLUMNS
    ))
    .bind(fresh.id)
    .bind(user_id)
    .bind(fresh.created_at)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend_error)?;

    match row {
      Some(row) => Self::cart_from_row(&row),
      None => Err(StoreError::AlreadyExists(format!("cart for user {}", user_id))),
    }
  }

  #[instrument(
    name = "PgCartStore::save",
    skip(self, cart),
    fields(user_id = %cart.user_id, items = cart.items.len()),
    err(Display)
  )]
  async fn save(&self, cart: Cart, expected_version: i64) -> Result<Cart, StoreError> {
    let row = sqlx::query(&format!(
      r#"
      UPDATE carts
      SET items = $1, version = version + 1, updated_at = $2
      WHERE user_id = $3 AND version = $4
      RETURNING {}
      "#,
      CART_COLUMNS
    ))
    .bind(Json(&cart.items))
    .bind(cart.updated_at)
    .bind(cart.user_id)
    .bind(expected_version)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend_error)?;

    match row {
      Some(row) => {
        let saved = Self::cart_from_row(&row)?;
        debug!(version = saved.version, "Cart saved.");
        Ok(saved)
      }
      None => Err(StoreError::VersionConflict {
        user_id: cart.user_id,
        expected: expected_version,
      }),
    }
  }
}
