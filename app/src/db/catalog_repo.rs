// cartkeep_app/src/db/catalog_repo.rs

use crate::db::{backend_error, is_unique_violation};
use async_trait::async_trait;
use cartkeep::{CatalogImport, CatalogReader, Product, StoreError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, instrument};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
  "id, name, slug, description, price, inventory, images, is_published, created_at, updated_at";

pub struct PgCatalog {
  pool: PgPool,
}

impl PgCatalog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
      id: row.try_get("id").map_err(backend_error)?,
      name: row.try_get("name").map_err(backend_error)?,
      slug: row.try_get("slug").map_err(backend_error)?,
      description: row.try_get("description").map_err(backend_error)?,
      price: row.try_get("price").map_err(backend_error)?,
      inventory: row.try_get("inventory").map_err(backend_error)?,
      images: row.try_get("images").map_err(backend_error)?,
      is_published: row.try_get("is_published").map_err(backend_error)?,
      created_at: row.try_get("created_at").map_err(backend_error)?,
      updated_at: row.try_get("updated_at").map_err(backend_error)?,
    })
  }
}

#[async_trait]
impl CatalogReader for PgCatalog {
  #[instrument(name = "PgCatalog::lookup", skip(self), err(Display))]
  async fn lookup(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
    let row = sqlx::query(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;
    row.as_ref().map(Self::product_from_row).transpose()
  }

  #[instrument(name = "PgCatalog::find_by_slug", skip(self), err(Display))]
  async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
    let row = sqlx::query(&format!(
      "SELECT {} FROM products WHERE slug = $1 AND is_published",
      PRODUCT_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend_error)?;
    row.as_ref().map(Self::product_from_row).transpose()
  }

  #[instrument(name = "PgCatalog::list_published", skip(self), err(Display))]
  async fn list_published(&self) -> Result<Vec<Product>, StoreError> {
    let rows = sqlx::query(&format!(
      "SELECT {} FROM products WHERE is_published ORDER BY created_at, name",
      PRODUCT_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(backend_error)?;
    rows.iter().map(Self::product_from_row).collect()
  }
}

#[async_trait]
impl CatalogImport for PgCatalog {
  #[instrument(name = "PgCatalog::insert_products", skip_all, fields(count = products.len()), err(Display))]
  async fn insert_products(&self, products: Vec<Product>) -> Result<Vec<Product>, StoreError> {
    let mut tx = self.pool.begin().await.map_err(backend_error)?;
    let mut inserted = Vec::with_capacity(products.len());

    for product in products {
      let row = sqlx::query(&format!(
        r#"
        INSERT INTO products (id, name, slug, description, price, inventory, images, is_published, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
      ))
      .bind(product.id)
      .bind(&product.name)
      .bind(&product.slug)
      .bind(&product.description)
      .bind(product.price)
      .bind(product.inventory)
      .bind(&product.images)
      .bind(product.is_published)
      .bind(product.created_at)
      .bind(product.updated_at)
      .fetch_one(&mut *tx)
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          StoreError::AlreadyExists(format!("product slug '{}'", product.slug))
        } else {
          backend_error(e)
        }
      })?;
      inserted.push(Self::product_from_row(&row)?);
    }

    // Dropping `tx` on an early return rolls the whole batch back.
    tx.commit().await.map_err(backend_error)?;
    info!(inserted = inserted.len(), "Products inserted.");
    Ok(inserted)
  }
}
