// cartkeep/src/catalog/seed.rs

//! One-time catalog import. Runs at startup or from an admin endpoint, never
//! from the cart engine.

use crate::catalog::CatalogImport;
use crate::error::StoreError;
use crate::model::{slugify, NewProduct, Product};
use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
  #[error("Invalid product '{name}': {reason}")]
  InvalidProduct { name: String, reason: String },

  #[error("Catalog import failed: {0}")]
  Store(#[from] StoreError),
}

/// Checks a product and turns it into a catalog row with a fresh id and a slug
/// derived from its name.
pub fn prepare_product(new: NewProduct) -> Result<Product, ImportError> {
  let name = new.name.trim().to_string();
  let invalid = |reason: &str| ImportError::InvalidProduct {
    name: name.clone(),
    reason: reason.to_string(),
  };

  if name.is_empty() {
    return Err(invalid("name must not be empty"));
  }
  if new.price < Decimal::ZERO {
    return Err(invalid("price must not be negative"));
  }
  if new.inventory < 0 {
    return Err(invalid("inventory must not be negative"));
  }
  let slug = slugify(&name);
  if slug.is_empty() {
    return Err(invalid("name yields an empty slug"));
  }

  let now = Utc::now();
  Ok(Product {
    id: Uuid::new_v4(),
    slug,
    name,
    description: new.description,
    price: new.price,
    inventory: new.inventory,
    images: new.images,
    is_published: new.is_published,
    created_at: now,
    updated_at: now,
  })
}

/// Validates every product first, then inserts the batch in one call.
#[instrument(name = "catalog::import_products", skip_all, fields(count = products.len()), err(Display))]
pub async fn import_products(
  catalog: &dyn CatalogImport,
  products: Vec<NewProduct>,
) -> Result<Vec<Product>, ImportError> {
  let prepared = products
    .into_iter()
    .map(prepare_product)
    .collect::<Result<Vec<_>, _>>()?;

  let inserted = catalog.insert_products(prepared).await?;
  info!(inserted = inserted.len(), "Catalog import finished.");
  Ok(inserted)
}

/// The demo catalog. One product is deliberately unpublished.
pub fn default_products() -> Vec<NewProduct> {
  let product = |name: &str, description: &str, cents: i64, image: &str, inventory: i64, is_published: bool| {
    NewProduct {
      name: name.to_string(),
      description: description.to_string(),
      price: Decimal::new(cents, 2),
      inventory,
      images: vec![image.to_string()],
      is_published,
    }
  };

  vec![
    product(
      "Awesome T-Shirt",
      "Comfortable cotton t-shirt, available in various sizes and colors. Made from 100% organic cotton.",
      1999,
      "/images/tshirt_default.jpg",
      100,
      true,
    ),
    product(
      "Cool Mug",
      "Keeps your coffee warm and your hands cool. Ceramic mug, dishwasher safe.",
      1250,
      "/images/mug_default.jpg",
      50,
      true,
    ),
    product(
      "Super Comfy Hoodie",
      "A warm and stylish hoodie perfect for chilly evenings. Fleece-lined interior.",
      4500,
      "/images/hoodie_default.jpg",
      75,
      true,
    ),
    product(
      "Stylish Baseball Cap",
      "Protect yourself from the sun with this cool baseball cap. Adjustable strap.",
      1575,
      "/images/cap_default.jpg",
      120,
      false,
    ),
    product(
      "Eco-Friendly Water Bottle",
      "Stay hydrated with this reusable and eco-friendly water bottle. BPA-free.",
      2200,
      "/images/bottle_default.jpg",
      90,
      true,
    ),
  ]
}
