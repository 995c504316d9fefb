// cartkeep/src/model/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image used for a cart line when the product has none.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/default-product.jpg";

/// A catalog entry. Read-only from the cart's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub description: String,
  pub price: Decimal,
  pub inventory: i64,
  pub images: Vec<String>,
  pub is_published: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// First image, or [`DEFAULT_PRODUCT_IMAGE`].
  pub fn primary_image(&self) -> &str {
    self.images.first().map(String::as_str).unwrap_or(DEFAULT_PRODUCT_IMAGE)
  }
}

/// Input to a catalog import; ids, slugs and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: Decimal,
  #[serde(default)]
  pub inventory: i64,
  #[serde(default)]
  pub images: Vec<String>,
  #[serde(default = "published_by_default")]
  pub is_published: bool,
}

fn published_by_default() -> bool {
  true
}

/// URL slug for a product name: lowercase ASCII alphanumerics, words joined by
/// single hyphens, everything else dropped.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_dash = false;
  for ch in name.chars() {
    if ch.is_ascii_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(ch.to_ascii_lowercase());
    } else if ch.is_whitespace() || ch == '-' || ch == '_' {
      pending_dash = true;
    }
  }
  slug
}
