// cartkeep_app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use cartkeep::catalog::seed::{default_products, import_products};
use cartkeep::Product;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::Role;
use crate::services::require_role;
use crate::state::AppState;
use crate::web::envelope::ApiResponse;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list_published().await?;
  info!(count = products.len(), "Fetched published products.");

  let count = products.len();
  let mut body = ApiResponse::ok(products).with_count(count);
  if count == 0 {
    body = body.with_message("No products found");
  }
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(slug = %path.as_str()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let slug = path.into_inner();
  match app_state.catalog.find_by_slug(&slug).await? {
    Some(product) => Ok(HttpResponse::Ok().json(ApiResponse::ok(product))),
    None => {
      warn!("No published product for slug.");
      Err(AppError::NotFound("Product not found".to_string()))
    }
  }
}

/// Loads the demo catalog. Admin only; a second run conflicts on slugs.
#[instrument(name = "handler::seed_products", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn seed_products_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.identity(), &[Role::Admin])?;

  let inserted: Vec<Product> = import_products(app_state.catalog_import.as_ref(), default_products()).await?;
  let count = inserted.len();
  Ok(
    HttpResponse::Created().json(
      ApiResponse::ok(inserted)
        .with_count(count)
        .with_message("Products seeded successfully"),
    ),
  )
}
