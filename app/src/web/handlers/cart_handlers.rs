// cartkeep_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use cartkeep::Cart;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::envelope::ApiResponse;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
  pub product_id: Option<String>,
  pub quantity: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: Option<i64>,
}

fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
  Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation(format!("Invalid product id: {}", raw)))
}

/// Ids in the path address a cart line, so an unparsable one is just absent.
/// The nil id never names a line, which leaves the engine to answer with
/// CartNotFound or ItemNotFound.
fn path_product_id(raw: &str) -> Uuid {
  Uuid::parse_str(raw.trim()).unwrap_or(Uuid::nil())
}

// Handlers take `AuthenticatedUser` first: extractors run in argument order,
// so a missing token wins over a malformed body.

fn cart_response(cart: &Cart) -> HttpResponse {
  HttpResponse::Ok().json(ApiResponse::ok(cart.view()))
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.engine.get_or_create_cart(auth_user.user.id).await?;
  Ok(cart_response(&cart))
}

#[instrument(
  name = "handler::add_cart_item",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user.id, product_id = ?payload.product_id, quantity = ?payload.quantity)
)]
pub async fn add_item_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  payload: web::Json<AddItemPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let raw_id = payload
    .product_id
    .as_deref()
    .ok_or_else(|| AppError::Validation("Product ID is required".to_string()))?;
  let product_id = parse_product_id(raw_id)?;

  let cart = app_state
    .engine
    .add_item(auth_user.user.id, product_id, payload.quantity)
    .await?;
  info!(items = cart.items.len(), version = cart.version, "Item added to cart.");
  Ok(cart_response(&cart))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user.id, product_id = %path.as_str(), quantity = ?payload.quantity)
)]
pub async fn update_item_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<UpdateQuantityPayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = path_product_id(&path);
  let cart = app_state
    .engine
    .update_item_quantity(auth_user.user.id, product_id, payload.quantity)
    .await?;
  Ok(cart_response(&cart))
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user.id, product_id = %path.as_str())
)]
pub async fn remove_item_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path_product_id(&path);
  let cart = app_state.engine.remove_item(auth_user.user.id, product_id).await?;
  Ok(cart_response(&cart))
}
