// cartkeep_app/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, cart_handlers, product_handlers};
use actix_web::{error::InternalError, web, HttpResponse, ResponseError};
use serde_json::json;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "success": true, "status": "ok" }))
}

/// Malformed JSON bodies get the same `{success:false, message}` 400 as validation errors.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| {
    let app_err = AppError::Validation(format!("Invalid request body: {}", err));
    let response = app_err.error_response();
    InternalError::from_response(err, response).into()
  })
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(json_config())
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/auth")
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler)),
    )
    .service(
      web::scope("/products")
        .route("", web::get().to(product_handlers::list_products_handler))
        .route("/seed", web::post().to(product_handlers::seed_products_handler))
        .route("/{slug}", web::get().to(product_handlers::get_product_handler)),
    )
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::get_cart_handler))
        .route("/items", web::post().to(cart_handlers::add_item_handler))
        .route("/items/{product_id}", web::put().to(cart_handlers::update_item_handler))
        .route("/items/{product_id}", web::delete().to(cart_handlers::remove_item_handler)),
    );
}
