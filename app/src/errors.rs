// cartkeep_app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use cartkeep::catalog::seed::ImportError;
use cartkeep::{CartError, PipelineError, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Auth(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  /// Uniqueness violations surfaced to clients, e.g. seeding an already seeded catalog.
  #[error("{0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error(transparent)]
  Cart(#[from] CartError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::AlreadyExists(what) => AppError::Conflict(what),
      other => AppError::Internal(other.to_string()),
    }
  }
}

impl From<PipelineError> for AppError {
  fn from(err: PipelineError) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl From<ImportError> for AppError {
  fn from(err: ImportError) -> Self {
    match err {
      invalid @ ImportError::InvalidProduct { .. } => AppError::Validation(invalid.to_string()),
      ImportError::Store(store) => store.into(),
    }
  }
}

impl AppError {
  /// Message placed in the response envelope. Server-side failures never leak
  /// their details to the client.
  fn client_message(&self) -> String {
    match self {
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
      AppError::Cart(CartError::TransientStoreFailure(_)) => {
        "Cart storage is temporarily unavailable, please retry".to_string()
      }
      AppError::Cart(CartError::Pipeline(_)) | AppError::Cart(CartError::Internal(_)) => {
        "An internal error occurred".to_string()
      }
      other => other.to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::Cart(cart_err) => match cart_err {
        CartError::InvalidQuantity(_) | CartError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        CartError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        CartError::ProductNotFound { .. } | CartError::CartNotFound { .. } | CartError::ItemNotFound { .. } => {
          StatusCode::NOT_FOUND
        }
        CartError::StoreConflict { .. } => StatusCode::CONFLICT,
        CartError::TransientStoreFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        CartError::Pipeline(_) | CartError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, status = status.as_u16(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Rejecting request");
    }
    HttpResponse::build(status).json(json!({
      "success": false,
      "message": self.client_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
