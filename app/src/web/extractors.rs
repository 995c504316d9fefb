// cartkeep_app/src/web/extractors.rs

use crate::errors::AppError;
use crate::models::User;
use crate::services::Identity;
use crate::state::AppState;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

/// The caller of a protected route: a valid bearer token whose user still exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl AuthenticatedUser {
  pub fn identity(&self) -> Identity {
    Identity {
      user_id: self.user.id,
      role: self.user.role,
    }
  }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
  let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
  let token = header.strip_prefix("Bearer ")?.trim();
  (!token.is_empty()).then(|| token.to_string())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req);

    Box::pin(async move {
      let state =
        state.ok_or_else(|| AppError::Internal("AppState missing from application data".to_string()))?;
      let token = token.ok_or_else(|| {
        warn!("Request to protected route without bearer token.");
        AppError::Auth("Not authorized, no token".to_string())
      })?;

      let claims = state.tokens.verify(&token)?;
      let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Auth("Not authorized, user not found".to_string()))?;
      Ok::<_, AppError>(AuthenticatedUser { user })
    })
  }
}
