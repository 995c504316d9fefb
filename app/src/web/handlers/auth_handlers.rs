// cartkeep_app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use cartkeep::ContextData;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData};
use crate::state::AppState;
use crate::web::envelope::ApiResponse;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[instrument(name = "handler::register", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(RegisterCtxData {
    email: payload.email,
    password: payload.password,
    first_name: payload.first_name,
    last_name: payload.last_name,
    ..Default::default()
  });

  app_state.auth.register.run(ctx.clone()).await?;

  let user = ctx
    .write()
    .created_user
    .take()
    .ok_or_else(|| AppError::Internal("Registration completed without a user".to_string()))?;
  info!(user_id = %user.id, "Registration succeeded.");
  Ok(HttpResponse::Created().json(ApiResponse::ok(user)))
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(LoginCtxData {
    email: payload.email,
    password: payload.password,
    ..Default::default()
  });

  app_state.auth.login.run(ctx.clone()).await?;

  let (user, token) = {
    let mut guard = ctx.write();
    (guard.user.take(), guard.token.take())
  };
  match (user, token) {
    (Some(user), Some(token)) => Ok(HttpResponse::Ok().json(ApiResponse::ok(user).with_token(token))),
    _ => Err(AppError::Internal("Login completed without a token".to_string())),
  }
}
