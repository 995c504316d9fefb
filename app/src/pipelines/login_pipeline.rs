// cartkeep_app/src/pipelines/login_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::LoginCtxData;
use crate::pipelines::LoginPipeline;
use crate::services::{auth_service, TokenService, UserDirectory};
use cartkeep::{ContextData, PipelineControl};
use std::sync::Arc;
use tracing::{info, warn};

fn invalid_credentials() -> AppError {
  AppError::Auth("Invalid credentials".to_string())
}

pub fn build_login_pipeline(users: Arc<dyn UserDirectory>, tokens: Arc<TokenService>) -> LoginPipeline {
  let mut p = LoginPipeline::new(
    "login_user",
    &[
      ("validate_login_input", None),
      ("fetch_user_by_email", None),
      ("verify_user_password", None),
      ("issue_token", None),
    ],
  );

  p.on_step("validate_login_input", |ctx_data: ContextData<LoginCtxData>| async move {
    let guard = ctx_data.read();
    if guard.email.trim().is_empty() || guard.password.is_empty() {
      return Err(AppError::Validation("Please provide an email and password".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_step("fetch_user_by_email", move |ctx_data: ContextData<LoginCtxData>| {
    let users = users.clone();
    async move {
      let email = ctx_data.read().email.trim().to_string();
      let user = users.find_by_email(&email).await?.ok_or_else(|| {
        warn!("Login attempt for unknown email.");
        invalid_credentials()
      })?;
      ctx_data.write().user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    }
  });

  p.on_step("verify_user_password", |ctx_data: ContextData<LoginCtxData>| async move {
    let (stored_hash, password, user_id) = {
      let guard = ctx_data.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| AppError::Internal("User missing before password check".to_string()))?;
      (user.password_hash.clone(), guard.password.clone(), user.id)
    };

    let matches = auth_service::verify_password(&stored_hash, &password)?;
    ctx_data.write().password.clear();
    if !matches {
      warn!(%user_id, "Password mismatch on login.");
      return Err(invalid_credentials());
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_step("issue_token", move |ctx_data: ContextData<LoginCtxData>| {
    let tokens = tokens.clone();
    async move {
      let mut guard = ctx_data.write();
      let token = match guard.user.as_ref() {
        Some(user) => tokens.issue(user)?,
        None => return Err(AppError::Internal("User missing before token issue".to_string())),
      };
      guard.token = Some(token);
      if let Some(user) = guard.user.as_ref() {
        info!(user_id = %user.id, "Login succeeded; token issued.");
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    }
  });

  p
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{NewUser, Role};
  use crate::services::InMemoryUserDirectory;
  use std::time::Duration;

  const SECRET: &str = "login-pipeline-test-secret-0123456789";

  async fn setup() -> (LoginPipeline, Arc<TokenService>, uuid::Uuid) {
    let users = Arc::new(InMemoryUserDirectory::new());
    let user = users
      .insert(NewUser {
        email: "grace@example.com".into(),
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        role: Role::Admin,
        password_hash: auth_service::hash_password("cobol-forever").unwrap(),
      })
      .await
      .unwrap();
    let tokens = Arc::new(TokenService::new(SECRET, Duration::from_secs(60)));
    (build_login_pipeline(users, tokens.clone()), tokens, user.id)
  }

  fn attempt(email: &str, password: &str) -> ContextData<LoginCtxData> {
    ContextData::new(LoginCtxData {
      email: email.into(),
      password: password.into(),
      ..Default::default()
    })
  }

  #[actix_web::test]
  async fn correct_password_yields_a_verifiable_token() {
    let (pipeline, tokens, user_id) = setup().await;
    let ctx = attempt("grace@example.com", "cobol-forever");
    pipeline.run(ctx.clone()).await.unwrap();

    let token = ctx.read().token.clone().unwrap();
    let claims = tokens.verify(&token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role, Role::Admin);
  }

  #[actix_web::test]
  async fn wrong_password_and_unknown_email_look_the_same() {
    let (pipeline, _, _) = setup().await;
    let wrong = pipeline.run(attempt("grace@example.com", "fortran")).await.unwrap_err();
    let unknown = pipeline.run(attempt("nobody@example.com", "cobol-forever")).await.unwrap_err();
    assert_eq!(wrong.to_string(), "Invalid credentials");
    assert_eq!(unknown.to_string(), "Invalid credentials");
  }

  #[actix_web::test]
  async fn missing_fields_are_a_validation_error() {
    let (pipeline, _, _) = setup().await;
    assert!(matches!(
      pipeline.run(attempt("", "x")).await,
      Err(AppError::Validation(_))
    ));
  }
}
