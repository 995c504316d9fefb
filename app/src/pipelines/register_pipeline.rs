// cartkeep_app/src/pipelines/register_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewUser, Role};
use crate::pipelines::contexts::RegisterCtxData;
use crate::pipelines::RegisterPipeline;
use crate::services::{auth_service, UserDirectory};
use cartkeep::{ContextData, PipelineControl, StoreError};
use std::sync::Arc;
use tracing::{event, info, warn, Level};

const DUPLICATE_USER: &str = "User already exists";

pub fn build_register_pipeline(users: Arc<dyn UserDirectory>) -> RegisterPipeline {
  let mut p = RegisterPipeline::new(
    "register_user",
    &[
      ("validate_registration_input", None),
      ("check_existing_user", None),
      ("hash_user_password", None),
      ("create_user", None),
    ],
  );

  p.on_step("validate_registration_input", |ctx_data: ContextData<RegisterCtxData>| async move {
    let mut guard = ctx_data.write();
    guard.email = guard.email.trim().to_string();
    guard.first_name = guard.first_name.trim().to_string();
    guard.last_name = guard.last_name.trim().to_string();

    if guard.email.is_empty() || guard.password.is_empty() || guard.first_name.is_empty() || guard.last_name.is_empty()
    {
      return Err(AppError::Validation(
        "Please provide firstName, lastName, email and password".to_string(),
      ));
    }
    if !auth_service::is_plausible_email(&guard.email) {
      warn!("Registration with malformed email rejected.");
      return Err(AppError::Validation("Please add a valid email".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  let lookup = users.clone();
  p.on_step("check_existing_user", move |ctx_data: ContextData<RegisterCtxData>| {
    let users = lookup.clone();
    async move {
      let email = ctx_data.read().email.clone();
      event!(Level::DEBUG, %email, "Checking if email is already registered.");
      match users.find_by_email(&email).await? {
        Some(_) => Err(AppError::Validation(DUPLICATE_USER.to_string())),
        None => Ok(PipelineControl::Continue),
      }
    }
  });

  p.on_step("hash_user_password", |ctx_data: ContextData<RegisterCtxData>| async move {
    let password = ctx_data.read().password.clone();
    let hash = auth_service::hash_password(&password)?;
    let mut guard = ctx_data.write();
    guard.password_hash = Some(hash);
    guard.password.clear();
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_step("create_user", move |ctx_data: ContextData<RegisterCtxData>| {
    let users = users.clone();
    async move {
      let new_user = {
        let guard = ctx_data.read();
        let password_hash = guard
          .password_hash
          .clone()
          .ok_or_else(|| AppError::Internal("Password hash missing before user creation".to_string()))?;
        NewUser {
          email: guard.email.clone(),
          first_name: guard.first_name.clone(),
          last_name: guard.last_name.clone(),
          role: Role::Customer,
          password_hash,
        }
      };

      // The existence check above can lose a race with a concurrent registration.
      let user = users.insert(new_user).await.map_err(|e| match e {
        StoreError::AlreadyExists(_) => AppError::Validation(DUPLICATE_USER.to_string()),
        other => AppError::from(other),
      })?;
      info!(user_id = %user.id, "User registered.");
      ctx_data.write().created_user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    }
  });

  p
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::InMemoryUserDirectory;

  fn registration(email: &str) -> RegisterCtxData {
    RegisterCtxData {
      email: email.to_string(),
      password: "s3cret-pass".to_string(),
      first_name: " Ada ".to_string(),
      last_name: "Lovelace".to_string(),
      ..Default::default()
    }
  }

  #[actix_web::test]
  async fn registers_a_customer_with_a_hashed_password() {
    let users = Arc::new(InMemoryUserDirectory::new());
    let pipeline = build_register_pipeline(users.clone());

    let ctx = ContextData::new(registration("ada@example.com"));
    pipeline.run(ctx.clone()).await.unwrap();

    let created = ctx.read().created_user.clone().unwrap();
    assert_eq!(created.first_name, "Ada");
    assert_eq!(created.role, Role::Customer);
    assert!(auth_service::verify_password(&created.password_hash, "s3cret-pass").unwrap());
    assert!(ctx.read().password.is_empty());
    assert!(users.find_by_email("ada@example.com").await.unwrap().is_some());
  }

  #[actix_web::test]
  async fn duplicate_email_fails_validation() {
    let users = Arc::new(InMemoryUserDirectory::new());
    let pipeline = build_register_pipeline(users);

    pipeline.run(ContextData::new(registration("ada@example.com"))).await.unwrap();
    let err = pipeline
      .run(ContextData::new(registration("ada@example.com")))
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == DUPLICATE_USER));
  }

  #[actix_web::test]
  async fn missing_fields_and_bad_email_are_rejected() {
    let pipeline = build_register_pipeline(Arc::new(InMemoryUserDirectory::new()));

    let mut missing = registration("ada@example.com");
    missing.last_name = "  ".to_string();
    assert!(matches!(
      pipeline.run(ContextData::new(missing)).await,
      Err(AppError::Validation(_))
    ));

    assert!(matches!(
      pipeline.run(ContextData::new(registration("not-an-email"))).await,
      Err(AppError::Validation(ref m)) if m.contains("valid email")
    ));
  }
}
