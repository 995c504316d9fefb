// cartkeep_app/src/pipelines/contexts.rs

use crate::models::User;

#[derive(Clone, Default)]
pub struct RegisterCtxData {
  pub email: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub password_hash: Option<String>,
  pub created_user: Option<User>,
}

#[derive(Clone, Default)]
pub struct LoginCtxData {
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub token: Option<String>,
}
