// cartkeep_app/src/pipelines/mod.rs

//! Account workflows, run on the same step runner as the cart engine.

pub mod contexts;
pub mod login_pipeline;
pub mod register_pipeline;

use crate::errors::AppError;
use crate::services::{TokenService, UserDirectory};
use cartkeep::Pipeline;
use contexts::{LoginCtxData, RegisterCtxData};
use std::sync::Arc;

pub type RegisterPipeline = Pipeline<RegisterCtxData, AppError>;
pub type LoginPipeline = Pipeline<LoginCtxData, AppError>;

pub struct AuthPipelines {
  pub register: RegisterPipeline,
  pub login: LoginPipeline,
}

pub fn build_auth_pipelines(users: Arc<dyn UserDirectory>, tokens: Arc<TokenService>) -> AuthPipelines {
  let pipelines = AuthPipelines {
    register: register_pipeline::build_register_pipeline(users.clone()),
    login: login_pipeline::build_login_pipeline(users, tokens),
  };
  tracing::info!(
    register_steps = ?pipelines.register.step_names(),
    login_steps = ?pipelines.login.step_names(),
    "Auth pipelines built."
  );
  pipelines
}
