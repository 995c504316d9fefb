// cartkeep_app/src/services/mod.rs

pub mod admin_bootstrap;
pub mod auth_service;
pub mod identity;
pub mod user_directory;

pub use identity::{require_role, Identity, TokenService};
pub use user_directory::{InMemoryUserDirectory, UserDirectory};
