// cartkeep_app/src/services/admin_bootstrap.rs

//! Startup creation of the configured admin account. Registration only ever
//! creates customers, so this is how an admin comes to exist.

use crate::config::AdminAccount;
use crate::errors::AppError;
use crate::models::{NewUser, Role, User};
use crate::services::auth_service::{hash_password, is_plausible_email};
use crate::services::UserDirectory;
use tracing::{info, instrument};

/// Inserts the admin if its email is unused. An existing admin is returned
/// untouched, password included; an existing customer with that email is a
/// configuration error.
#[instrument(name = "bootstrap::ensure_admin", skip(users, account), fields(email = %account.email), err(Display))]
pub async fn ensure_admin(users: &dyn UserDirectory, account: &AdminAccount) -> Result<User, AppError> {
  let email = account.email.trim().to_lowercase();
  if !is_plausible_email(&email) {
    return Err(AppError::Config(format!("ADMIN_EMAIL is not a valid email: {}", account.email)));
  }

  if let Some(existing) = users.find_by_email(&email).await? {
    if existing.role != Role::Admin {
      return Err(AppError::Config(format!(
        "ADMIN_EMAIL {} belongs to a {} account",
        email, existing.role
      )));
    }
    info!(user_id = %existing.id, "Admin account already present.");
    return Ok(existing);
  }

  let admin = users
    .insert(NewUser {
      email,
      first_name: "Admin".to_string(),
      last_name: "User".to_string(),
      role: Role::Admin,
      password_hash: hash_password(&account.password)?,
    })
    .await?;
  info!(user_id = %admin.id, "Admin account created.");
  Ok(admin)
}
