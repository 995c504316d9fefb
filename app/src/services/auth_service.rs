// cartkeep_app/src/services/auth_service.rs

//! Password hashing and verification.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password with Argon2 (default parameters, random salt).
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing failed: {}", argon_err))
    })
}

/// `Ok(false)` for a wrong password; `Err` only when the stored hash is unusable.
#[instrument(
  name = "auth_service::verify_password",
  skip(stored_hash, provided_password),
  err(Display),
  fields(hash_len = stored_hash.len())
)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash.");
    AppError::Internal(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", other)))
    }
  }
}

/// Loose shape check: one `@`, non-empty local part, a dot in the domain.
pub fn is_plausible_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && !email.chars().any(char::is_whitespace)
    && domain.split('.').count() >= 2
    && domain.split('.').all(|label| !label.is_empty())
}
