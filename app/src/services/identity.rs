// cartkeep_app/src/services/identity.rs

//! Bearer tokens and role checks.
//!
//! A token is `base64url(claims_json) "." base64url(hmac_sha256(secret, first_segment))`.

use crate::errors::AppError;
use crate::models::{Role, User};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub role: Role,
  /// Expiry, seconds since the Unix epoch.
  pub exp: i64,
}

/// The caller behind a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
  pub user_id: Uuid,
  pub role: Role,
}

pub struct TokenService {
  secret: Vec<u8>,
  ttl: Duration,
}

impl TokenService {
  pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
    Self {
      secret: secret.into(),
      ttl,
    }
  }

  pub fn issue(&self, user: &User) -> Result<String, AppError> {
    let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = Claims {
      sub: user.id,
      role: user.role,
      exp: Utc::now().timestamp().saturating_add(ttl),
    };
    self.sign(&claims)
  }

  pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
    let payload =
      serde_json::to_vec(claims).map_err(|e| AppError::Internal(format!("Token claims encoding failed: {}", e)))?;
    let claims_segment = URL_SAFE_NO_PAD.encode(payload);
    let signature = URL_SAFE_NO_PAD.encode(self.mac(claims_segment.as_bytes())?.finalize().into_bytes());
    Ok(format!("{}.{}", claims_segment, signature))
  }

  /// Checks signature first, then expiry.
  #[instrument(name = "TokenService::verify", skip_all, err(Display))]
  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    let invalid = || AppError::Auth("Not authorized, token failed".to_string());

    let (claims_segment, signature_segment) = token.split_once('.').ok_or_else(invalid)?;
    let signature = URL_SAFE_NO_PAD.decode(signature_segment).map_err(|_| invalid())?;
    self
      .mac(claims_segment.as_bytes())?
      .verify_slice(&signature)
      .map_err(|_| {
        debug!("Token signature mismatch.");
        invalid()
      })?;

    let payload = URL_SAFE_NO_PAD.decode(claims_segment).map_err(|_| invalid())?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| invalid())?;
    if claims.exp <= Utc::now().timestamp() {
      debug!(user_id = %claims.sub, "Token expired.");
      return Err(AppError::Auth("Not authorized, token expired".to_string()));
    }
    Ok(claims)
  }

  fn mac(&self, data: &[u8]) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(&self.secret)
      .map_err(|e| AppError::Config(format!("Unusable token secret: {}", e)))?;
    mac.update(data);
    Ok(mac)
  }
}

/// Capability check run before any role-restricted operation.
pub fn require_role(identity: &Identity, allowed: &[Role]) -> Result<(), AppError> {
  if allowed.contains(&identity.role) {
    Ok(())
  } else {
    Err(AppError::Forbidden(format!(
      "User role {} is not authorized to access this route",
      identity.role
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::NewUser;

  const SECRET: &str = "an-hmac-secret-that-is-long-enough!!";

  fn user(role: Role) -> User {
    NewUser {
      email: "ada@example.com".into(),
      first_name: "Ada".into(),
      last_name: "Lovelace".into(),
      role,
      password_hash: String::new(),
    }
    .into_user()
  }

  #[test]
  fn issued_token_verifies_to_the_same_user() {
    let tokens = TokenService::new(SECRET, Duration::from_secs(3600));
    let admin = user(Role::Admin);
    let claims = tokens.verify(&tokens.issue(&admin).unwrap()).unwrap();
    assert_eq!(claims.sub, admin.id);
    assert_eq!(claims.role, Role::Admin);
    assert!(claims.exp > Utc::now().timestamp());
  }

  #[test]
  fn token_from_another_secret_is_rejected() {
    let theirs = TokenService::new("some-other-secret-of-sufficient-size", Duration::from_secs(3600));
    let ours = TokenService::new(SECRET, Duration::from_secs(3600));
    let token = theirs.issue(&user(Role::Customer)).unwrap();
    assert!(matches!(ours.verify(&token), Err(AppError::Auth(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let tokens = TokenService::new(SECRET, Duration::from_secs(3600));
    let claims = Claims {
      sub: Uuid::new_v4(),
      role: Role::Customer,
      exp: Utc::now().timestamp() - 1,
    };
    let token = tokens.sign(&claims).unwrap();
    assert!(matches!(tokens.verify(&token), Err(AppError::Auth(ref m)) if m.contains("expired")));
  }

  #[test]
  fn tampered_claims_are_rejected() {
    let tokens = TokenService::new(SECRET, Duration::from_secs(3600));
    let token = tokens.issue(&user(Role::Customer)).unwrap();
    let (_, signature) = token.split_once('.').unwrap();

    let forged = Claims {
      sub: Uuid::new_v4(),
      role: Role::Admin,
      exp: Utc::now().timestamp() + 3600,
    };
    let forged_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
    let forged_token = format!("{}.{}", forged_segment, signature);
    assert!(tokens.verify(&forged_token).is_err());
  }

  #[test]
  fn malformed_tokens_are_rejected() {
    let tokens = TokenService::new(SECRET, Duration::from_secs(3600));
    for token in ["", "abc", "abc.def", "....", "eyJ9.!!!"] {
      assert!(matches!(tokens.verify(token), Err(AppError::Auth(_))), "{}", token);
    }
  }

  #[test]
  fn require_role_allows_listed_roles_only() {
    let customer = Identity {
      user_id: Uuid::new_v4(),
      role: Role::Customer,
    };
    assert!(require_role(&customer, &[Role::Customer, Role::Admin]).is_ok());
    assert!(matches!(require_role(&customer, &[Role::Admin]), Err(AppError::Forbidden(_))));
  }
}
