// cartkeep_app/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Customer,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "customer" => Ok(Role::Customer),
      "admin" => Ok(Role::Admin),
      other => Err(format!("unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A validated registration, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
  pub password_hash: String,
}

impl NewUser {
  pub fn into_user(self) -> User {
    let now = Utc::now();
    User {
      id: Uuid::new_v4(),
      email: self.email,
      first_name: self.first_name,
      last_name: self.last_name,
      role: self.role,
      password_hash: self.password_hash,
      created_at: now,
      updated_at: now,
    }
  }
}
