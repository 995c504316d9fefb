// cartkeep_app/src/services/user_directory.rs

//! Account storage. Emails are unique and compared case-insensitively.

use crate::models::{NewUser, User};
use async_trait::async_trait;
use cartkeep::StoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait]
pub trait UserDirectory: Send + Sync {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

  async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

  /// Fails with `StoreError::AlreadyExists` when the email is taken.
  async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
  users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
    Ok(self.users.read().get(&id).cloned())
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
    let users = self.users.read();
    Ok(users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
  }

  async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
    let mut users = self.users.write();
    if users.values().any(|u| u.email.eq_ignore_ascii_case(&new_user.email)) {
      return Err(StoreError::AlreadyExists(format!("user with email {}", new_user.email)));
    }
    let user = new_user.into_user();
    users.insert(user.id, user.clone());
    Ok(user)
  }
}
