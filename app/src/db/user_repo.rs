// cartkeep_app/src/db/user_repo.rs

use crate::db::{backend_error, is_unique_violation};
use crate::models::{NewUser, Role, User};
use crate::services::UserDirectory;
use async_trait::async_trait;
use cartkeep::StoreError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, password_hash, created_at, updated_at";

pub struct PgUserDirectory {
  pool: PgPool,
}

impl PgUserDirectory {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role").map_err(backend_error)?;
    Ok(User {
      id: row.try_get("id").map_err(backend_error)?,
      email: row.try_get("email").map_err(backend_error)?,
      first_name: row.try_get("first_name").map_err(backend_error)?,
      last_name: row.try_get("last_name").map_err(backend_error)?,
      role: role.parse::<Role>().map_err(|e| StoreError::from(anyhow::anyhow!(e)))?,
      password_hash: row.try_get("password_hash").map_err(backend_error)?,
      created_at: row.try_get("created_at").map_err(backend_error)?,
      updated_at: row.try_get("updated_at").map_err(backend_error)?,
    })
  }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
  #[instrument(name = "PgUserDirectory::find_by_id", skip(self), err(Display))]
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;
    row.as_ref().map(Self::user_from_row).transpose()
  }

  #[instrument(name = "PgUserDirectory::find_by_email", skip(self, email), err(Display))]
  async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend_error)?;
    row.as_ref().map(Self::user_from_row).transpose()
  }

  #[instrument(name = "PgUserDirectory::insert", skip_all, err(Display))]
  async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
    let user = new_user.into_user();
    let row = sqlx::query(&format!(
      r#"
      INSERT INTO users (id, email, first_name, last_name, role, password_hash, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
      RETURNING {}
      "#,
      USER_COLUMNS
    ))
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.as_str())
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e) {
        StoreError::AlreadyExists(format!("user with email {}", user.email))
      } else {
        backend_error(e)
      }
    })?;
    Self::user_from_row(&row)
  }
}
