// cartkeep_app/src/db/mod.rs

//! Postgres backends for the catalog, carts and users.

pub mod cart_repo;
pub mod catalog_repo;
pub mod user_repo;

use cartkeep::StoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub use cart_repo::PgCartStore;
pub use catalog_repo::PgCatalog;
pub use user_repo::PgUserDirectory;

const SCHEMA: &str = include_str!("schema.sql");

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
  let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
  info!("Successfully connected to the database.");
  Ok(pool)
}

pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
  sqlx::raw_sql(SCHEMA).execute(pool).await?;
  info!("Database schema is up to date.");
  Ok(())
}

pub(crate) fn backend_error(err: sqlx::Error) -> StoreError {
  StoreError::Backend { source: err.into() }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
  err
    .as_database_error()
    .map(|db_err| db_err.is_unique_violation())
    .unwrap_or(false)
}
