// cartkeep_app/src/config.rs

use crate::errors::{AppError, Result};
use cartkeep::EngineConfig;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const MIN_TOKEN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

/// Account created at startup when no admin with that email exists yet.
#[derive(Clone)]
pub struct AdminAccount {
  pub email: String,
  pub password: String,
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent means in-memory catalog, carts and users.
  pub database_url: Option<String>,
  pub token_secret: String,
  pub token_ttl: Duration,
  pub seed_db: bool,
  pub admin: Option<AdminAccount>,
  pub cart_max_retries: u32,
  pub cart_op_timeout: Duration,
  pub log_format: LogFormat,
}

// Keeps the signing secret and database credentials out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("token_secret", &"[REDACTED]")
      .field("token_ttl", &self.token_ttl)
      .field("seed_db", &self.seed_db)
      .field("admin_email", &self.admin.as_ref().map(|a| a.email.as_str()))
      .field("cart_max_retries", &self.cart_max_retries)
      .field("cart_op_timeout", &self.cart_op_timeout)
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process
  /// environment, tests pass a map.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
    let parse_err = |name: &str, e: &dyn std::fmt::Display| AppError::Config(format!("Invalid {}: {}", name, e));

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| parse_err("SERVER_PORT", &e))?;
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

    let token_secret = lookup("TOKEN_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'TOKEN_SECRET'".to_string()))?;
    if token_secret.len() < MIN_TOKEN_SECRET_LEN {
      return Err(AppError::Config(format!(
        "TOKEN_SECRET must be at least {} bytes",
        MIN_TOKEN_SECRET_LEN
      )));
    }
    let token_ttl = get_or("TOKEN_TTL_SECS", "3600")
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| parse_err("TOKEN_TTL_SECS", &e))?;

    let seed_db = get_or("SEED_DB", "false")
      .parse::<bool>()
      .map_err(|e| parse_err("SEED_DB", &e))?;

    let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
      (Some(email), Some(password)) => Some(AdminAccount { email, password }),
      (None, None) => None,
      _ => {
        return Err(AppError::Config(
          "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
        ))
      }
    };

    let defaults = EngineConfig::default();
    let cart_max_retries = get_or("CART_MAX_RETRIES", &defaults.max_conflict_retries.to_string())
      .parse::<u32>()
      .map_err(|e| parse_err("CART_MAX_RETRIES", &e))?;
    let cart_op_timeout = get_or(
      "CART_OP_TIMEOUT_MS",
      &defaults.operation_timeout.as_millis().to_string(),
    )
    .parse::<u64>()
    .map(Duration::from_millis)
    .map_err(|e| parse_err("CART_OP_TIMEOUT_MS", &e))?;

    let log_format = match get_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
      "text" => LogFormat::Text,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      token_secret,
      token_ttl,
      seed_db,
      admin,
      cart_max_retries,
      cart_op_timeout,
      log_format,
    })
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      max_conflict_retries: self.cart_max_retries,
      operation_timeout: self.cart_op_timeout,
      ..EngineConfig::default()
    }
  }
}
