// cartkeep_app/src/web/envelope.rs

use serde::Serialize;

/// Success body shared by every endpoint. Failures are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub count: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    Self {
      success: true,
      message: None,
      count: None,
      token: None,
      data: Some(data),
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  pub fn with_token(mut self, token: String) -> Self {
    self.token = Some(token);
    self
  }
}
