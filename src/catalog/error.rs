//! Typed failures surfaced by the product API.

use thiserror::Error;

/// Failure of a remote catalog operation.
///
/// The three kinds travel unchanged from the client through the mutation
/// coordinator up to the views. The type is `Clone` so that a failed
/// mutation can keep its error around for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
  /// Network or HTTP-level failure with no message meant for the user
  #[error("transport error: {detail}")]
  Transport { detail: String },

  /// The server confirmed the product does not exist
  #[error("product {id} not found")]
  NotFound { id: u64, message: Option<String> },

  /// The server rejected the payload
  #[error("rejected: {message}")]
  Validation { message: String },
}

impl CatalogError {
  pub fn transport(detail: impl Into<String>) -> Self {
    Self::Transport {
      detail: detail.into(),
    }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation {
      message: message.into(),
    }
  }

  /// Message provided by the server, if it sent one.
  pub fn server_message(&self) -> Option<&str> {
    match self {
      Self::Transport { .. } => None,
      Self::NotFound { message, .. } => message.as_deref(),
      Self::Validation { message } => Some(message),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }
}

impl From<reqwest::Error> for CatalogError {
  fn from(err: reqwest::Error) -> Self {
    Self::transport(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_transport_has_no_server_message() {
    let err = CatalogError::transport("connection refused");
    assert_eq!(err.server_message(), None);
    assert_eq!(err.to_string(), "transport error: connection refused");
  }

  #[test]
  fn test_not_found_message() {
    let err = CatalogError::NotFound {
      id: 7,
      message: Some("Product with id '7' not found".to_string()),
    };
    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("Product with id '7' not found"));

    let bare = CatalogError::NotFound { id: 7, message: None };
    assert_eq!(bare.server_message(), None);
  }

  #[test]
  fn test_validation_message() {
    let err = CatalogError::validation("title is required");
    assert_eq!(err.server_message(), Some("title is required"));
  }
}
