//! Serde types matching the catalog API's response envelopes.
//!
//! Products themselves deserialize straight into the domain types; only the
//! wrappers around them live here.

use serde::Deserialize;

use super::types::{DeleteOutcome, Product, ProductList};

/// `GET /products` and `GET /products/search` response
#[derive(Debug, Deserialize)]
pub struct ApiProductsResponse {
  #[serde(default)]
  pub products: Vec<Product>,
  #[serde(default)]
  pub total: u64,
  #[serde(default)]
  pub skip: u64,
  #[serde(default)]
  pub limit: u64,
}

impl From<ApiProductsResponse> for ProductList {
  fn from(response: ApiProductsResponse) -> Self {
    ProductList {
      products: response.products,
      total: response.total,
      skip: response.skip,
      limit: response.limit,
    }
  }
}

/// `DELETE /products/{id}` response. The server also echoes the product
/// and a `deletedOn` timestamp, which are ignored.
#[derive(Debug, Deserialize)]
pub struct ApiDeleteResponse {
  pub id: u64,
  #[serde(rename = "isDeleted", default)]
  pub is_deleted: bool,
}

impl From<ApiDeleteResponse> for DeleteOutcome {
  fn from(response: ApiDeleteResponse) -> Self {
    DeleteOutcome {
      id: response.id,
      was_deleted: response.is_deleted,
    }
  }
}

/// Error body, e.g. `{"message": "Product with id '999' not found"}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
  pub message: Option<String>,
}

/// Pull the server's message out of an error body, if it has one.
pub fn error_message(body: &str) -> Option<String> {
  serde_json::from_str::<ApiErrorBody>(body)
    .ok()
    .and_then(|b| b.message)
    .map(|m| m.trim().to_string())
    .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_products_response_into_list() {
    let response: ApiProductsResponse = serde_json::from_str(
      r#"{"products": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}], "total": 194, "skip": 0, "limit": 2}"#,
    )
    .unwrap();

    let list = ProductList::from(response);
    assert_eq!(list.products.len(), 2);
    assert_eq!(list.total, 194);
    assert_eq!(list.limit, 2);
    assert!(list.contains(2));
  }

  #[test]
  fn test_delete_response_ignores_echoed_product() {
    let response: ApiDeleteResponse = serde_json::from_str(
      r#"{"id": 7, "title": "Gone", "isDeleted": true, "deletedOn": "2024-06-01T10:00:00.000Z"}"#,
    )
    .unwrap();

    assert_eq!(
      DeleteOutcome::from(response),
      DeleteOutcome {
        id: 7,
        was_deleted: true
      }
    );
  }

  #[test]
  fn test_error_message() {
    assert_eq!(
      error_message(r#"{"message": "Product with id '999' not found"}"#),
      Some("Product with id '999' not found".to_string())
    );
    assert_eq!(error_message(r#"{"message": "  "}"#), None);
    assert_eq!(error_message("<html>Bad Gateway</html>"), None);
  }
}
