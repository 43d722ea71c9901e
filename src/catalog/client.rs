use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;

use super::api_types::{error_message, ApiDeleteResponse, ApiProductsResponse};
use super::error::CatalogError;
use super::types::{DeleteOutcome, Product, ProductDraft, ProductList, ProductPatch};

/// The six operations the catalog exposes.
///
/// Kept as a trait so the session can run against the HTTP client in the
/// app and against an in-memory double in tests.
#[async_trait]
pub trait ProductApi: Send + Sync {
  /// One page of the collection
  async fn list(&self, limit: u64, skip: u64) -> Result<ProductList, CatalogError>;

  /// A single product
  async fn get(&self, id: u64) -> Result<Product, CatalogError>;

  /// Create a product; the server assigns the id
  async fn create(&self, draft: &ProductDraft) -> Result<Product, CatalogError>;

  /// Change only the fields present in `patch`
  async fn update(&self, id: u64, patch: &ProductPatch) -> Result<Product, CatalogError>;

  /// Delete a product. Deleting an absent id reports `was_deleted: false`.
  async fn delete(&self, id: u64) -> Result<DeleteOutcome, CatalogError>;

  /// Full-text search. Callers must not pass a blank query.
  async fn search(&self, query: &str) -> Result<ProductList, CatalogError>;
}

/// HTTP implementation of [`ProductApi`]
#[derive(Clone)]
pub struct HttpProductClient {
  client: Client,
  base_url: Url,
}

impl HttpProductClient {
  pub fn new(config: &Config) -> Result<Self, CatalogError> {
    Self::with_base_url(&config.api.url, config.timeout())
  }

  /// Build a client against an arbitrary base URL (used by tests).
  pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
    // A trailing slash makes `Url::join` append instead of replacing the last segment
    let normalized = format!("{}/", base_url.trim_end_matches('/'));
    let base_url = Url::parse(&normalized)
      .map_err(|e| CatalogError::transport(format!("invalid API url {}: {}", base_url, e)))?;

    let client = Client::builder()
      .timeout(timeout)
      .connect_timeout(Duration::from_secs(10))
      .build()?;

    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CatalogError> {
    let url = self
      .base_url
      .join(path)
      .map_err(|e| CatalogError::transport(format!("invalid path {}: {}", path, e)))?;
    debug!("{} {}", method, url);
    Ok(self.client.request(method, url))
  }

  /// Send a request and sort non-success statuses into error kinds.
  ///
  /// `id` is the product the request refers to, used for `NotFound`.
  async fn send(&self, request: RequestBuilder, id: Option<u64>) -> Result<Response, CatalogError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    warn!("catalog API returned {}: {}", status, message.as_deref().unwrap_or(""));

    Err(match (status, id) {
      (StatusCode::NOT_FOUND, Some(id)) => CatalogError::NotFound { id, message },
      (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
        CatalogError::Validation {
          message: message.unwrap_or_else(|| format!("request rejected ({})", status)),
        }
      }
      _ => CatalogError::transport(format!("unexpected status {}", status)),
    })
  }
}

#[async_trait]
impl ProductApi for HttpProductClient {
  async fn list(&self, limit: u64, skip: u64) -> Result<ProductList, CatalogError> {
    let request = self
      .request(Method::GET, "products")?
      .query(&[("limit", limit), ("skip", skip)]);

    let response: ApiProductsResponse = self.send(request, None).await?.json().await?;
    Ok(response.into())
  }

  async fn get(&self, id: u64) -> Result<Product, CatalogError> {
    let request = self.request(Method::GET, &format!("products/{}", id))?;
    Ok(self.send(request, Some(id)).await?.json().await?)
  }

  async fn create(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
    let request = self.request(Method::POST, "products/add")?.json(draft);
    Ok(self.send(request, None).await?.json().await?)
  }

  async fn update(&self, id: u64, patch: &ProductPatch) -> Result<Product, CatalogError> {
    let request = self
      .request(Method::PUT, &format!("products/{}", id))?
      .json(patch);
    Ok(self.send(request, Some(id)).await?.json().await?)
  }

  async fn delete(&self, id: u64) -> Result<DeleteOutcome, CatalogError> {
    let request = self.request(Method::DELETE, &format!("products/{}", id))?;

    match self.send(request, Some(id)).await {
      Ok(response) => {
        let response: ApiDeleteResponse = response.json().await?;
        Ok(response.into())
      }
      Err(CatalogError::NotFound { .. }) => {
        debug!("product {} already absent", id);
        Ok(DeleteOutcome {
          id,
          was_deleted: false,
        })
      }
      Err(e) => Err(e),
    }
  }

  async fn search(&self, query: &str) -> Result<ProductList, CatalogError> {
    let query = query.trim();
    if query.is_empty() {
      return Err(CatalogError::validation("search query must not be empty"));
    }

    let request = self
      .request(Method::GET, "products/search")?
      .query(&[("q", query)]);

    let response: ApiProductsResponse = self.send(request, None).await?.json().await?;
    Ok(response.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::types::AvailabilityStatus;
  use serde_json::json;
  use wiremock::matchers::{body_json, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer) -> HttpProductClient {
    HttpProductClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap()
  }

  fn page_body(ids: &[u64], total: u64) -> serde_json::Value {
    let products: Vec<_> = ids
      .iter()
      .map(|id| json!({ "id": id, "title": format!("Product {}", id), "price": 10.0 }))
      .collect();
    json!({ "products": products, "total": total, "skip": 0, "limit": ids.len() })
  }

  #[tokio::test]
  async fn test_list_passes_limit_and_skip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/products"))
      .and(query_param("limit", "10"))
      .and(query_param("skip", "0"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(page_body(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 194)),
      )
      .expect(1)
      .mount(&server)
      .await;

    let list = client_for(&server).list(10, 0).await.unwrap();
    assert_eq!(list.products.len(), 10);
    assert_eq!(list.total, 194);
  }

  #[tokio::test]
  async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/products/3"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "title": "Three" })))
      .mount(&server)
      .await;

    let client =
      HttpProductClient::with_base_url(&format!("{}/api", server.uri()), Duration::from_secs(5))
        .unwrap();
    let product = client.get(3).await.unwrap();
    assert_eq!(product.title, "Three");
  }

  #[tokio::test]
  async fn test_get_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/products/999"))
      .respond_with(
        ResponseTemplate::new(404)
          .set_body_json(json!({ "message": "Product with id '999' not found" })),
      )
      .mount(&server)
      .await;

    let err = client_for(&server).get(999).await.unwrap_err();
    assert_eq!(
      err,
      CatalogError::NotFound {
        id: 999,
        message: Some("Product with id '999' not found".to_string())
      }
    );
  }

  #[tokio::test]
  async fn test_server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/products"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let err = client_for(&server).list(10, 0).await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport { .. }));
  }

  #[tokio::test]
  async fn test_create_posts_draft() {
    let server = MockServer::start().await;
    let draft = ProductDraft {
      title: "Desk Lamp".to_string(),
      category: "home-decoration".to_string(),
      sku: "LMP-1".to_string(),
      price: 24.0,
      ..Default::default()
    };

    Mock::given(method("POST"))
      .and(path("/products/add"))
      .and(body_json(serde_json::to_value(&draft).unwrap()))
      .respond_with(
        ResponseTemplate::new(201)
          .set_body_json(json!({ "id": 195, "title": "Desk Lamp", "price": 24.0 })),
      )
      .expect(1)
      .mount(&server)
      .await;

    let product = client_for(&server).create(&draft).await.unwrap();
    assert_eq!(product.id, 195);
    assert_eq!(product.title, "Desk Lamp");
  }

  #[tokio::test]
  async fn test_create_rejected_is_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/products/add"))
      .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid price" })))
      .mount(&server)
      .await;

    let err = client_for(&server)
      .create(&ProductDraft::default())
      .await
      .unwrap_err();
    assert_eq!(err, CatalogError::validation("Invalid price"));
  }

  #[tokio::test]
  async fn test_update_sends_only_provided_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/products/42"))
      .and(body_json(json!({ "stock": 0, "availabilityStatus": "Out of Stock" })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "id": 42,
        "title": "Wireless Mouse",
        "stock": 0,
        "availabilityStatus": "Out of Stock"
      })))
      .expect(1)
      .mount(&server)
      .await;

    let patch = ProductPatch {
      stock: Some(0),
      availability_status: Some(AvailabilityStatus::OutOfStock),
      ..Default::default()
    };
    let product = client_for(&server).update(42, &patch).await.unwrap();
    assert_eq!(product.stock, 0);
    assert_eq!(product.availability_status, AvailabilityStatus::OutOfStock);
  }

  #[tokio::test]
  async fn test_update_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/products/500"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let err = client_for(&server)
      .update(500, &ProductPatch::default())
      .await
      .unwrap_err();
    assert_eq!(err, CatalogError::NotFound { id: 500, message: None });
  }

  #[tokio::test]
  async fn test_delete_existing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/products/3"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "id": 3,
        "title": "Gone",
        "isDeleted": true,
        "deletedOn": "2024-06-01T10:00:00.000Z"
      })))
      .mount(&server)
      .await;

    let outcome = client_for(&server).delete(3).await.unwrap();
    assert_eq!(
      outcome,
      DeleteOutcome {
        id: 3,
        was_deleted: true
      }
    );
  }

  #[tokio::test]
  async fn test_delete_absent_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/products/7"))
      .respond_with(
        ResponseTemplate::new(404).set_body_json(json!({ "message": "Product with id '7' not found" })),
      )
      .mount(&server)
      .await;

    let outcome = client_for(&server).delete(7).await.unwrap();
    assert_eq!(
      outcome,
      DeleteOutcome {
        id: 7,
        was_deleted: false
      }
    );
  }

  #[tokio::test]
  async fn test_search_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/products/search"))
      .and(query_param("q", "wireless"))
      .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[42, 43], 2)))
      .expect(1)
      .mount(&server)
      .await;

    let list = client_for(&server).search("  wireless ").await.unwrap();
    assert_eq!(list.total, 2);
    assert!(list.contains(42));
  }

  #[tokio::test]
  async fn test_blank_search_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/products/search"))
      .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[], 0)))
      .expect(0)
      .mount(&server)
      .await;

    let err = client_for(&server).search("   ").await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));
  }
}
