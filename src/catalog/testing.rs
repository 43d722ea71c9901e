//! In-memory `ProductApi` used by the session tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::client::ProductApi;
use super::error::CatalogError;
use super::types::{DeleteOutcome, Product, ProductDraft, ProductList, ProductPatch};

#[derive(Default)]
struct State {
  products: Vec<Product>,
  next_id: u64,
  calls: HashMap<&'static str, usize>,
  searches: Vec<String>,
  fail_next: Option<CatalogError>,
}

/// Behaves like the demo server: sequential ids, 404 on unknown ids,
/// title/description substring search.
pub struct FakeCatalog {
  state: Mutex<State>,
}

impl FakeCatalog {
  pub fn with_products(count: u64) -> Self {
    let products = (1..=count)
      .map(|id| Product {
        id,
        title: format!("Product {}", id),
        brand: "Acme".to_string(),
        category: "general".to_string(),
        sku: format!("SKU-{}", id),
        price: id as f64,
        stock: 20,
        ..Default::default()
      })
      .collect();

    Self {
      state: Mutex::new(State {
        products,
        next_id: count + 1,
        ..Default::default()
      }),
    }
  }

  /// Make the next call fail with `error`
  pub fn fail_next(&self, error: CatalogError) {
    self.state.lock().unwrap().fail_next = Some(error);
  }

  pub fn calls(&self, operation: &str) -> usize {
    self
      .state
      .lock()
      .unwrap()
      .calls
      .get(operation)
      .copied()
      .unwrap_or(0)
  }

  pub fn searches(&self) -> Vec<String> {
    self.state.lock().unwrap().searches.clone()
  }

  fn begin(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, State>, CatalogError> {
    let mut state = self.state.lock().unwrap();
    *state.calls.entry(operation).or_default() += 1;
    match state.fail_next.take() {
      Some(error) => Err(error),
      None => Ok(state),
    }
  }
}

fn not_found(id: u64) -> CatalogError {
  CatalogError::NotFound {
    id,
    message: Some(format!("Product with id '{}' not found", id)),
  }
}

#[async_trait]
impl ProductApi for FakeCatalog {
  async fn list(&self, limit: u64, skip: u64) -> Result<ProductList, CatalogError> {
    let state = self.begin("list")?;
    let products = state
      .products
      .iter()
      .skip(skip as usize)
      .take(limit as usize)
      .cloned()
      .collect();
    Ok(ProductList {
      products,
      total: state.products.len() as u64,
      skip,
      limit,
    })
  }

  async fn get(&self, id: u64) -> Result<Product, CatalogError> {
    let state = self.begin("get")?;
    state
      .products
      .iter()
      .find(|p| p.id == id)
      .cloned()
      .ok_or_else(|| not_found(id))
  }

  async fn create(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
    let mut state = self.begin("create")?;
    let id = state.next_id;
    state.next_id += 1;
    let product = Product {
      id,
      title: draft.title.clone(),
      category: draft.category.clone(),
      sku: draft.sku.clone(),
      price: draft.price,
      stock: draft.stock,
      availability_status: draft.availability_status,
      minimum_order_quantity: draft.minimum_order_quantity,
      ..Default::default()
    };
    state.products.insert(0, product.clone());
    Ok(product)
  }

  async fn update(&self, id: u64, patch: &ProductPatch) -> Result<Product, CatalogError> {
    let mut state = self.begin("update")?;
    let product = state
      .products
      .iter_mut()
      .find(|p| p.id == id)
      .ok_or_else(|| not_found(id))?;

    if let Some(title) = &patch.title {
      product.title = title.clone();
    }
    if let Some(price) = patch.price {
      product.price = price;
    }
    if let Some(stock) = patch.stock {
      product.stock = stock;
    }
    if let Some(status) = patch.availability_status {
      product.availability_status = status;
    }
    Ok(product.clone())
  }

  async fn delete(&self, id: u64) -> Result<DeleteOutcome, CatalogError> {
    let mut state = self.begin("delete")?;
    let before = state.products.len();
    state.products.retain(|p| p.id != id);
    Ok(DeleteOutcome {
      id,
      was_deleted: state.products.len() < before,
    })
  }

  async fn search(&self, query: &str) -> Result<ProductList, CatalogError> {
    let mut state = self.begin("search")?;
    state.searches.push(query.to_string());
    let needle = query.to_lowercase();
    let products: Vec<Product> = state
      .products
      .iter()
      .filter(|p| {
        p.title.to_lowercase().contains(&needle) || p.description.to_lowercase().contains(&needle)
      })
      .cloned()
      .collect();
    let total = products.len() as u64;
    Ok(ProductList {
      products,
      total,
      skip: 0,
      limit: total,
    })
  }
}
