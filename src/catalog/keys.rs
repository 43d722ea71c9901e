//! Cache keys for catalog queries.

use std::fmt;

use super::types::{Product, ProductList};

/// Prefix shared by every paginated list entry
pub const LIST_FAMILY: &str = "list:";
/// Prefix shared by every search result entry
pub const SEARCH_FAMILY: &str = "search:";
/// Prefix of per-id entries
pub const PRODUCT_FAMILY: &str = "product:";

/// What a cached value was fetched with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProductKey {
  /// One page of the collection
  List { limit: u64, skip: u64 },
  /// A single product
  Detail { id: u64 },
  /// Search results for a (non-blank) query
  Search { query: String },
}

impl ProductKey {
  pub fn list(limit: u64, skip: u64) -> Self {
    Self::List { limit, skip }
  }

  pub fn detail(id: u64) -> Self {
    Self::Detail { id }
  }

  /// Search key, or `None` when the query is blank and must not be sent.
  pub fn search(query: &str) -> Option<Self> {
    let query = query.trim();
    if query.is_empty() {
      None
    } else {
      Some(Self::Search {
        query: query.to_string(),
      })
    }
  }

  /// Stable string key, e.g. `list:limit=10,skip=0`, `product:42`,
  /// `search:wireless`
  pub fn cache_key(&self) -> String {
    match self {
      Self::List { limit, skip } => format!("{}limit={},skip={}", LIST_FAMILY, limit, skip),
      Self::Detail { id } => format!("{}{}", PRODUCT_FAMILY, id),
      Self::Search { query } => format!("{}{}", SEARCH_FAMILY, normalize_query(query)),
    }
  }

  pub fn description(&self) -> String {
    match self {
      Self::List { limit, skip } => format!("products {}-{}", skip + 1, skip + limit),
      Self::Detail { id } => format!("product {}", id),
      Self::Search { query } => format!("search \"{}\"", query),
    }
  }
}

impl fmt::Display for ProductKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.cache_key())
  }
}

/// Normalize a search query for consistent keys.
/// Trims whitespace and lowercases; the server matches case-insensitively.
fn normalize_query(query: &str) -> String {
  query.trim().to_lowercase()
}

/// Values held in the catalog cache
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogData {
  /// A list page or a search result
  Page(ProductList),
  /// A single product
  Product(Box<Product>),
}

impl CatalogData {
  pub fn as_page(&self) -> Option<&ProductList> {
    match self {
      Self::Page(list) => Some(list),
      Self::Product(_) => None,
    }
  }

  pub fn as_page_mut(&mut self) -> Option<&mut ProductList> {
    match self {
      Self::Page(list) => Some(list),
      Self::Product(_) => None,
    }
  }

  pub fn as_product(&self) -> Option<&Product> {
    match self {
      Self::Product(product) => Some(product),
      Self::Page(_) => None,
    }
  }
}
