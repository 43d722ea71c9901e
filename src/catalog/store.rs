//! Read side of the catalog: cache lookups plus background refetches.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CacheLookup;
use crate::notify::Notifications;
use crate::task::{InFlight, Poll};

use super::client::ProductApi;
use super::error::CatalogError;
use super::keys::{CatalogData, ProductKey};
use super::sync::CatalogCache;
use super::types::{Product, ProductList};

/// Owns the query cache and the fetches currently running for it.
///
/// Reads never wait: `request` hands back whatever is cached and starts a
/// background fetch when the entry is absent or stale. Results land in the
/// cache when `poll` collects them. At most one fetch per key runs at a time.
/// A key whose last fetch failed is not fetched again until `refresh`.
pub struct CatalogStore {
  api: Arc<dyn ProductApi>,
  cache: CatalogCache,
  in_flight: HashMap<String, (ProductKey, InFlight<CatalogData>)>,
  /// Last failure per key. Cleared by `refresh` or when a value lands.
  errors: HashMap<String, CatalogError>,
}

impl CatalogStore {
  pub fn new(api: Arc<dyn ProductApi>, cache: CatalogCache) -> Self {
    Self {
      api,
      cache,
      in_flight: HashMap::new(),
      errors: HashMap::new(),
    }
  }

  pub fn api(&self) -> Arc<dyn ProductApi> {
    Arc::clone(&self.api)
  }

  pub fn cache(&self) -> &CatalogCache {
    &self.cache
  }

  pub fn cache_mut(&mut self) -> &mut CatalogCache {
    &mut self.cache
  }

  /// Look up `key` and make sure a fetch is running if the value is
  /// absent or stale. Failed keys wait for `refresh`.
  pub fn request(&mut self, key: &ProductKey) -> CacheLookup<&CatalogData> {
    let cache_key = key.cache_key();
    let needs_fetch = self.cache.read(&cache_key).needs_fetch();
    if !needs_fetch {
      // A mutation wrote a fresh value since the failure
      self.errors.remove(&cache_key);
    } else if !self.errors.contains_key(&cache_key) && !self.in_flight.contains_key(&cache_key) {
      self.start_fetch(key.clone());
    }
    self.cache.read(&cache_key)
  }

  /// Look up `key` without fetching
  pub fn peek(&self, key: &ProductKey) -> CacheLookup<&CatalogData> {
    self.cache.read(&key.cache_key())
  }

  pub fn peek_list(&self, key: &ProductKey) -> CacheLookup<&ProductList> {
    self.peek(key).and_then(CatalogData::as_page)
  }

  pub fn peek_product(&self, id: u64) -> CacheLookup<&Product> {
    self
      .peek(&ProductKey::detail(id))
      .and_then(CatalogData::as_product)
  }

  pub fn is_fetching(&self, key: &ProductKey) -> bool {
    self.in_flight.contains_key(&key.cache_key())
  }

  /// Last fetch failure for `key`, if the latest attempt failed
  pub fn error(&self, key: &ProductKey) -> Option<&CatalogError> {
    self.errors.get(&key.cache_key())
  }

  /// Mark `key` for refetch on its next request, retrying a failed key
  pub fn refresh(&mut self, key: &ProductKey) {
    let cache_key = key.cache_key();
    self.errors.remove(&cache_key);
    self.cache.invalidate(&cache_key);
  }

  fn start_fetch(&mut self, key: ProductKey) {
    debug!("fetching {}", key);
    let api = Arc::clone(&self.api);
    let fetch_key = key.clone();
    let task = InFlight::spawn(async move {
      match fetch_key {
        ProductKey::List { limit, skip } => api.list(limit, skip).await.map(CatalogData::Page),
        ProductKey::Detail { id } => api
          .get(id)
          .await
          .map(|p| CatalogData::Product(Box::new(p))),
        ProductKey::Search { query } => api.search(&query).await.map(CatalogData::Page),
      }
    });
    self.in_flight.insert(key.cache_key(), (key, task));
  }

  /// Collect finished fetches into the cache.
  ///
  /// Every failure raises one error notice. Returns true when anything
  /// changed.
  pub fn poll(&mut self, notices: &mut Notifications) -> bool {
    let mut finished = Vec::new();
    for (cache_key, (_, task)) in self.in_flight.iter_mut() {
      if let Poll::Ready(result) = task.poll() {
        finished.push((cache_key.clone(), result));
      }
    }

    let changed = !finished.is_empty();
    for (cache_key, result) in finished {
      let Some((key, _)) = self.in_flight.remove(&cache_key) else {
        continue;
      };
      match result {
        Ok(data) => {
          debug!("fetched {}", key);
          self.errors.remove(&cache_key);
          self.cache.write(cache_key, data);
        }
        Err(e) => {
          warn!("failed to fetch {}: {}", key, e);
          notices.error(format!(
            "Failed to load {}: {}",
            key.description(),
            e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string())
          ));
          self.errors.insert(cache_key, e);
        }
      }
    }
    changed
  }
}
