//! Everything a view needs, passed around explicitly.

use std::sync::Arc;

use crate::cache::CacheLookup;
use crate::config::Config;
use crate::notify::Notifications;

use super::client::ProductApi;
use super::keys::ProductKey;
use super::mutations::MutationCoordinator;
use super::pagination::Pagination;
use super::search::SearchOverlay;
use super::store::CatalogStore;
use super::sync::CatalogCache;
use super::types::ProductList;

/// Session context: the store, the mutation coordinator, the pagination
/// position, the search box and the notification queue.
pub struct Session {
  pub store: CatalogStore,
  pub mutations: MutationCoordinator,
  pub pagination: Pagination,
  pub search: SearchOverlay,
  pub notices: Notifications,
}

impl Session {
  pub fn new(api: Arc<dyn ProductApi>, config: &Config) -> Self {
    let cache = CatalogCache::new().with_stale_time(config.stale_time());
    Self {
      store: CatalogStore::new(Arc::clone(&api), cache),
      mutations: MutationCoordinator::new(api),
      pagination: Pagination::new(config.pagination.page_size),
      search: SearchOverlay::new(config.debounce()),
      notices: Notifications::new(config.notice_ttl()),
    }
  }

  /// Source the product list reads from right now
  pub fn active_source(&self) -> ProductKey {
    self.search.active_source(&self.pagination)
  }

  /// Read the active source, fetching in the background if needed
  pub fn request_active(&mut self) -> CacheLookup<&ProductList> {
    let key = self.active_source();
    self.store.request(&key).and_then(|data| data.as_page())
  }

  /// Mark the active source for refetch
  pub fn refresh_active(&mut self) {
    let key = self.active_source();
    self.store.refresh(&key);
  }

  /// Collect finished work. Called on every UI tick; returns true when
  /// something changed and the screen should be redrawn.
  pub fn tick(&mut self) -> bool {
    let settled = self.search.tick();
    let fetched = self.store.poll(&mut self.notices);
    let current_page = self.pagination.key();
    let mutated = self
      .mutations
      .poll(self.store.cache_mut(), &current_page, &mut self.notices);
    self.notices.expire();
    settled || fetched || mutated
  }
}
