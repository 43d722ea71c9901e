//! Debounced search input and source selection.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::keys::ProductKey;
use super::pagination::Pagination;

/// Default quiet period before a search is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Single-slot timer: arming it again replaces whatever was pending.
#[derive(Debug)]
pub struct DebounceTimer<T> {
  slot: Option<(T, Instant)>,
}

impl<T> Default for DebounceTimer<T> {
  fn default() -> Self {
    Self { slot: None }
  }
}

impl<T> DebounceTimer<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Schedule `value` to fire after `delay`, cancelling the pending one
  pub fn arm(&mut self, value: T, delay: Duration) {
    self.slot = Some((value, Instant::now() + delay));
  }

  pub fn cancel(&mut self) {
    self.slot = None;
  }

  pub fn is_armed(&self) -> bool {
    self.slot.is_some()
  }

  /// Take the value if its deadline passed. Fires at most once per arm.
  pub fn poll_expired(&mut self) -> Option<T> {
    match &self.slot {
      Some((_, deadline)) if Instant::now() >= *deadline => self.slot.take().map(|(value, _)| value),
      _ => None,
    }
  }
}

/// Search box state: what the user typed and what has settled.
///
/// Only the settled (debounced) value picks the data source, so typing
/// `a`, `ab`, `abc` quickly sends one search for `abc`.
#[derive(Debug)]
pub struct SearchOverlay {
  input: String,
  debounced: String,
  timer: DebounceTimer<String>,
  delay: Duration,
}

impl Default for SearchOverlay {
  fn default() -> Self {
    Self::new(DEFAULT_DEBOUNCE)
  }
}

impl SearchOverlay {
  pub fn new(delay: Duration) -> Self {
    Self {
      input: String::new(),
      debounced: String::new(),
      timer: DebounceTimer::new(),
      delay,
    }
  }

  /// Raw text as typed
  pub fn input(&self) -> &str {
    &self.input
  }

  /// Last settled value
  pub fn debounced(&self) -> &str {
    &self.debounced
  }

  /// True while typed text has not settled yet
  pub fn is_settling(&self) -> bool {
    self.timer.is_armed()
  }

  pub fn set_input(&mut self, value: impl Into<String>) {
    let value = value.into();
    if value == self.input {
      return;
    }
    self.input = value.clone();
    self.timer.arm(value, self.delay);
  }

  /// Drop the query immediately; the list source comes back without waiting.
  pub fn clear(&mut self) {
    self.input.clear();
    self.debounced.clear();
    self.timer.cancel();
  }

  /// Settle the input once the quiet period has passed.
  /// Returns true when the debounced value changed.
  pub fn tick(&mut self) -> bool {
    let Some(value) = self.timer.poll_expired() else {
      return false;
    };
    if value == self.debounced {
      return false;
    }
    debug!("search settled on {:?}", value);
    self.debounced = value;
    true
  }

  /// Whether a non-blank query is driving the view
  pub fn is_searching(&self) -> bool {
    !self.debounced.trim().is_empty()
  }

  /// Key the view reads from: search results for a non-blank settled
  /// query, else the current page.
  pub fn active_source(&self, pagination: &Pagination) -> ProductKey {
    ProductKey::search(&self.debounced).unwrap_or_else(|| pagination.key())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::keys::CatalogData;
  use crate::catalog::store::CatalogStore;
  use crate::catalog::sync::CatalogCache;
  use crate::catalog::testing::FakeCatalog;
  use crate::notify::Notifications;
  use std::sync::Arc;

  const STEP: Duration = Duration::from_millis(100);

  #[tokio::test(start_paused = true)]
  async fn test_timer_fires_once() {
    let mut timer = DebounceTimer::new();
    timer.arm(1, Duration::from_millis(300));
    assert_eq!(timer.poll_expired(), None);

    tokio::time::advance(Duration::from_millis(300)).await;
    assert_eq!(timer.poll_expired(), Some(1));
    assert_eq!(timer.poll_expired(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn test_rearm_replaces_pending_value() {
    let mut timer = DebounceTimer::new();
    timer.arm("first", Duration::from_millis(300));
    tokio::time::advance(Duration::from_millis(200)).await;
    timer.arm("second", Duration::from_millis(300));

    tokio::time::advance(Duration::from_millis(200)).await;
    assert_eq!(timer.poll_expired(), None);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(timer.poll_expired(), Some("second"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_fast_typing_sends_one_search() {
    let fake = Arc::new(FakeCatalog::with_products(30));
    let mut store = CatalogStore::new(fake.clone(), CatalogCache::new());
    let mut notices = Notifications::new(Duration::from_secs(3));
    let pagination = Pagination::default();
    let mut search = SearchOverlay::default();

    for typed in ["a", "ab", "abc"] {
      search.set_input(typed);
      tokio::time::advance(STEP).await;
      assert!(!search.tick());
      store.request(&search.active_source(&pagination));
    }

    tokio::time::advance(Duration::from_millis(300)).await;
    assert!(search.tick());
    assert_eq!(search.debounced(), "abc");
    store.request(&search.active_source(&pagination));

    tokio::time::sleep(Duration::from_millis(10)).await;
    store.poll(&mut notices);

    assert_eq!(fake.searches(), vec!["abc".to_string()]);
    // While typing, the list source was the one requested
    assert_eq!(fake.calls("list"), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_blank_query_uses_list_source() {
    let mut pagination = Pagination::new(20);
    pagination.next_page();
    let mut search = SearchOverlay::default();

    search.set_input("   ");
    tokio::time::advance(Duration::from_millis(300)).await;
    search.tick();

    assert!(!search.is_searching());
    assert_eq!(search.active_source(&pagination), ProductKey::list(20, 20));
  }

  #[tokio::test(start_paused = true)]
  async fn test_switching_sources_keeps_both_entries() {
    let fake = Arc::new(FakeCatalog::with_products(30));
    let mut store = CatalogStore::new(fake.clone(), CatalogCache::new());
    let mut notices = Notifications::new(Duration::from_secs(3));
    let pagination = Pagination::default();
    let mut search = SearchOverlay::default();

    store.request(&search.active_source(&pagination));
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.poll(&mut notices);

    search.set_input("Product 2");
    tokio::time::advance(Duration::from_millis(300)).await;
    search.tick();
    let search_key = search.active_source(&pagination);
    store.request(&search_key);
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.poll(&mut notices);

    search.clear();
    let list_key = search.active_source(&pagination);
    assert_eq!(list_key, pagination.key());

    // Both sources still cached, the list without a refetch
    assert!(!store.request(&list_key).needs_fetch());
    let results = store.peek(&search_key).value().and_then(CatalogData::as_page).unwrap();
    assert!(results.contains(2));
    assert_eq!(fake.calls("list"), 1);
  }
}
