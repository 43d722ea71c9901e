//! Core types for the caching system.

use std::time::Duration;
use tokio::time::Instant;

/// Result of looking up a key in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup<T> {
  /// Nothing cached for this key
  Miss,
  /// A cached value. Stale values are still served; the caller decides
  /// whether to refetch in the background.
  Hit { value: T, is_stale: bool },
}

impl<T> CacheLookup<T> {
  pub fn value(self) -> Option<T> {
    match self {
      CacheLookup::Miss => None,
      CacheLookup::Hit { value, .. } => Some(value),
    }
  }

  pub fn is_miss(&self) -> bool {
    matches!(self, CacheLookup::Miss)
  }

  pub fn is_stale(&self) -> bool {
    matches!(self, CacheLookup::Hit { is_stale: true, .. })
  }

  /// Whether a background fetch is warranted (absent or stale)
  pub fn needs_fetch(&self) -> bool {
    match self {
      CacheLookup::Miss => true,
      CacheLookup::Hit { is_stale, .. } => *is_stale,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheLookup<U> {
    match self {
      CacheLookup::Miss => CacheLookup::Miss,
      CacheLookup::Hit { value, is_stale } => CacheLookup::Hit {
        value: f(value),
        is_stale,
      },
    }
  }

  /// Keep a hit only if `f` returns something for its value
  pub fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> CacheLookup<U> {
    match self {
      CacheLookup::Miss => CacheLookup::Miss,
      CacheLookup::Hit { value, is_stale } => match f(value) {
        Some(value) => CacheLookup::Hit { value, is_stale },
        None => CacheLookup::Miss,
      },
    }
  }
}

/// What a patch function decided to do with an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<V> {
  /// Leave the entry as it is (including any in-place edits made on a hit)
  Keep,
  /// Store this value: fills a miss, or replaces a hit's value while
  /// keeping its fetch timestamp
  Insert(V),
  /// Drop the entry
  Remove,
}

/// A single cached value with its fetch metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
  pub value: V,
  /// When the value was last fetched from the server
  pub fetched_at: Instant,
  /// Explicitly marked for refetch by an invalidation
  pub invalidated: bool,
}

impl<V> CacheEntry<V> {
  pub fn new(value: V) -> Self {
    Self {
      value,
      fetched_at: Instant::now(),
      invalidated: false,
    }
  }

  pub fn is_stale(&self, stale_time: Duration) -> bool {
    self.invalidated || self.fetched_at.elapsed() > stale_time
  }
}
