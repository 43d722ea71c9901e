//! In-memory key-addressed query cache.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use super::entry::{CacheEntry, CacheLookup, Patch};

/// Default window after which cached data is considered stale
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Store of fetched results keyed by operation + parameters.
///
/// Keys are plain strings so that whole families ("list:...") can be
/// invalidated by prefix. The cache never infers relations between keys:
/// keeping a per-id entry and a list entry in agreement is the caller's job.
#[derive(Debug)]
pub struct QueryCache<V> {
  entries: HashMap<String, CacheEntry<V>>,
  stale_time: Duration,
}

impl<V> Default for QueryCache<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> QueryCache<V> {
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
      stale_time: DEFAULT_STALE_TIME,
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn stale_time(&self) -> Duration {
    self.stale_time
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Look up a key. Never blocks and never fetches.
  pub fn read(&self, key: &str) -> CacheLookup<&V> {
    match self.entries.get(key) {
      Some(entry) => CacheLookup::Hit {
        value: &entry.value,
        is_stale: entry.is_stale(self.stale_time),
      },
      None => CacheLookup::Miss,
    }
  }

  /// Store a freshly fetched value, resetting its timestamp.
  pub fn write(&mut self, key: impl Into<String>, value: V) {
    let key = key.into();
    trace!("cache write {}", key);
    self.entries.insert(key, CacheEntry::new(value));
  }

  /// Mark every entry whose key starts with `prefix` as needing a refetch.
  ///
  /// Returns how many entries were marked.
  pub fn invalidate(&mut self, prefix: &str) -> usize {
    let mut count = 0;
    for (key, entry) in self.entries.iter_mut() {
      if key.starts_with(prefix) {
        entry.invalidated = true;
        count += 1;
      }
    }
    trace!("cache invalidate {}* ({} entries)", prefix, count);
    count
  }

  /// Drop an entry entirely.
  pub fn remove(&mut self, key: &str) -> Option<V> {
    self.entries.remove(key).map(|entry| entry.value)
  }

  /// Keys currently cached under `prefix`, sorted for stable iteration.
  pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
    let mut keys: Vec<String> = self
      .entries
      .keys()
      .filter(|key| key.starts_with(prefix))
      .cloned()
      .collect();
    keys.sort();
    keys
  }

  /// Apply `f` to whatever is cached under `key`.
  ///
  /// `f` sees either a miss or the live value (with its staleness) and
  /// decides the outcome, so a patch always states what happens on a miss.
  /// Patching does not count as a fetch: a hit keeps its timestamp and
  /// invalidation flag.
  pub fn patch<F>(&mut self, key: &str, f: F)
  where
    F: FnOnce(CacheLookup<&mut V>) -> Patch<V>,
  {
    let stale_time = self.stale_time;
    let outcome = match self.entries.get_mut(key) {
      Some(entry) => {
        let is_stale = entry.is_stale(stale_time);
        f(CacheLookup::Hit {
          value: &mut entry.value,
          is_stale,
        })
      }
      None => f(CacheLookup::Miss),
    };

    match outcome {
      Patch::Keep => {}
      Patch::Insert(value) => match self.entries.get_mut(key) {
        Some(entry) => entry.value = value,
        None => {
          self.entries.insert(key.to_string(), CacheEntry::new(value));
        }
      },
      Patch::Remove => {
        self.entries.remove(key);
      }
    }
  }

  /// When the entry was last fetched, if present
  pub fn fetched_at(&self, key: &str) -> Option<Instant> {
    self.entries.get(key).map(|entry| entry.fetched_at)
  }
}
