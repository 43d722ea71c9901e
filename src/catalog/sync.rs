//! Cache reconciliation after confirmed mutations.
//!
//! Every function here runs strictly after the server confirmed the
//! mutation, and only touches what it is told to: per-id entries and list
//! entries are independent keys, so each patch spells out both.

use tracing::debug;

use crate::cache::{CacheLookup, Patch, QueryCache};

use super::keys::{CatalogData, ProductKey, LIST_FAMILY, SEARCH_FAMILY};
use super::types::{DeleteOutcome, Product};

pub type CatalogCache = QueryCache<CatalogData>;

/// A product was created.
///
/// Prepends it to the page the user is looking at and bumps that page's
/// total, then marks every list page for refetch so the server's real
/// ordering wins on the next read.
pub fn apply_created(cache: &mut CatalogCache, current_page: &ProductKey, product: &Product) {
  cache.patch(&current_page.cache_key(), |lookup| match lookup {
    // Nothing cached for this page: the next read fetches it from the server
    CacheLookup::Miss => Patch::Keep,
    CacheLookup::Hit { value, .. } => {
      if let Some(list) = value.as_page_mut() {
        list.products.insert(0, product.clone());
        list.total += 1;
      }
      Patch::Keep
    }
  });

  let marked = cache.invalidate(LIST_FAMILY);
  debug!("created product {}, {} list pages marked stale", product.id, marked);
}

/// A product was updated.
///
/// Overwrites its per-id entry and replaces it inside every cached list
/// page and search result that contains it. Totals and ordering are left
/// alone.
pub fn apply_updated(cache: &mut CatalogCache, product: &Product) {
  cache.write(
    ProductKey::detail(product.id).cache_key(),
    CatalogData::Product(Box::new(product.clone())),
  );

  let mut rewritten = 0;
  for key in collection_keys(cache) {
    cache.patch(&key, |lookup| {
      if let CacheLookup::Hit { value, .. } = lookup {
        if let Some(list) = value.as_page_mut() {
          if let Some(index) = list.position(product.id) {
            list.products[index] = product.clone();
            rewritten += 1;
          }
        }
      }
      Patch::Keep
    });
  }
  debug!("updated product {} in {} cached pages", product.id, rewritten);
}

/// A delete call returned.
///
/// Drops the per-id entry and removes the product from every cached page.
/// When the server actually deleted it, each list page's total (the
/// collection size) shrinks by one, and search results that contained it
/// shrink too. When it was already gone, totals are left for the refetch
/// of the now-invalidated list pages to correct.
pub fn apply_deleted(cache: &mut CatalogCache, outcome: DeleteOutcome) {
  let id = outcome.id;
  cache.remove(&ProductKey::detail(id).cache_key());

  for key in collection_keys(cache) {
    let is_list_page = key.starts_with(LIST_FAMILY);
    cache.patch(&key, |lookup| {
      let CacheLookup::Hit { value, .. } = lookup else {
        return Patch::Keep;
      };
      let Some(list) = value.as_page_mut() else {
        return Patch::Keep;
      };

      let removed = match list.position(id) {
        Some(index) => {
          list.products.remove(index);
          true
        }
        None => false,
      };
      if outcome.was_deleted && (is_list_page || removed) {
        list.total = list.total.saturating_sub(1);
      }
      Patch::Keep
    });
  }

  if !outcome.was_deleted {
    cache.invalidate(LIST_FAMILY);
  }
}

/// Keys of every cached list page and search result
fn collection_keys(cache: &CatalogCache) -> Vec<String> {
  let mut keys = cache.keys_with_prefix(LIST_FAMILY);
  keys.extend(cache.keys_with_prefix(SEARCH_FAMILY));
  keys
}
