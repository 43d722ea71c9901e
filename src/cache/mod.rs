//! Generic in-memory query cache.
//!
//! This module provides a domain-agnostic cache that:
//! - Stores fetched values under string keys (operation + parameters)
//! - Serves stale values immediately and flags them (stale-while-revalidate)
//! - Invalidates whole key families by prefix
//! - Exposes total patch functions over `Miss | Hit { value, is_stale }`

mod entry;
mod store;

pub use entry::{CacheLookup, Patch};
pub use store::{QueryCache, DEFAULT_STALE_TIME};
