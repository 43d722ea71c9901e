//! Product catalog: API client, cache keys, reads, mutations and search.

mod api_types;
mod client;
mod error;
mod keys;
mod mutations;
mod pagination;
mod search;
mod session;
mod store;
mod sync;
mod types;

#[cfg(test)]
pub mod testing;

pub use client::{HttpProductClient, ProductApi};
pub use error::CatalogError;
pub use keys::ProductKey;
pub use mutations::{MutationKind, MutationState};
pub use pagination::PAGE_SIZES;
pub use session::Session;
pub use types::{AvailabilityStatus, Product, ProductDraft, ProductList, ProductPatch, StockSummary};
