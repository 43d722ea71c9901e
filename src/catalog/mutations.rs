//! Create/update/delete with post-confirmation cache patches.

use std::sync::Arc;
use tracing::{info, warn};

use crate::notify::Notifications;
use crate::task::{InFlight, Poll};

use super::client::ProductApi;
use super::error::CatalogError;
use super::keys::ProductKey;
use super::sync::{self, CatalogCache};
use super::types::{DeleteOutcome, Product, ProductDraft, ProductPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
  Create,
  Update,
  Delete,
}

impl MutationKind {
  fn success_message(&self) -> &'static str {
    match self {
      Self::Create => "Product added successfully!",
      Self::Update => "Product updated successfully!",
      Self::Delete => "Product deleted successfully!",
    }
  }

  fn failure_message(&self) -> &'static str {
    match self {
      Self::Create => "Failed to add product",
      Self::Update => "Failed to update product",
      Self::Delete => "Failed to delete product",
    }
  }
}

/// Lifecycle of one mutation call site
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
  Idle,
  Pending,
  Success(T),
  Failed(CatalogError),
}

impl<T> MutationState<T> {
  pub fn is_pending(&self) -> bool {
    matches!(self, Self::Pending)
  }
}

/// One mutation slot: its state and the remote call behind it.
struct Mutation<T> {
  state: MutationState<T>,
  task: Option<InFlight<T>>,
}

impl<T: Send + 'static> Mutation<T> {
  fn new() -> Self {
    Self {
      state: MutationState::Idle,
      task: None,
    }
  }

  fn start<F>(&mut self, future: F)
  where
    F: std::future::Future<Output = Result<T, CatalogError>> + Send + 'static,
  {
    self.task = Some(InFlight::spawn(future));
    self.state = MutationState::Pending;
  }

  /// Take the result of the pending call, if it finished
  fn take_result(&mut self) -> Option<Result<T, CatalogError>> {
    let task = self.task.as_mut()?;
    match task.poll() {
      Poll::Pending => None,
      Poll::Ready(result) => {
        self.task = None;
        Some(result)
      }
    }
  }
}

/// Runs mutations and keeps the cache consistent once they succeed.
///
/// Each kind has a single slot: starting a mutation while one of the same
/// kind is pending is refused. Cache patches happen in `poll`, strictly
/// after the server answered, and failed mutations never touch the cache.
pub struct MutationCoordinator {
  api: Arc<dyn ProductApi>,
  create: Mutation<Product>,
  update: Mutation<Product>,
  delete: Mutation<DeleteOutcome>,
}

impl MutationCoordinator {
  pub fn new(api: Arc<dyn ProductApi>) -> Self {
    Self {
      api,
      create: Mutation::new(),
      update: Mutation::new(),
      delete: Mutation::new(),
    }
  }

  pub fn create_state(&self) -> &MutationState<Product> {
    &self.create.state
  }

  pub fn update_state(&self) -> &MutationState<Product> {
    &self.update.state
  }

  pub fn delete_state(&self) -> &MutationState<DeleteOutcome> {
    &self.delete.state
  }

  pub fn is_pending(&self, kind: MutationKind) -> bool {
    match kind {
      MutationKind::Create => self.create.state.is_pending(),
      MutationKind::Update => self.update.state.is_pending(),
      MutationKind::Delete => self.delete.state.is_pending(),
    }
  }

  /// Start creating a product. Returns false if a create is already pending.
  pub fn create(&mut self, draft: ProductDraft) -> bool {
    if self.refuse(MutationKind::Create) {
      return false;
    }
    info!("creating product {:?}", draft.title);
    let api = Arc::clone(&self.api);
    self
      .create
      .start(async move { api.create(&draft).await });
    true
  }

  /// Start a partial update. Returns false if an update is already pending.
  pub fn update(&mut self, id: u64, patch: ProductPatch) -> bool {
    if self.refuse(MutationKind::Update) {
      return false;
    }
    info!("updating product {}", id);
    let api = Arc::clone(&self.api);
    self
      .update
      .start(async move { api.update(id, &patch).await });
    true
  }

  /// Start a delete. Returns false if a delete is already pending.
  pub fn delete(&mut self, id: u64) -> bool {
    if self.refuse(MutationKind::Delete) {
      return false;
    }
    info!("deleting product {}", id);
    let api = Arc::clone(&self.api);
    self.delete.start(async move { api.delete(id).await });
    true
  }

  fn refuse(&self, kind: MutationKind) -> bool {
    let pending = self.is_pending(kind);
    if pending {
      warn!("{:?} already pending, ignoring new request", kind);
    }
    pending
  }

  /// Settle finished mutations: patch the cache on success, raise exactly
  /// one notice per outcome. `current_page` is the list page the user is
  /// on now. Returns true when any mutation finished.
  pub fn poll(
    &mut self,
    cache: &mut CatalogCache,
    current_page: &ProductKey,
    notices: &mut Notifications,
  ) -> bool {
    let mut settled = false;

    if let Some(result) = self.create.take_result() {
      settled = true;
      self.create.state = match result {
        Ok(product) => {
          sync::apply_created(cache, current_page, &product);
          notices.success(MutationKind::Create.success_message());
          MutationState::Success(product)
        }
        Err(e) => fail(MutationKind::Create, e, notices),
      };
    }

    if let Some(result) = self.update.take_result() {
      settled = true;
      self.update.state = match result {
        Ok(product) => {
          sync::apply_updated(cache, &product);
          notices.success(MutationKind::Update.success_message());
          MutationState::Success(product)
        }
        Err(e) => fail(MutationKind::Update, e, notices),
      };
    }

    if let Some(result) = self.delete.take_result() {
      settled = true;
      self.delete.state = match result {
        Ok(outcome) => {
          sync::apply_deleted(cache, outcome);
          if outcome.was_deleted {
            notices.success(MutationKind::Delete.success_message());
          } else {
            notices.success(format!("Product {} was already deleted", outcome.id));
          }
          MutationState::Success(outcome)
        }
        Err(e) => fail(MutationKind::Delete, e, notices),
      };
    }

    settled
  }
}

fn fail<T>(kind: MutationKind, error: CatalogError, notices: &mut Notifications) -> MutationState<T> {
  warn!("{:?} failed: {}", kind, error);
  let message = error
    .server_message()
    .map(str::to_string)
    .unwrap_or_else(|| kind.failure_message().to_string());
  notices.error(message);
  MutationState::Failed(error)
}
