//! Background remote calls polled from the UI loop.
//!
//! An `InFlight<T>` spawns a future on the tokio runtime and hands its
//! result back through a channel. The owner polls it on each tick, so
//! whatever the result touches (the cache, mutation state) is only ever
//! mutated from the control thread.
//!
//! # Example
//!
//! ```ignore
//! let api = api.clone();
//! let mut task = InFlight::spawn(async move { api.list(10, 0).await });
//!
//! // In event loop tick
//! if let Some(result) = task.poll() {
//!     // Apply the result
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

use crate::catalog::CatalogError;

/// Outcome of polling an in-flight task
#[derive(Debug)]
pub enum Poll<T> {
  /// Still running
  Pending,
  /// Finished with this result
  Ready(Result<T, CatalogError>),
}

/// A spawned remote call whose result has not been collected yet.
pub struct InFlight<T> {
  receiver: mpsc::UnboundedReceiver<Result<T, CatalogError>>,
}

impl<T: Send + 'static> InFlight<T> {
  /// Spawn `future` on the runtime.
  pub fn spawn<F>(future: F) -> Self
  where
    F: Future<Output = Result<T, CatalogError>> + Send + 'static,
  {
    Self::spawn_boxed(Box::pin(future))
  }

  fn spawn_boxed(future: BoxFuture<'static, Result<T, CatalogError>>) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
    Self { receiver: rx }
  }

  /// Check for a result without blocking.
  pub fn poll(&mut self) -> Poll<T> {
    match self.receiver.try_recv() {
      Ok(result) => Poll::Ready(result),
      Err(mpsc::error::TryRecvError::Empty) => Poll::Pending,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task panicked or was dropped before sending
        Poll::Ready(Err(CatalogError::transport("request was cancelled")))
      }
    }
  }
}

impl<T> std::fmt::Debug for InFlight<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("InFlight").finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_task_success() {
    let mut task = InFlight::spawn(async { Ok::<_, CatalogError>(vec![1, 2, 3]) });

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    match task.poll() {
      Poll::Ready(Ok(data)) => assert_eq!(data, vec![1, 2, 3]),
      other => panic!("unexpected poll result: {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_task_error() {
    let mut task: InFlight<u32> =
      InFlight::spawn(async { Err(CatalogError::validation("bad payload")) });

    tokio::time::sleep(Duration::from_millis(10)).await;

    match task.poll() {
      Poll::Ready(Err(e)) => assert_eq!(e, CatalogError::validation("bad payload")),
      other => panic!("unexpected poll result: {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_pending_until_done() {
    let mut task = InFlight::spawn(async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, CatalogError>(42)
    });

    assert!(matches!(task.poll(), Poll::Pending));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(matches!(task.poll(), Poll::Ready(Ok(42))));
  }

  #[tokio::test]
  async fn test_panicked_task_reports_cancelled() {
    let mut task: InFlight<u32> = InFlight::spawn(async {
      let fail = true;
      if fail {
        panic!("boom");
      }
      Ok::<_, CatalogError>(0)
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(
      task.poll(),
      Poll::Ready(Err(CatalogError::Transport { .. }))
    ));
  }
}
