//! User-visible notices raised by mutations and failed loads.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Success,
  Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
  pub level: NoticeLevel,
  pub message: String,
  pub raised_at: Instant,
}

/// Queue of notices, each shown for `ttl` once it reaches the front.
#[derive(Debug)]
pub struct Notifications {
  queue: VecDeque<Notice>,
  ttl: Duration,
  /// When the front notice started being displayed
  shown_since: Option<Instant>,
}

impl Notifications {
  pub fn new(ttl: Duration) -> Self {
    Self {
      queue: VecDeque::new(),
      ttl,
      shown_since: None,
    }
  }

  pub fn success(&mut self, message: impl Into<String>) {
    let message = message.into();
    info!("{}", message);
    self.push(NoticeLevel::Success, message);
  }

  pub fn error(&mut self, message: impl Into<String>) {
    let message = message.into();
    warn!("{}", message);
    self.push(NoticeLevel::Error, message);
  }

  fn push(&mut self, level: NoticeLevel, message: String) {
    let now = Instant::now();
    if self.queue.is_empty() {
      self.shown_since = Some(now);
    }
    self.queue.push_back(Notice {
      level,
      message,
      raised_at: now,
    });
  }

  /// Notice to display right now
  pub fn current(&self) -> Option<&Notice> {
    self.queue.front()
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  /// Drop the front notice once it has been displayed for `ttl`.
  pub fn expire(&mut self) {
    let Some(since) = self.shown_since else {
      return;
    };
    if since.elapsed() < self.ttl {
      return;
    }

    self.queue.pop_front();
    self.shown_since = if self.queue.is_empty() {
      None
    } else {
      Some(Instant::now())
    };
  }

  /// Dismiss the front notice immediately
  pub fn dismiss(&mut self) {
    self.queue.pop_front();
    self.shown_since = (!self.queue.is_empty()).then(Instant::now);
  }

  /// Messages currently queued (oldest first)
  pub fn messages(&self) -> impl Iterator<Item = &str> {
    self.queue.iter().map(|n| n.message.as_str())
  }
}
