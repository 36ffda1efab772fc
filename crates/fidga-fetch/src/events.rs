//! Fetch events and notifiers for observability.
//!
//! Events are emitted while a batch runs so consumers can show per-task
//! progress (a "running" indicator, a live log) without waiting for the
//! whole batch.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during batch execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FetchEvent {
  /// A batch has started; every task is about to be dispatched.
  BatchStarted { batch_id: String, tasks: usize },

  /// A task has been dispatched.
  TaskStarted {
    batch_id: String,
    index: usize,
    name: String,
  },

  /// A task settled successfully.
  TaskSucceeded {
    batch_id: String,
    index: usize,
    name: String,
    elapsed_ms: u64,
  },

  /// A task settled as a failure.
  TaskFailed {
    batch_id: String,
    index: usize,
    name: String,
    error: String,
    elapsed_ms: u64,
  },

  /// Every task in the batch has settled.
  BatchCompleted {
    batch_id: String,
    succeeded: usize,
    failed: usize,
    all_failed: bool,
  },
}

/// Receives fetch events.
///
/// The orchestrator calls `notify` for each event; implementations decide what
/// to do with them.
pub trait FetchNotifier: Send + Sync {
  fn notify(&self, event: FetchEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl FetchNotifier for NoopNotifier {
  fn notify(&self, _event: FetchEvent) {}
}

/// Sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never holds up a batch; volume is a handful of
/// events per task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<FetchEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<FetchEvent>) -> Self {
    Self { sender }
  }
}

impl FetchNotifier for ChannelNotifier {
  fn notify(&self, event: FetchEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

impl<N: FetchNotifier + ?Sized> FetchNotifier for std::sync::Arc<N> {
  fn notify(&self, event: FetchEvent) {
    (**self).notify(event);
  }
}
