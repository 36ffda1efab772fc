//! Parallel fetch orchestration.
//!
//! The [`Orchestrator`] dispatches every task of a batch at once, waits for all
//! of them to settle, and reports the per-task results together with an
//! aggregate view. A failing task never aborts its siblings.

use std::time::Duration;

use fidga_envelope::ApiResult;
use futures::future::BoxFuture;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::batch::{BatchResult, TaskOutcome};
use crate::events::{FetchEvent, FetchNotifier, NoopNotifier};
use crate::task::FetchTask;

/// Failure message for tasks that were still running when the batch was
/// cancelled.
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Runs batches of fetch tasks concurrently.
///
/// Generic over `N: FetchNotifier` to allow different progress reporting.
/// Use `Orchestrator::new()` for silent batches or `Orchestrator::with_notifier()`
/// to observe task events.
pub struct Orchestrator<N: FetchNotifier = NoopNotifier> {
  timeout: Option<Duration>,
  notifier: N,
}

impl Orchestrator<NoopNotifier> {
  pub fn new() -> Self {
    Self::with_notifier(NoopNotifier)
  }
}

impl Default for Orchestrator<NoopNotifier> {
  fn default() -> Self {
    Self::new()
  }
}

impl<N: FetchNotifier> Orchestrator<N> {
  pub fn with_notifier(notifier: N) -> Self {
    Self {
      timeout: None,
      notifier,
    }
  }

  /// Bound every task by `timeout`. A task that runs longer settles as a
  /// failure; its siblings are unaffected.
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  /// Run all tasks and wait for every one of them to settle.
  pub async fn fetch_all<T: Send + 'static>(&self, tasks: &[FetchTask<T>]) -> BatchResult<T> {
    self
      .fetch_all_cancellable(tasks, &CancellationToken::new())
      .await
  }

  /// Run all tasks, settling any still in flight as failures once `cancel`
  /// fires.
  #[instrument(name = "fetch_batch", skip(self, tasks, cancel), fields(tasks = tasks.len()))]
  pub async fn fetch_all_cancellable<T: Send + 'static>(
    &self,
    tasks: &[FetchTask<T>],
    cancel: &CancellationToken,
  ) -> BatchResult<T> {
    let batch_id = uuid::Uuid::new_v4().to_string();

    info!(batch_id = %batch_id, tasks = tasks.len(), "batch_started");
    self.notifier.notify(FetchEvent::BatchStarted {
      batch_id: batch_id.clone(),
      tasks: tasks.len(),
    });

    // Every task is polled from here on; none waits for a sibling to finish.
    let settling = tasks
      .iter()
      .enumerate()
      .map(|(index, task)| self.settle(&batch_id, index, task, cancel));
    let outcomes = futures::future::join_all(settling).await;

    let batch = BatchResult::new(batch_id, outcomes);

    if batch.all_failed() && !batch.is_empty() {
      warn!(batch_id = %batch.batch_id(), failed = batch.failed(), "batch_all_failed");
    } else {
      info!(
        batch_id = %batch.batch_id(),
        succeeded = batch.succeeded(),
        failed = batch.failed(),
        "batch_completed"
      );
    }

    self.notifier.notify(FetchEvent::BatchCompleted {
      batch_id: batch.batch_id().to_string(),
      succeeded: batch.succeeded(),
      failed: batch.failed(),
      all_failed: batch.all_failed(),
    });

    batch
  }

  /// Run one task to completion, timeout or cancellation.
  async fn settle<T: Send + 'static>(
    &self,
    batch_id: &str,
    index: usize,
    task: &FetchTask<T>,
    cancel: &CancellationToken,
  ) -> TaskOutcome<T> {
    self.notifier.notify(FetchEvent::TaskStarted {
      batch_id: batch_id.to_string(),
      index,
      name: task.name().to_string(),
    });

    let started = Instant::now();
    let call = task.run();

    let result = tokio::select! {
      biased;
      _ = cancel.cancelled() => ApiResult::failure(CANCELLED_MESSAGE),
      result = self.bounded(call) => result,
    };

    let elapsed = started.elapsed();
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let result = result.with_duration(elapsed).stamped();

    match result.error() {
      None => {
        debug!(batch_id = %batch_id, task = %task.name(), elapsed_ms, "task_succeeded");
        self.notifier.notify(FetchEvent::TaskSucceeded {
          batch_id: batch_id.to_string(),
          index,
          name: task.name().to_string(),
          elapsed_ms,
        });
      }
      Some(error) => {
        warn!(batch_id = %batch_id, task = %task.name(), error = %error, elapsed_ms, "task_failed");
        self.notifier.notify(FetchEvent::TaskFailed {
          batch_id: batch_id.to_string(),
          index,
          name: task.name().to_string(),
          error: error.to_string(),
          elapsed_ms,
        });
      }
    }

    TaskOutcome {
      name: task.name().to_string(),
      category: task.category().map(str::to_string),
      elapsed_ms,
      result,
    }
  }

  async fn bounded<T>(&self, call: BoxFuture<'static, ApiResult<T>>) -> ApiResult<T> {
    match self.timeout {
      Some(limit) => tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| {
          ApiResult::failure(format!("request timed out after {}ms", limit.as_millis()))
        }),
      None => call.await,
    }
  }
}
