//! Batch result types.

use std::time::Duration;

use fidga_envelope::ApiResult;
use serde::Serialize;

/// How one task of a batch settled.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome<T> {
  /// Task name.
  pub name: String,
  /// Task category, if any.
  pub category: Option<String>,
  /// Wall time from dispatch to settle.
  pub elapsed_ms: u64,
  /// The normalized result.
  pub result: ApiResult<T>,
}

impl<T> TaskOutcome<T> {
  pub fn elapsed(&self) -> Duration {
    Duration::from_millis(self.elapsed_ms)
  }

  pub fn is_success(&self) -> bool {
    self.result.is_success()
  }
}

/// Result of running a batch of fetch tasks.
///
/// Outcomes are aligned positionally with the tasks that were submitted,
/// whatever order they completed in.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult<T> {
  batch_id: String,
  outcomes: Vec<TaskOutcome<T>>,
}

impl<T> BatchResult<T> {
  pub(crate) fn new(batch_id: String, outcomes: Vec<TaskOutcome<T>>) -> Self {
    Self { batch_id, outcomes }
  }

  pub fn batch_id(&self) -> &str {
    &self.batch_id
  }

  pub fn len(&self) -> usize {
    self.outcomes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outcomes.is_empty()
  }

  pub fn outcomes(&self) -> &[TaskOutcome<T>] {
    &self.outcomes
  }

  /// Results in submission order.
  pub fn results(&self) -> impl Iterator<Item = &ApiResult<T>> {
    self.outcomes.iter().map(|o| &o.result)
  }

  pub fn get(&self, index: usize) -> Option<&TaskOutcome<T>> {
    self.outcomes.get(index)
  }

  /// First outcome of the task with the given name.
  pub fn find(&self, name: &str) -> Option<&TaskOutcome<T>> {
    self.outcomes.iter().find(|o| o.name == name)
  }

  pub fn succeeded(&self) -> usize {
    self.outcomes.iter().filter(|o| o.is_success()).count()
  }

  pub fn failed(&self) -> usize {
    self.outcomes.len() - self.succeeded()
  }

  /// True iff no task succeeded. Callers use this to choose between a blanket
  /// error and rendering whatever partial data arrived. An empty batch has no
  /// successes, so it reports true.
  pub fn all_failed(&self) -> bool {
    self.outcomes.iter().all(|o| !o.is_success())
  }

  pub fn any_succeeded(&self) -> bool {
    !self.all_failed()
  }

  pub fn into_results(self) -> Vec<ApiResult<T>> {
    self.outcomes.into_iter().map(|o| o.result).collect()
  }
}
