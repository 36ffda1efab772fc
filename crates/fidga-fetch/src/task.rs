//! Named fetch tasks.

use std::fmt;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use fidga_envelope::{ApiResult, Payload};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::safe_call::safe_call;

type RunFn<T> = dyn Fn() -> BoxFuture<'static, ApiResult<T>> + Send + Sync;

/// A named, zero-argument data fetch.
///
/// The wrapped function is already routed through [`safe_call`], so running a
/// task always yields an [`ApiResult`]. Tasks are cheap to clone and can be run
/// any number of times; each run issues a fresh call.
pub struct FetchTask<T> {
  name: String,
  category: Option<String>,
  run: Arc<RunFn<T>>,
}

impl<T: Send + 'static> FetchTask<T> {
  /// Create a task from a fetch function.
  ///
  /// The function may resolve to a bare value or to an envelope; see
  /// [`safe_call`] for how each outcome is normalized.
  pub fn new<F, Fut, R, E>(name: impl Into<String>, call: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Into<Payload<T>> + Send + 'static,
    E: Display + Send + 'static,
  {
    let call = Arc::new(call);
    let run = move || -> BoxFuture<'static, ApiResult<T>> {
      let call = Arc::clone(&call);
      safe_call(move || (*call)()).boxed()
    };

    Self {
      name: name.into(),
      category: None,
      run: Arc::new(run),
    }
  }
}

impl<T> FetchTask<T> {
  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn category(&self) -> Option<&str> {
    self.category.as_deref()
  }

  /// Start one invocation of the task.
  pub fn run(&self) -> BoxFuture<'static, ApiResult<T>> {
    (self.run)()
  }
}

impl<T> Clone for FetchTask<T> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      category: self.category.clone(),
      run: Arc::clone(&self.run),
    }
  }
}

impl<T> fmt::Debug for FetchTask<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FetchTask")
      .field("name", &self.name)
      .field("category", &self.category)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use serde_json::{Value, json};

  use super::*;

  #[tokio::test]
  async fn test_each_run_issues_a_fresh_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let task: FetchTask<Value> = FetchTask::new("counter", move || {
      let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
      async move { Ok::<_, String>(json!({ "call": n })) }
    });

    let first = task.run().await;
    let second = task.clone().run().await;

    assert_eq!(first.data(), Some(&json!({ "call": 1 })));
    assert_eq!(second.data(), Some(&json!({ "call": 2 })));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_category_and_debug() {
    let task: FetchTask<Value> =
      FetchTask::new("GA Traffic", || async { Ok::<_, String>(Value::Null) })
        .with_category("Analytics");

    assert_eq!(task.name(), "GA Traffic");
    assert_eq!(task.category(), Some("Analytics"));
    assert!(format!("{:?}", task).contains("GA Traffic"));
  }
}
