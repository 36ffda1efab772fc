use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fidga_envelope::ApiResult;
use fidga_fetch::{CANCELLED_MESSAGE, ChannelNotifier, FetchEvent, FetchTask, Orchestrator};
use serde_json::{Value, json};
use tokio::sync::{Barrier, mpsc};
use tokio_util::sync::CancellationToken;

fn ok_task(name: &str, data: Value) -> FetchTask<Value> {
  FetchTask::new(name, move || {
    let data = data.clone();
    async move { Ok::<_, String>(data) }
  })
}

fn failing_task(name: &str, error: &str) -> FetchTask<Value> {
  let error = error.to_string();
  FetchTask::new(name, move || {
    let error = error.clone();
    async move { Err::<Value, _>(error) }
  })
}

#[tokio::test]
async fn test_one_failure_does_not_affect_siblings() {
  let tasks = vec![
    ok_task("sales", json!({ "total": 1 })),
    ok_task("traffic", json!({ "users": 2 })),
    failing_task("market", "HTTP 500: Internal Server Error"),
    ok_task("campaigns", json!([])),
  ];

  let batch = Orchestrator::new().fetch_all(&tasks).await;

  assert_eq!(batch.len(), 4);
  assert!(!batch.all_failed());
  assert_eq!(batch.succeeded(), 3);
  assert_eq!(batch.failed(), 1);

  let names: Vec<&str> = batch.outcomes().iter().map(|o| o.name.as_str()).collect();
  assert_eq!(names, vec!["sales", "traffic", "market", "campaigns"]);

  let results: Vec<&ApiResult<Value>> = batch.results().collect();
  assert_eq!(results[0].data(), Some(&json!({ "total": 1 })));
  assert_eq!(results[1].data(), Some(&json!({ "users": 2 })));
  assert_eq!(results[2].error(), Some("HTTP 500: Internal Server Error"));
  assert_eq!(results[3].data(), Some(&json!([])));
}

#[tokio::test]
async fn test_all_failed_when_every_task_fails() {
  let tasks = vec![
    failing_task("traffic", "Failed to fetch"),
    failing_task("audience", "Failed to fetch"),
    failing_task("campaigns", "Failed to fetch"),
  ];

  let batch = Orchestrator::new().fetch_all(&tasks).await;

  assert!(batch.all_failed());
  assert_eq!(batch.failed(), 3);
  for result in batch.results() {
    assert_eq!(result.error(), Some("Failed to fetch"));
  }
}

#[tokio::test]
async fn test_tasks_are_in_flight_at_the_same_time() {
  // Each task waits for the other; a sequential runner would never finish.
  let barrier = Arc::new(Barrier::new(2));

  let tasks: Vec<FetchTask<Value>> = (0..2)
    .map(|i| {
      let barrier = Arc::clone(&barrier);
      FetchTask::new(format!("task-{i}"), move || {
        let barrier = Arc::clone(&barrier);
        async move {
          barrier.wait().await;
          Ok::<_, String>(json!(i))
        }
      })
    })
    .collect();

  let batch = tokio::time::timeout(
    Duration::from_secs(5),
    Orchestrator::new().fetch_all(&tasks),
  )
  .await
  .expect("tasks should run concurrently");

  assert_eq!(batch.succeeded(), 2);
  assert_eq!(batch.get(0).and_then(|o| o.result.data()), Some(&json!(0)));
  assert_eq!(batch.get(1).and_then(|o| o.result.data()), Some(&json!(1)));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_settles_only_the_slow_task() {
  let tasks: Vec<FetchTask<Value>> = vec![
    FetchTask::new("stuck", || async {
      futures::future::pending::<Result<Value, String>>().await
    }),
    ok_task("fast", json!({ "ok": true })),
  ];

  let orchestrator = Orchestrator::new().with_timeout(Some(Duration::from_millis(50)));
  let batch = orchestrator.fetch_all(&tasks).await;

  assert_eq!(
    batch.find("stuck").and_then(|o| o.result.error()),
    Some("request timed out after 50ms")
  );
  assert_eq!(
    batch.find("fast").and_then(|o| o.result.data()),
    Some(&json!({ "ok": true }))
  );
  assert!(!batch.all_failed());
}

#[tokio::test(start_paused = true)]
async fn test_results_carry_duration_and_timestamp() {
  let tasks: Vec<FetchTask<Value>> = vec![
    FetchTask::new("slow", || async {
      tokio::time::sleep(Duration::from_millis(30)).await;
      Ok::<_, String>(json!({ "ok": true }))
    }),
    failing_task("down", "HTTP 502: Bad Gateway"),
  ];

  let batch = Orchestrator::new().fetch_all(&tasks).await;

  let slow = batch.find("slow").map(|o| &o.result);
  assert!(slow.and_then(ApiResult::duration) >= Some(Duration::from_millis(30)));
  assert!(slow.and_then(ApiResult::timestamp).is_some());

  let down = batch.find("down").map(|o| &o.result);
  assert!(down.and_then(ApiResult::duration).is_some());
  assert!(down.and_then(ApiResult::timestamp).is_some());
  assert_eq!(down.and_then(|r| r.error()), Some("HTTP 502: Bad Gateway"));
}

#[tokio::test]
async fn test_cancelled_batch_settles_every_task() {
  let tasks: Vec<FetchTask<Value>> = vec![
    FetchTask::new("stuck", || async {
      futures::future::pending::<Result<Value, String>>().await
    }),
    FetchTask::new("also-stuck", || async {
      futures::future::pending::<Result<Value, String>>().await
    }),
  ];

  let cancel = CancellationToken::new();
  cancel.cancel();

  let batch = Orchestrator::new()
    .fetch_all_cancellable(&tasks, &cancel)
    .await;

  assert!(batch.all_failed());
  for result in batch.results() {
    assert_eq!(result.error(), Some(CANCELLED_MESSAGE));
  }
}

#[tokio::test]
async fn test_notifier_reports_batch_lifecycle() {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let orchestrator = Orchestrator::with_notifier(ChannelNotifier::new(tx));

  let tasks = vec![
    ok_task("sales", json!(1)),
    failing_task("traffic", "down"),
  ];
  let batch = orchestrator.fetch_all(&tasks).await;

  let mut events = Vec::new();
  while let Ok(event) = rx.try_recv() {
    events.push(event);
  }

  assert_eq!(
    events.first(),
    Some(&FetchEvent::BatchStarted {
      batch_id: batch.batch_id().to_string(),
      tasks: 2,
    })
  );
  assert_eq!(
    events.last(),
    Some(&FetchEvent::BatchCompleted {
      batch_id: batch.batch_id().to_string(),
      succeeded: 1,
      failed: 1,
      all_failed: false,
    })
  );

  let started = events
    .iter()
    .filter(|e| matches!(e, FetchEvent::TaskStarted { .. }))
    .count();
  assert_eq!(started, 2);

  assert!(events.iter().any(|e| matches!(
    e,
    FetchEvent::TaskSucceeded { index: 0, name, .. } if name == "sales"
  )));
  assert!(events.iter().any(|e| matches!(
    e,
    FetchEvent::TaskFailed { index: 1, name, error, .. } if name == "traffic" && error == "down"
  )));
}

#[tokio::test]
async fn test_rerunning_a_batch_issues_fresh_calls() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);

  let tasks: Vec<FetchTask<Value>> = vec![FetchTask::new("counter", move || {
    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
    async move { Ok::<_, String>(json!(n)) }
  })];

  let orchestrator = Orchestrator::new();
  let first = orchestrator.fetch_all(&tasks).await;
  let second = orchestrator.fetch_all(&tasks).await;

  assert_ne!(first.batch_id(), second.batch_id());
  assert_eq!(first.get(0).and_then(|o| o.result.data()), Some(&json!(1)));
  assert_eq!(second.get(0).and_then(|o| o.result.data()), Some(&json!(2)));
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_batch() {
  let tasks: Vec<FetchTask<Value>> = Vec::new();
  let batch = Orchestrator::new().fetch_all(&tasks).await;

  assert!(batch.is_empty());
  assert!(batch.all_failed());
}
