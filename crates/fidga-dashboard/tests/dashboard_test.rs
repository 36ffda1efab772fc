use std::sync::Arc;
use std::time::Duration;

use fidga_client::ApiClient;
use fidga_config::AnalyticsHandle;
use fidga_dashboard::{
  ANALYTICS_DISABLED, ANALYTICS_FAILED, AnalyticsEvent, AnalyticsTracker, ApiTestRunner,
  Dashboard, ErrorBoundary, ModuleKind, ProbeStatus, Section, render_module,
};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<ApiClient> {
  Arc::new(ApiClient::new(&server.uri()).unwrap())
}

async fn respond(server: &MockServer, verb: &str, route: &str, template: ResponseTemplate) {
  Mock::given(method(verb))
    .and(path(route))
    .respond_with(template)
    .mount(server)
    .await;
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
  ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

#[tokio::test]
async fn test_overview_partial_failure_is_independent() {
  let server = MockServer::start().await;
  respond(&server, "GET", "/api/sales", ok(json!({ "total": 1200 }))).await;
  respond(
    &server,
    "GET",
    "/api/ga-traffic",
    ResponseTemplate::new(500).set_body_json(json!({ "success": false, "error": "GA quota exceeded" })),
  )
  .await;
  respond(&server, "POST", "/api/market-intelligence", ok(json!({ "trends": ["eco"] }))).await;

  let dashboard = Dashboard::new(client_for(&server), AnalyticsHandle::fixed(true));
  let view = dashboard.load(ModuleKind::Overview).await;

  assert_eq!(view.error, None);
  assert_eq!(
    view.section("sales").map(|s| &s.state),
    Some(&Section::Loaded(Some(json!({ "total": 1200 }))))
  );
  assert_eq!(
    view.section("traffic").and_then(|s| s.state.error()),
    Some("GA quota exceeded")
  );
  assert_eq!(
    view.section("market").and_then(|s| s.state.data()),
    Some(&json!({ "trends": ["eco"] }))
  );
}

#[tokio::test]
async fn test_analytics_all_failed_shows_blanket_error() {
  // Nothing mounted: every GA endpoint answers 404.
  let server = MockServer::start().await;

  let dashboard = Dashboard::new(client_for(&server), AnalyticsHandle::fixed(true));
  let view = dashboard.load(ModuleKind::Analytics).await;

  assert_eq!(view.error.as_deref(), Some(ANALYTICS_FAILED));
  assert_eq!(view.sections.len(), 4);
  assert!(view.sections.iter().all(|s| s.state.is_failed()));
}

#[tokio::test]
async fn test_analytics_partial_success_has_no_blanket_error() {
  let server = MockServer::start().await;
  respond(&server, "GET", "/api/ga-audience-demographics", ok(json!({ "ageGroups": [] }))).await;

  let dashboard = Dashboard::new(client_for(&server), AnalyticsHandle::fixed(true));
  let view = dashboard.load(ModuleKind::Analytics).await;

  assert_eq!(view.error, None);
  assert!(view.section("audience").is_some_and(|s| s.state.is_loaded()));
  assert_eq!(
    view.section("traffic").and_then(|s| s.state.error()),
    Some("HTTP 404: Not Found")
  );
}

#[tokio::test]
async fn test_disabled_analytics_skips_fetching() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ok(json!({})))
    .expect(0)
    .mount(&server)
    .await;

  let dashboard = Dashboard::new(client_for(&server), AnalyticsHandle::fixed(false));
  let view = dashboard.load(ModuleKind::Analytics).await;

  assert_eq!(view.notice.as_deref(), Some(ANALYTICS_DISABLED));
  assert!(view.sections.iter().all(|s| s.state == Section::Idle));
}

#[tokio::test]
async fn test_tracker_reports_page_view_and_analytics_load() {
  let server = MockServer::start().await;
  respond(&server, "GET", "/api/ga-traffic", ok(json!({ "totalUsers": 120 }))).await;

  let (tx, mut rx) = mpsc::unbounded_channel();
  let handle = AnalyticsHandle::fixed(true);
  let dashboard = Dashboard::new(client_for(&server), handle.clone())
    .with_tracker(AnalyticsTracker::new(handle).with_channel(tx));

  dashboard.load(ModuleKind::Analytics).await;

  match rx.try_recv() {
    Ok(AnalyticsEvent::PageView { page_path, .. }) => assert_eq!(page_path, "/analytics"),
    other => panic!("expected page view, got {other:?}"),
  }
  match rx.try_recv() {
    Ok(AnalyticsEvent::Event { event, .. }) => {
      assert_eq!(event.category, "Analytics");
      assert_eq!(event.action, "data_loaded");
    }
    other => panic!("expected data_loaded event, got {other:?}"),
  }
}

#[tokio::test]
async fn test_rendered_view_goes_through_boundary() {
  let server = MockServer::start().await;
  respond(&server, "GET", "/api/ai-agent/indian-languages", ok(json!(["hi", "ta"]))).await;

  let dashboard = Dashboard::new(client_for(&server), AnalyticsHandle::fixed(true));
  let view = dashboard.load(ModuleKind::Content).await;

  let rendered = ErrorBoundary.render(|| render_module(&view));
  let text = rendered.to_string();

  assert!(!rendered.is_fallback());
  assert!(text.contains("## Indian Languages"));
  assert!(text.contains("\"ta\""));
  assert!(text.contains("## Content Performance\nerror: HTTP 404: Not Found"));
}

#[tokio::test]
async fn test_runner_probes_a_category_in_order() {
  let server = MockServer::start().await;
  respond(&server, "GET", "/health", ok(json!({ "status": "ok" }))).await;
  respond(
    &server,
    "GET",
    "/api/status",
    ResponseTemplate::new(503).set_body_string("down for maintenance"),
  )
  .await;

  let runner = ApiTestRunner::new(client_for(&server)).with_pause(Duration::ZERO);

  let mut updates = Vec::new();
  let report = runner
    .run_category("system", |r| updates.push((r.name.clone(), r.status)))
    .await
    .unwrap();

  assert_eq!(
    updates,
    vec![
      ("API Health Check".to_string(), ProbeStatus::Running),
      ("API Health Check".to_string(), ProbeStatus::Success),
      ("API Status Check".to_string(), ProbeStatus::Running),
      ("API Status Check".to_string(), ProbeStatus::Error),
    ]
  );

  let summary = report.summary();
  assert_eq!((summary.success, summary.error, summary.running), (1, 1, 0));
  assert_eq!(
    report.get("API Status Check").and_then(|r| r.error.as_deref()),
    Some("HTTP 503: Service Unavailable")
  );
  assert!(report.get("API Health Check").and_then(|r| r.duration_ms).is_some());
}

#[tokio::test]
async fn test_runner_rejects_unknown_category() {
  let server = MockServer::start().await;
  let runner = ApiTestRunner::new(client_for(&server));

  let err = runner.run_category("billing", |_| {}).await.unwrap_err();
  assert!(err.to_string().contains("unknown test category 'billing'"));
}

#[tokio::test(start_paused = true)]
async fn test_runner_pauses_between_probes() {
  use fidga_dashboard::{Probe, ProbeCategory};
  use fidga_fetch::FetchTask;
  use tokio::time::Instant;

  let probes = (0..3)
    .map(|i| {
      Probe::new(
        ProbeCategory::System,
        FetchTask::new(format!("probe-{i}"), || async {
          Ok::<_, String>(json!(null))
        }),
      )
    })
    .collect();

  let runner = ApiTestRunner::from_probes(probes).with_pause(Duration::from_millis(100));

  let started = Instant::now();
  let report = runner.run_all(|_| {}).await;

  assert_eq!(report.summary().success, 3);
  assert!(started.elapsed() >= Duration::from_millis(200));
}
