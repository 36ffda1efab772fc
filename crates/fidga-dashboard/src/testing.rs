//! API integration test runner.
//!
//! Probes every backend endpoint one at a time with a short pause between
//! calls, recording status and duration for each. Unlike dashboard modules,
//! probes run sequentially so a full sweep never floods the backend.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use fidga_client::{ApiClient, ClientError, MarketFilter};
use fidga_envelope::{ApiResult, Payload};
use fidga_fetch::FetchTask;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::error::DashboardError;

pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProbeCategory {
  Analytics,
  Content,
  MarketIntelligence,
  Campaigns,
  BusinessData,
  AiServices,
  System,
}

impl ProbeCategory {
  pub const ALL: [ProbeCategory; 7] = [
    ProbeCategory::Analytics,
    ProbeCategory::Content,
    ProbeCategory::MarketIntelligence,
    ProbeCategory::Campaigns,
    ProbeCategory::BusinessData,
    ProbeCategory::AiServices,
    ProbeCategory::System,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ProbeCategory::Analytics => "Analytics",
      ProbeCategory::Content => "Content",
      ProbeCategory::MarketIntelligence => "Market Intelligence",
      ProbeCategory::Campaigns => "Campaigns",
      ProbeCategory::BusinessData => "Business Data",
      ProbeCategory::AiServices => "AI Services",
      ProbeCategory::System => "System",
    }
  }
}

impl fmt::Display for ProbeCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Accepts display names case-insensitively, with `-` or `_` in place of
/// spaces (`market-intelligence`, `ai_services`).
impl FromStr for ProbeCategory {
  type Err = DashboardError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalize = |name: &str| {
      name
        .trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect::<String>()
    };
    let wanted = normalize(s);

    ProbeCategory::ALL
      .into_iter()
      .find(|category| normalize(category.name()) == wanted)
      .ok_or_else(|| DashboardError::UnknownCategory {
        name: s.to_string(),
        expected: ProbeCategory::ALL.map(ProbeCategory::name).join(", "),
      })
  }
}

/// One endpoint check.
#[derive(Debug, Clone)]
pub struct Probe {
  pub name: String,
  pub category: ProbeCategory,
  task: FetchTask<Value>,
}

impl Probe {
  pub fn new(category: ProbeCategory, task: FetchTask<Value>) -> Self {
    Self {
      name: task.name().to_string(),
      category,
      task,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
  Running,
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
  pub name: String,
  pub category: ProbeCategory,
  pub status: ProbeStatus,
  pub result: Option<ApiResult<Value>>,
  pub error: Option<String>,
  pub duration_ms: Option<u64>,
}

impl ProbeResult {
  fn running(probe: &Probe) -> Self {
    Self {
      name: probe.name.clone(),
      category: probe.category,
      status: ProbeStatus::Running,
      result: None,
      error: None,
      duration_ms: None,
    }
  }

  fn finish(mut self, result: ApiResult<Value>, duration: Duration) -> Self {
    self.status = if result.is_success() {
      ProbeStatus::Success
    } else {
      ProbeStatus::Error
    };
    self.error = result.error().map(str::to_string);
    self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
    self.result = Some(result);
    self
  }
}

/// Counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TestSummary {
  pub success: usize,
  pub error: usize,
  pub running: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestReport {
  pub results: Vec<ProbeResult>,
}

impl TestReport {
  pub fn summary(&self) -> TestSummary {
    self
      .results
      .iter()
      .fold(TestSummary::default(), |mut summary, r| {
        match r.status {
          ProbeStatus::Running => summary.running += 1,
          ProbeStatus::Success => summary.success += 1,
          ProbeStatus::Error => summary.error += 1,
        }
        summary
      })
  }

  pub fn get(&self, name: &str) -> Option<&ProbeResult> {
    self.results.iter().find(|r| r.name == name)
  }
}

/// Runs the probe catalog.
pub struct ApiTestRunner {
  probes: Vec<Probe>,
  pause: Duration,
}

impl ApiTestRunner {
  /// Runner over the full endpoint catalog of `client`.
  pub fn new(client: Arc<ApiClient>) -> Self {
    Self::from_probes(catalog(&client))
  }

  pub fn from_probes(probes: Vec<Probe>) -> Self {
    Self {
      probes,
      pause: DEFAULT_PAUSE,
    }
  }

  pub fn with_pause(mut self, pause: Duration) -> Self {
    self.pause = pause;
    self
  }

  pub fn probes(&self) -> &[Probe] {
    &self.probes
  }

  /// Categories in catalog order, without duplicates.
  pub fn categories(&self) -> Vec<ProbeCategory> {
    let mut categories = Vec::new();
    for probe in &self.probes {
      if !categories.contains(&probe.category) {
        categories.push(probe.category);
      }
    }
    categories
  }

  /// Run every probe. `on_update` sees each probe as it starts and again
  /// when it settles.
  pub async fn run_all<F>(&self, on_update: F) -> TestReport
  where
    F: FnMut(&ProbeResult),
  {
    self.run(self.probes.iter(), on_update).await
  }

  /// Run the probes of one category, named as in [`ProbeCategory`]'s
  /// `FromStr`.
  pub async fn run_category<F>(&self, category: &str, on_update: F) -> Result<TestReport, DashboardError>
  where
    F: FnMut(&ProbeResult),
  {
    let category: ProbeCategory = category.parse()?;
    let probes = self.probes.iter().filter(|p| p.category == category);
    Ok(self.run(probes, on_update).await)
  }

  #[instrument(name = "api_test_run", skip_all)]
  async fn run<'a, I, F>(&self, probes: I, mut on_update: F) -> TestReport
  where
    I: Iterator<Item = &'a Probe>,
    F: FnMut(&ProbeResult),
  {
    let mut report = TestReport::default();

    for (i, probe) in probes.enumerate() {
      if i > 0 && !self.pause.is_zero() {
        tokio::time::sleep(self.pause).await;
      }

      let running = ProbeResult::running(probe);
      on_update(&running);

      let started = Instant::now();
      let result = probe.task.run().await;
      let finished = running.finish(result, started.elapsed());

      match &finished.error {
        None => info!(probe = %finished.name, duration_ms = finished.duration_ms, "probe_succeeded"),
        Some(error) => warn!(probe = %finished.name, error = %error, "probe_failed"),
      }

      on_update(&finished);
      report.results.push(finished);
    }

    let summary = report.summary();
    info!(success = summary.success, error = summary.error, "api_test_completed");
    report
  }
}

fn probe<F, Fut>(client: &Arc<ApiClient>, category: ProbeCategory, name: &str, call: F) -> Probe
where
  F: Fn(Arc<ApiClient>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Payload<Value>, ClientError>> + Send + 'static,
{
  let client = Arc::clone(client);
  let task = FetchTask::new(name, move || call(Arc::clone(&client))).with_category(category.name());
  Probe::new(category, task)
}

/// Every endpoint probe, grouped by category.
fn catalog(client: &Arc<ApiClient>) -> Vec<Probe> {
  use ProbeCategory::*;

  vec![
    probe(client, Analytics, "GA Traffic", |c| async move {
      c.ga_traffic(&Default::default()).await
    }),
    probe(client, Analytics, "GA Audience Demographics", |c| async move {
      c.ga_audience_demographics().await
    }),
    probe(client, Analytics, "GA Campaign Performance", |c| async move {
      c.ga_campaign_performance().await
    }),
    probe(client, Analytics, "GA Content Performance", |c| async move {
      c.ga_content_performance().await
    }),
    probe(client, Analytics, "Analytics Mock Data", |c| async move {
      c.analytics_mock().await
    }),
    probe(client, Content, "Gemini Content Generation", |c| async move {
      let request = json!({ "prompt": "Generate a marketing headline for eco-friendly footwear" });
      c.gemini_content(&request).await
    }),
    probe(client, Content, "Personalized Content Generation", |c| async move {
      let request = json!({
        "segmentName": "Eco-Conscious Millennials",
        "channel": "social_media_post",
        "baseTopic": "sustainable footwear",
      });
      c.personalized_content(&request).await
    }),
    probe(client, MarketIntelligence, "Market Intelligence", |c| async move {
      c.market_intelligence(&MarketFilter::new("retail", "India")).await
    }),
    probe(client, MarketIntelligence, "Social Listening", |c| async move {
      c.social_listening().await
    }),
    probe(client, MarketIntelligence, "Competitor Intelligence", |c| async move {
      c.competitor_intel().await
    }),
    probe(client, MarketIntelligence, "Industry Reports", |c| async move {
      c.industry_reports().await
    }),
    probe(client, MarketIntelligence, "Trend Forecast", |c| async move {
      c.trend_forecast().await
    }),
    probe(client, MarketIntelligence, "Keyword Insights", |c| async move {
      c.keyword_insights_advanced("sustainable footwear").await
    }),
    probe(client, MarketIntelligence, "Customer Segments", |c| async move {
      c.customer_segments().await
    }),
    probe(client, MarketIntelligence, "Competitive Strategy", |c| async move {
      c.competitive_strategy().await
    }),
    probe(client, MarketIntelligence, "Actionable Recommendations", |c| async move {
      c.actionable_recommendations().await
    }),
    probe(client, Campaigns, "List Campaigns", |c| async move {
      c.list_campaigns().await
    }),
    probe(client, Campaigns, "Automate Campaign Status", |c| async move {
      c.automate_campaign_status().await
    }),
    probe(client, BusinessData, "Sales Data", |c| async move {
      c.sales().await
    }),
    probe(client, AiServices, "Indian Languages AI", |c| async move {
      c.indian_languages().await
    }),
    probe(client, AiServices, "Process Indian Languages", |c| async move {
      let request = json!({
        "text": "Welcome to our store",
        "targetLanguage": "hi",
        "context": "marketing",
      });
      c.process_indian_languages(&request).await
    }),
    probe(client, System, "API Health Check", |c| async move {
      c.health().await
    }),
    probe(client, System, "API Status Check", |c| async move {
      c.status().await
    }),
  ]
}
