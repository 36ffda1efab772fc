//! Dashboard modules.
//!
//! A module is a named set of sections. Loading it dispatches one fetch task
//! per section through the orchestrator and settles every section from its own
//! result, so a failing source never blanks out its neighbours.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use fidga_client::{ApiClient, ClientError, GaTrafficQuery, MarketFilter};
use fidga_config::AnalyticsHandle;
use fidga_envelope::Payload;
use fidga_fetch::{FetchNotifier, FetchTask, NoopNotifier, Orchestrator};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::DashboardError;
use crate::section::Section;
use crate::tracker::{AnalyticsTracker, TrackedEvent};

pub const ANALYTICS_FAILED: &str = "Failed to load analytics data.";
pub const ANALYTICS_DISABLED: &str = "Analytics tracking is disabled. Enable to view dashboard data.";

const SALES_FAILED: &str = "Failed to load sales data.";
const MARKET_FAILED: &str = "Failed to load market intelligence.";
const TRENDS_FAILED: &str = "Failed to load trend forecast.";
const CAMPAIGNS_FAILED: &str = "Failed to load campaigns.";
const PERFORMANCE_FAILED: &str = "Failed to load performance data.";
const CONTENT_FAILED: &str = "Failed to load content data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
  Overview,
  Analytics,
  Market,
  Campaigns,
  Performance,
  Content,
}

impl ModuleKind {
  pub const ALL: [ModuleKind; 6] = [
    ModuleKind::Overview,
    ModuleKind::Analytics,
    ModuleKind::Market,
    ModuleKind::Campaigns,
    ModuleKind::Performance,
    ModuleKind::Content,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ModuleKind::Overview => "overview",
      ModuleKind::Analytics => "analytics",
      ModuleKind::Market => "market",
      ModuleKind::Campaigns => "campaigns",
      ModuleKind::Performance => "performance",
      ModuleKind::Content => "content",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      ModuleKind::Overview => "Dashboard Overview",
      ModuleKind::Analytics => "Google Analytics",
      ModuleKind::Market => "Market Intelligence & Trends",
      ModuleKind::Campaigns => "Campaign Management",
      ModuleKind::Performance => "Performance Monitoring",
      ModuleKind::Content => "Content Generation",
    }
  }

  /// Message shown in place of the module when every section failed. Only
  /// analytics collapses to a single error; the others show per-section
  /// errors.
  pub fn blanket_error(self) -> Option<&'static str> {
    match self {
      ModuleKind::Analytics => Some(ANALYTICS_FAILED),
      _ => None,
    }
  }
}

impl fmt::Display for ModuleKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for ModuleKind {
  type Err = DashboardError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase();
    ModuleKind::ALL
      .into_iter()
      .find(|kind| kind.name() == wanted)
      .ok_or_else(|| DashboardError::UnknownModule {
        name: s.to_string(),
        expected: ModuleKind::ALL.map(ModuleKind::name).join(", "),
      })
  }
}

/// One section of a loaded module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
  pub key: &'static str,
  pub title: &'static str,
  pub state: Section<Value>,
}

/// Everything needed to draw a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleView {
  pub kind: ModuleKind,
  pub sections: Vec<SectionView>,
  /// Replaces the sections when set.
  pub error: Option<String>,
  /// Informational message, e.g. analytics being switched off.
  pub notice: Option<String>,
}

impl ModuleView {
  pub fn section(&self, key: &str) -> Option<&SectionView> {
    self.sections.iter().find(|s| s.key == key)
  }
}

/// How to fill one section.
struct SectionPlan {
  key: &'static str,
  title: &'static str,
  fallback: &'static str,
  task: FetchTask<Value>,
}

fn plan<F, Fut>(
  client: &Arc<ApiClient>,
  key: &'static str,
  title: &'static str,
  fallback: &'static str,
  call: F,
) -> SectionPlan
where
  F: Fn(Arc<ApiClient>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Payload<Value>, ClientError>> + Send + 'static,
{
  let client = Arc::clone(client);
  SectionPlan {
    key,
    title,
    fallback,
    task: FetchTask::new(key, move || call(Arc::clone(&client))).with_category(title),
  }
}

fn plans(kind: ModuleKind, client: &Arc<ApiClient>) -> Vec<SectionPlan> {
  match kind {
    ModuleKind::Overview => vec![
      plan(client, "sales", "Sales", SALES_FAILED, |c| async move {
        c.sales().await
      }),
      plan(client, "traffic", "Traffic", ANALYTICS_FAILED, |c| async move {
        c.ga_traffic(&GaTrafficQuery::default()).await
      }),
      plan(client, "market", "Market Intelligence", MARKET_FAILED, |c| async move {
        let filter = MarketFilter::new("retail", "India").with_period("30d");
        c.market_intelligence(&filter).await
      }),
    ],
    ModuleKind::Analytics => vec![
      plan(client, "traffic", "Traffic", ANALYTICS_FAILED, |c| async move {
        c.ga_traffic(&GaTrafficQuery::default()).await
      }),
      plan(client, "audience", "Audience", ANALYTICS_FAILED, |c| async move {
        c.ga_audience_demographics().await
      }),
      plan(client, "campaigns", "Campaigns", ANALYTICS_FAILED, |c| async move {
        c.ga_campaign_performance().await
      }),
      plan(client, "content", "Content", ANALYTICS_FAILED, |c| async move {
        c.ga_content_performance().await
      }),
    ],
    ModuleKind::Market => vec![
      plan(client, "intelligence", "Market Intelligence", MARKET_FAILED, |c| async move {
        c.market_intelligence(&MarketFilter::new("retail", "India")).await
      }),
      plan(client, "trends", "Trend Forecast", TRENDS_FAILED, |c| async move {
        c.trend_forecast().await
      }),
      plan(client, "social", "Social Listening", MARKET_FAILED, |c| async move {
        c.social_listening().await
      }),
      plan(client, "industry", "Industry Reports", MARKET_FAILED, |c| async move {
        c.industry_reports().await
      }),
      plan(client, "competitors", "Competitor Intelligence", MARKET_FAILED, |c| async move {
        c.competitor_intelligence().await
      }),
      plan(client, "audience", "Audience", ANALYTICS_FAILED, |c| async move {
        c.ga_audience_demographics().await
      }),
      plan(client, "content", "Content Performance", ANALYTICS_FAILED, |c| async move {
        c.ga_content_performance().await
      }),
    ],
    ModuleKind::Campaigns => vec![
      plan(client, "campaigns", "Campaigns", CAMPAIGNS_FAILED, |c| async move {
        c.list_campaigns().await
      }),
      plan(client, "performance", "Campaign Performance", ANALYTICS_FAILED, |c| async move {
        c.ga_campaign_performance().await
      }),
    ],
    ModuleKind::Performance => vec![
      plan(client, "traffic", "Traffic", ANALYTICS_FAILED, |c| async move {
        c.ga_traffic(&GaTrafficQuery::default()).await
      }),
      plan(client, "sales", "Sales", SALES_FAILED, |c| async move {
        c.sales().await
      }),
      plan(client, "summary", "Summary", PERFORMANCE_FAILED, |c| async move {
        c.performance_summary().await
      }),
      plan(client, "anomalies", "Anomalies", PERFORMANCE_FAILED, |c| async move {
        c.performance_anomalies().await
      }),
      plan(client, "forecast", "Forecast", PERFORMANCE_FAILED, |c| async move {
        c.performance_forecast().await
      }),
    ],
    ModuleKind::Content => vec![
      plan(client, "languages", "Indian Languages", CONTENT_FAILED, |c| async move {
        c.indian_languages().await
      }),
      plan(client, "performance", "Content Performance", ANALYTICS_FAILED, |c| async move {
        c.ga_content_performance().await
      }),
    ],
  }
}

/// Loads dashboard modules against one backend.
pub struct Dashboard<N: FetchNotifier = NoopNotifier> {
  client: Arc<ApiClient>,
  orchestrator: Orchestrator<N>,
  analytics: AnalyticsHandle,
  tracker: Option<AnalyticsTracker>,
}

impl Dashboard<NoopNotifier> {
  pub fn new(client: Arc<ApiClient>, analytics: AnalyticsHandle) -> Self {
    Self::with_orchestrator(client, Orchestrator::new(), analytics)
  }
}

impl<N: FetchNotifier> Dashboard<N> {
  pub fn with_orchestrator(
    client: Arc<ApiClient>,
    orchestrator: Orchestrator<N>,
    analytics: AnalyticsHandle,
  ) -> Self {
    Self {
      client,
      orchestrator,
      analytics,
      tracker: None,
    }
  }

  /// Report page views and analytics loads through `tracker`.
  pub fn with_tracker(mut self, tracker: AnalyticsTracker) -> Self {
    self.tracker = Some(tracker);
    self
  }

  /// Section layout of `kind` with every section idle.
  pub fn layout(&self, kind: ModuleKind) -> ModuleView {
    let sections = plans(kind, &self.client)
      .into_iter()
      .map(|p| SectionView {
        key: p.key,
        title: p.title,
        state: Section::Idle,
      })
      .collect();

    ModuleView {
      kind,
      sections,
      error: None,
      notice: None,
    }
  }

  /// Fetch every section of `kind` concurrently and settle each one.
  #[instrument(name = "load_module", skip(self, kind), fields(module = %kind))]
  pub async fn load(&self, kind: ModuleKind) -> ModuleView {
    if let Some(tracker) = &self.tracker {
      tracker.track_page_view(&format!("/{}", kind.name()));
    }

    if kind == ModuleKind::Analytics && !self.analytics.is_enabled() {
      info!(module = %kind, "module_skipped_analytics_disabled");
      let mut view = self.layout(kind);
      view.notice = Some(ANALYTICS_DISABLED.to_string());
      return view;
    }

    let plans = plans(kind, &self.client);
    let mut view = ModuleView {
      kind,
      sections: plans
        .iter()
        .map(|p| SectionView {
          key: p.key,
          title: p.title,
          state: Section::Loading,
        })
        .collect(),
      error: None,
      notice: None,
    };

    let tasks: Vec<FetchTask<Value>> = plans.iter().map(|p| p.task.clone()).collect();
    let batch = self.orchestrator.fetch_all(&tasks).await;
    let all_failed = batch.all_failed();

    for ((section, plan), result) in view
      .sections
      .iter_mut()
      .zip(&plans)
      .zip(batch.into_results())
    {
      section.state = Section::settle(result, plan.fallback);
    }

    if all_failed {
      view.error = kind.blanket_error().map(str::to_string);
    } else if kind == ModuleKind::Analytics {
      if let Some(tracker) = &self.tracker {
        tracker.track_event(TrackedEvent::new("Analytics", "data_loaded"));
      }
    }

    view
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_module_kind_parse() {
    assert_eq!("overview".parse::<ModuleKind>().ok(), Some(ModuleKind::Overview));
    assert_eq!(" Market ".parse::<ModuleKind>().ok(), Some(ModuleKind::Market));

    let err = "admin".parse::<ModuleKind>().unwrap_err();
    assert!(err.to_string().contains("unknown module 'admin'"));
    assert!(err.to_string().contains("overview, analytics"));
  }

  #[test]
  fn test_layouts() {
    let client = Arc::new(ApiClient::new("http://localhost:5000").unwrap());
    let dashboard = Dashboard::new(client, AnalyticsHandle::fixed(true));

    let keys = |kind| {
      dashboard
        .layout(kind)
        .sections
        .iter()
        .map(|s| s.key)
        .collect::<Vec<_>>()
    };

    assert_eq!(keys(ModuleKind::Overview), vec!["sales", "traffic", "market"]);
    assert_eq!(
      keys(ModuleKind::Analytics),
      vec!["traffic", "audience", "campaigns", "content"]
    );
    assert_eq!(keys(ModuleKind::Market).len(), 7);
    assert_eq!(keys(ModuleKind::Campaigns), vec!["campaigns", "performance"]);
    assert_eq!(keys(ModuleKind::Performance).len(), 5);
    assert_eq!(keys(ModuleKind::Content), vec!["languages", "performance"]);
  }

  #[test]
  fn test_only_analytics_has_blanket_error() {
    for kind in ModuleKind::ALL {
      assert_eq!(
        kind.blanket_error().is_some(),
        kind == ModuleKind::Analytics
      );
    }
  }
}
