//! Request parameters for endpoints that take more than a single field.

use serde::Serialize;

/// Date window for Google Analytics traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRange {
  /// A GA relative range such as `7daysAgo` or `30daysAgo`.
  Preset(String),
  /// Explicit `YYYY-MM-DD` bounds.
  Custom { start: String, end: String },
}

/// Query for `GET /api/ga-traffic`.
///
/// The default query sends no parameters and lets the backend pick its own
/// window and metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GaTrafficQuery {
  pub range: Option<DateRange>,
  pub metrics: Vec<String>,
}

impl GaTrafficQuery {
  pub fn preset(range: impl Into<String>) -> Self {
    Self {
      range: Some(DateRange::Preset(range.into())),
      metrics: Vec::new(),
    }
  }

  pub fn custom(start: impl Into<String>, end: impl Into<String>) -> Self {
    Self {
      range: Some(DateRange::Custom {
        start: start.into(),
        end: end.into(),
      }),
      metrics: Vec::new(),
    }
  }

  pub fn with_metrics<I, S>(mut self, metrics: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.metrics = metrics.into_iter().map(Into::into).collect();
    self
  }

  /// Query-string pairs; metrics are sent comma-joined.
  pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    match &self.range {
      Some(DateRange::Preset(range)) => pairs.push(("dateRange", range.clone())),
      Some(DateRange::Custom { start, end }) => {
        pairs.push(("startDate", start.clone()));
        pairs.push(("endDate", end.clone()));
      }
      None => {}
    }

    if !self.metrics.is_empty() {
      pairs.push(("metrics", self.metrics.join(",")));
    }

    pairs
  }
}

/// Body for `POST /api/market-intelligence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketFilter {
  pub industry: String,
  pub region: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub period: Option<String>,
}

impl MarketFilter {
  pub fn new(industry: impl Into<String>, region: impl Into<String>) -> Self {
    Self {
      industry: industry.into(),
      region: region.into(),
      period: None,
    }
  }

  pub fn with_period(mut self, period: impl Into<String>) -> Self {
    self.period = Some(period.into());
    self
  }
}
