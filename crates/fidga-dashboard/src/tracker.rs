//! Analytics event tracking.
//!
//! Events are only emitted while the analytics toggle reads enabled. Each
//! emitted event is logged and, when a channel is attached, forwarded to it
//! for local consumers such as a live analytics panel.

use chrono::{DateTime, Utc};
use fidga_config::AnalyticsHandle;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A user interaction worth reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
  pub category: String,
  pub action: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<i64>,
}

impl TrackedEvent {
  pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
    Self {
      category: category.into(),
      action: action.into(),
      label: None,
      value: None,
    }
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  pub fn with_value(mut self, value: i64) -> Self {
    self.value = Some(value);
    self
  }
}

/// What the tracker forwards to its channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
  Event {
    #[serde(flatten)]
    event: TrackedEvent,
    ts: DateTime<Utc>,
  },
  PageView {
    page_path: String,
    ts: DateTime<Utc>,
  },
}

#[derive(Debug, Clone)]
pub struct AnalyticsTracker {
  analytics: AnalyticsHandle,
  measurement_id: Option<String>,
  sender: Option<mpsc::UnboundedSender<AnalyticsEvent>>,
}

impl AnalyticsTracker {
  pub fn new(analytics: AnalyticsHandle) -> Self {
    Self {
      analytics,
      measurement_id: None,
      sender: None,
    }
  }

  pub fn with_measurement_id(mut self, measurement_id: Option<String>) -> Self {
    self.measurement_id = measurement_id;
    self
  }

  pub fn with_channel(mut self, sender: mpsc::UnboundedSender<AnalyticsEvent>) -> Self {
    self.sender = Some(sender);
    self
  }

  /// Report an event. Returns whether it was emitted.
  pub fn track_event(&self, event: TrackedEvent) -> bool {
    if !self.analytics.is_enabled() {
      debug!(action = %event.action, "analytics_event_suppressed");
      return false;
    }

    info!(
      measurement_id = self.measurement_id.as_deref().unwrap_or_default(),
      category = %event.category,
      action = %event.action,
      label = event.label.as_deref().unwrap_or_default(),
      value = event.value,
      "analytics_event"
    );

    self.forward(AnalyticsEvent::Event {
      event,
      ts: Utc::now(),
    });
    true
  }

  /// Report a page view. Returns whether it was emitted.
  pub fn track_page_view(&self, page_path: &str) -> bool {
    if !self.analytics.is_enabled() {
      debug!(page_path, "analytics_page_view_suppressed");
      return false;
    }

    info!(
      measurement_id = self.measurement_id.as_deref().unwrap_or_default(),
      page_path,
      "analytics_page_view"
    );

    self.forward(AnalyticsEvent::PageView {
      page_path: page_path.to_string(),
      ts: Utc::now(),
    });
    true
  }

  fn forward(&self, event: AnalyticsEvent) {
    if let Some(sender) = &self.sender {
      // Receiver may have been dropped
      let _ = sender.send(event);
    }
  }
}
