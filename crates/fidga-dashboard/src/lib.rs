//! FIDGA dashboard.
//!
//! Turns backend data into dashboard views. Each module loads its sections in
//! parallel through `fidga_fetch` and shows whatever arrived; each failed
//! section carries its own error.
//!
//! # Architecture
//!
//! ```text
//! Dashboard<N: FetchNotifier>
//! └── load(ModuleKind) -> ModuleView
//!     └── SectionView { state: Section<Value> }   one per fetch task
//!
//! ApiTestRunner
//! └── run_all / run_category -> TestReport       sequential probes
//!
//! ErrorBoundary::render(|| ...) -> View          panic -> fallback panel
//! AnalyticsTracker                               gated on the toggle
//! ```

mod boundary;
mod error;
mod module;
mod render;
mod section;
mod testing;
mod tracker;

pub use boundary::{ErrorBoundary, FALLBACK_TITLE, FallbackPanel, RELOAD_ACTION, View};
pub use error::DashboardError;
pub use module::{
  ANALYTICS_DISABLED, ANALYTICS_FAILED, Dashboard, ModuleKind, ModuleView, SectionView,
};
pub use render::{render_creatives, render_module, render_probe, render_report, status_icon};
pub use section::Section;
pub use testing::{
  ApiTestRunner, DEFAULT_PAUSE, Probe, ProbeCategory, ProbeResult, ProbeStatus, TestReport,
  TestSummary,
};
pub use tracker::{AnalyticsEvent, AnalyticsTracker, TrackedEvent};
