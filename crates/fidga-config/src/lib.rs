//! FIDGA configuration.
//!
//! Settings come from `{data_dir}/config.json` (default data dir `~/.fidga`),
//! then the `FIDGA_API_URL` environment variable, then the `--api-url` flag.
//! The analytics flag lives beside them in `{data_dir}/analytics.json`.

mod analytics;
mod dashboard;
mod error;

pub use analytics::{ANALYTICS_FILE, AnalyticsHandle, AnalyticsToggle};
pub use dashboard::{
  API_URL_ENV, CONFIG_FILE, DEFAULT_API_BASE_URL, DEFAULT_TEST_PAUSE_MS, DashboardConfig,
};
pub use error::ConfigError;
