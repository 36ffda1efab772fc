use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::ConfigError;

/// File name of the dashboard config inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "FIDGA_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TEST_PAUSE_MS: u64 = 100;

/// Dashboard settings.
///
/// Every field has a default, so a partial or missing `config.json` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
  /// Backend origin, e.g. `http://localhost:5000`.
  pub api_base_url: String,
  /// Per-request timeout. None waits as long as the transport does.
  pub request_timeout_ms: Option<u64>,
  /// Pause between probes of the API test runner.
  pub test_pause_ms: u64,
  /// Google Analytics measurement ID, attached to tracked events.
  pub analytics_measurement_id: Option<String>,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      api_base_url: DEFAULT_API_BASE_URL.to_string(),
      request_timeout_ms: None,
      test_pause_ms: DEFAULT_TEST_PAUSE_MS,
      analytics_measurement_id: None,
    }
  }
}

impl DashboardConfig {
  /// Read a config file.
  pub async fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path)
      .await
      .map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
      })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Read `{data_dir}/config.json`, falling back to defaults when the file
  /// does not exist. A file that exists but cannot be parsed is an error.
  pub async fn load_or_default(data_dir: &Path) -> Result<Self, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);

    match fs::try_exists(&path).await {
      Ok(true) => Self::load(&path).await,
      Ok(false) => {
        debug!(path = %path.display(), "config_not_found_using_defaults");
        Ok(Self::default())
      }
      Err(source) => Err(ConfigError::Io { path, source }),
    }
  }

  /// Apply overrides from the process environment.
  pub fn apply_env(self) -> Self {
    self.apply_env_from(|key| std::env::var(key).ok())
  }

  /// Apply overrides using `lookup` in place of the process environment.
  pub fn apply_env_from<F>(mut self, lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
      self.api_base_url = url;
    }
    self
  }

  /// Replace the base URL when `url` is set (the `--api-url` flag).
  pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
    if let Some(url) = url {
      self.api_base_url = url;
    }
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
      url: self.api_base_url.clone(),
      reason,
    };

    let url = url::Url::parse(self.api_base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
      "http" | "https" => Ok(()),
      other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
  }

  pub fn request_timeout(&self) -> Option<Duration> {
    self.request_timeout_ms.map(Duration::from_millis)
  }

  pub fn test_pause(&self) -> Duration {
    Duration::from_millis(self.test_pause_ms)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  #[test]
  fn test_defaults() {
    let config = DashboardConfig::default();
    assert_eq!(config.api_base_url, "http://localhost:5000");
    assert_eq!(config.test_pause(), Duration::from_millis(100));
    assert_eq!(config.request_timeout(), None);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_json_keeps_defaults() {
    let config: DashboardConfig =
      serde_json::from_str(r#"{ "request_timeout_ms": 2500 }"#).unwrap();

    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.request_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(config.test_pause_ms, DEFAULT_TEST_PAUSE_MS);
  }

  #[test]
  fn test_env_then_flag_precedence() {
    let env: HashMap<&str, &str> = HashMap::from([(API_URL_ENV, "http://staging:5000")]);
    let lookup = |key: &str| env.get(key).map(|v| v.to_string());

    let config = DashboardConfig::default().apply_env_from(lookup);
    assert_eq!(config.api_base_url, "http://staging:5000");

    let config = config.with_api_base_url(Some("http://flag:9000".to_string()));
    assert_eq!(config.api_base_url, "http://flag:9000");

    let config = config.with_api_base_url(None);
    assert_eq!(config.api_base_url, "http://flag:9000");
  }

  #[test]
  fn test_blank_env_is_ignored() {
    let config = DashboardConfig::default().apply_env_from(|_| Some("  ".to_string()));
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
  }

  #[test]
  fn test_validate_rejects_bad_urls() {
    let config = DashboardConfig::default().with_api_base_url(Some("localhost".to_string()));
    assert!(matches!(
      config.validate(),
      Err(ConfigError::InvalidBaseUrl { .. })
    ));

    let config = DashboardConfig::default().with_api_base_url(Some("ws://localhost".to_string()));
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("unsupported scheme 'ws'"));
  }

  #[tokio::test]
  async fn test_load_or_default() {
    let dir = tempfile::tempdir().unwrap();

    let config = DashboardConfig::load_or_default(dir.path()).await.unwrap();
    assert_eq!(config, DashboardConfig::default());

    tokio::fs::write(
      dir.path().join(CONFIG_FILE),
      r#"{ "api_base_url": "https://fidga.example.com", "test_pause_ms": 0 }"#,
    )
    .await
    .unwrap();

    let config = DashboardConfig::load_or_default(dir.path()).await.unwrap();
    assert_eq!(config.api_base_url, "https://fidga.example.com");
    assert_eq!(config.test_pause_ms, 0);
  }

  #[tokio::test]
  async fn test_corrupt_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join(CONFIG_FILE), "{ not json")
      .await
      .unwrap();

    let err = DashboardConfig::load_or_default(dir.path())
      .await
      .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
