//! The "Google Analytics enabled" flag.
//!
//! A single [`AnalyticsToggle`] owns the flag and is the only writer. Readers
//! hold [`AnalyticsHandle`]s, which always see the latest value. The flag is
//! loaded from disk by [`AnalyticsToggle::init`] and written back by
//! [`AnalyticsToggle::teardown`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// File name of the persisted flag inside the data directory.
pub const ANALYTICS_FILE: &str = "analytics.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedFlag {
  enabled: bool,
}

/// Owner of the analytics flag.
#[derive(Debug)]
pub struct AnalyticsToggle {
  path: PathBuf,
  sender: watch::Sender<bool>,
}

impl AnalyticsToggle {
  /// Load the flag from `{data_dir}/analytics.json`.
  ///
  /// Analytics is enabled unless the file explicitly stores `false`. A missing
  /// or unreadable file leaves it enabled.
  pub async fn init(data_dir: &Path) -> Self {
    let path = data_dir.join(ANALYTICS_FILE);
    let enabled = read_flag(&path).await;

    debug!(path = %path.display(), enabled, "analytics_initialized");

    let (sender, _) = watch::channel(enabled);
    Self { path, sender }
  }

  pub fn is_enabled(&self) -> bool {
    *self.sender.borrow()
  }

  pub fn set_enabled(&self, enabled: bool) {
    let previous = self.sender.send_replace(enabled);
    if previous != enabled {
      info!(enabled, "analytics_toggled");
    }
  }

  /// A read-only view of the flag.
  pub fn handle(&self) -> AnalyticsHandle {
    AnalyticsHandle {
      receiver: self.sender.subscribe(),
    }
  }

  /// Write the current flag back to disk.
  pub async fn persist(&self) -> Result<(), ConfigError> {
    let flag = PersistedFlag {
      enabled: self.is_enabled(),
    };
    let io_error = |source| ConfigError::Io {
      path: self.path.clone(),
      source,
    };

    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let content = serde_json::to_string_pretty(&flag).map_err(|source| ConfigError::Parse {
      path: self.path.clone(),
      source,
    })?;
    fs::write(&self.path, content).await.map_err(io_error)?;

    debug!(path = %self.path.display(), enabled = flag.enabled, "analytics_persisted");
    Ok(())
  }

  /// Persist the flag and release the toggle. Handles keep reading the last
  /// value.
  pub async fn teardown(self) -> Result<(), ConfigError> {
    self.persist().await
  }
}

async fn read_flag(path: &Path) -> bool {
  let content = match fs::read_to_string(path).await {
    Ok(content) => content,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return true,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "analytics_flag_unreadable");
      return true;
    }
  };

  match serde_json::from_str::<PersistedFlag>(&content) {
    Ok(flag) => flag.enabled,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "analytics_flag_corrupt");
      true
    }
  }
}

/// Read-only view of the analytics flag.
#[derive(Debug, Clone)]
pub struct AnalyticsHandle {
  receiver: watch::Receiver<bool>,
}

impl AnalyticsHandle {
  /// A handle fixed at `enabled`, with no toggle behind it.
  pub fn fixed(enabled: bool) -> Self {
    let (_, receiver) = watch::channel(enabled);
    Self { receiver }
  }

  pub fn is_enabled(&self) -> bool {
    *self.receiver.borrow()
  }

  /// Wait for the next change. Returns None once the toggle is gone.
  pub async fn changed(&mut self) -> Option<bool> {
    self.receiver.changed().await.ok()?;
    Some(*self.receiver.borrow_and_update())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_enabled_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let toggle = AnalyticsToggle::init(dir.path()).await;
    assert!(toggle.is_enabled());
  }

  #[tokio::test]
  async fn test_disabled_flag_round_trips_through_teardown() {
    let dir = tempfile::tempdir().unwrap();

    let toggle = AnalyticsToggle::init(dir.path()).await;
    toggle.set_enabled(false);
    toggle.teardown().await.unwrap();

    let stored = tokio::fs::read_to_string(dir.path().join(ANALYTICS_FILE))
      .await
      .unwrap();
    assert!(stored.contains("false"));

    let toggle = AnalyticsToggle::init(dir.path()).await;
    assert!(!toggle.is_enabled());
  }

  #[tokio::test]
  async fn test_corrupt_flag_means_enabled() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join(ANALYTICS_FILE), "garbage")
      .await
      .unwrap();

    let toggle = AnalyticsToggle::init(dir.path()).await;
    assert!(toggle.is_enabled());
  }

  #[tokio::test]
  async fn test_teardown_creates_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested").join(".fidga");

    let toggle = AnalyticsToggle::init(&nested).await;
    toggle.teardown().await.unwrap();

    assert!(nested.join(ANALYTICS_FILE).exists());
  }

  #[tokio::test]
  async fn test_handles_observe_writes() {
    let dir = tempfile::tempdir().unwrap();
    let toggle = AnalyticsToggle::init(dir.path()).await;

    let mut handle = toggle.handle();
    let other = handle.clone();
    assert!(handle.is_enabled());

    toggle.set_enabled(false);
    assert_eq!(handle.changed().await, Some(false));
    assert!(!other.is_enabled());

    drop(toggle);
    assert_eq!(handle.changed().await, None);
    assert!(!handle.is_enabled());
  }

  #[test]
  fn test_fixed_handle() {
    assert!(AnalyticsHandle::fixed(true).is_enabled());
    assert!(!AnalyticsHandle::fixed(false).is_enabled());
  }
}
