use fidga_envelope::{ApiResult, DEFAULT_ERROR_MESSAGE};
use serde::Serialize;

/// Display state of one dashboard section.
///
/// Each section is owned by exactly one fetch task and settles from that
/// task's result alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Section<T> {
  #[default]
  Idle,
  Loading,
  Loaded(Option<T>),
  Failed(String),
}

impl<T> Section<T> {
  /// Apply a fetch result. A failure that only carries the generic
  /// "API call failed" text shows the section's `fallback` instead.
  pub fn settle(result: ApiResult<T>, fallback: &str) -> Self {
    match result.into_result() {
      Ok(data) => Section::Loaded(data),
      Err(error) if error.trim().is_empty() || error == DEFAULT_ERROR_MESSAGE => {
        Section::Failed(fallback.to_string())
      }
      Err(error) => Section::Failed(error),
    }
  }

  pub fn is_loaded(&self) -> bool {
    matches!(self, Section::Loaded(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, Section::Failed(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      Section::Loaded(data) => data.as_ref(),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      Section::Failed(error) => Some(error),
      _ => None,
    }
  }
}
