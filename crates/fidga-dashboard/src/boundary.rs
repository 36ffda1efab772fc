//! Last-resort error boundary around view rendering.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use fidga_fetch::panic_message;
use tracing::error;

pub const FALLBACK_TITLE: &str = "Something went wrong.";
pub const RELOAD_ACTION: &str = "Reload";

/// Replaces a view whose rendering panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPanel {
  pub title: &'static str,
  pub detail: String,
  pub action: &'static str,
}

impl fmt::Display for FallbackPanel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", self.title)?;
    writeln!(f)?;
    writeln!(f, "  {}", self.detail)?;
    writeln!(f)?;
    write!(f, "[{}] run the command again to reload", self.action)
  }
}

/// Outcome of rendering behind the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
  Rendered(String),
  Fallback(FallbackPanel),
}

impl View {
  pub fn is_fallback(&self) -> bool {
    matches!(self, View::Fallback(_))
  }
}

impl fmt::Display for View {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      View::Rendered(text) => f.write_str(text),
      View::Fallback(panel) => panel.fmt(f),
    }
  }
}

/// Runs render closures, turning a panic into a [`FallbackPanel`].
///
/// Only programming errors should ever reach this: data failures are already
/// contained per section.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorBoundary;

impl ErrorBoundary {
  pub fn render<F>(&self, render: F) -> View
  where
    F: FnOnce() -> String,
  {
    match catch_unwind(AssertUnwindSafe(render)) {
      Ok(text) => View::Rendered(text),
      Err(panic) => {
        let detail = panic_message(&*panic);
        error!(error = %detail, "render_panicked");
        View::Fallback(FallbackPanel {
          title: FALLBACK_TITLE,
          detail,
          action: RELOAD_ACTION,
        })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_successful_render_passes_through() {
    let view = ErrorBoundary.render(|| "ok".to_string());
    assert_eq!(view, View::Rendered("ok".to_string()));
  }

  #[test]
  fn test_panic_becomes_fallback() {
    let view = ErrorBoundary.render(|| {
      let sections: Vec<String> = Vec::new();
      sections[3].clone()
    });

    assert!(view.is_fallback());
    let text = view.to_string();
    assert!(text.starts_with(FALLBACK_TITLE));
    assert!(text.contains("index out of bounds"));
    assert!(text.contains("[Reload]"));
  }
}
