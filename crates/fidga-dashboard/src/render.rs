//! Plain-text rendering for the terminal.

use std::fmt::Write;

use fidga_template::Creative;
use serde_json::Value;

use crate::module::ModuleView;
use crate::section::Section;
use crate::testing::{ProbeResult, ProbeStatus, TestReport};

pub fn render_module(view: &ModuleView) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "# {}", view.kind.title());

  if let Some(notice) = &view.notice {
    let _ = writeln!(out, "\n{}", notice);
    return out;
  }

  if let Some(error) = &view.error {
    let _ = writeln!(out, "\nerror: {}", error);
    return out;
  }

  for section in &view.sections {
    let _ = writeln!(out, "\n## {}", section.title);
    let _ = writeln!(out, "{}", render_section(&section.state));
  }

  out
}

fn render_section(section: &Section<Value>) -> String {
  match section {
    Section::Idle => "-".to_string(),
    Section::Loading => "loading...".to_string(),
    Section::Loaded(None) => "(no data)".to_string(),
    Section::Loaded(Some(data)) => {
      serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
    }
    Section::Failed(error) => format!("error: {}", error),
  }
}

pub fn status_icon(status: ProbeStatus) -> &'static str {
  match status {
    ProbeStatus::Running => "⏳",
    ProbeStatus::Success => "✅",
    ProbeStatus::Error => "❌",
  }
}

pub fn render_probe(result: &ProbeResult) -> String {
  let mut line = format!(
    "{} [{}] {}",
    status_icon(result.status),
    result.category,
    result.name
  );
  if let Some(ms) = result.duration_ms {
    let _ = write!(line, " ({}ms)", ms);
  }
  if let Some(error) = &result.error {
    let _ = write!(line, ": {}", error);
  }
  line
}

pub fn render_report(report: &TestReport) -> String {
  let mut out = String::new();
  for result in &report.results {
    let _ = writeln!(out, "{}", render_probe(result));
  }

  let summary = report.summary();
  let _ = writeln!(
    out,
    "\nsuccess: {}  error: {}  running: {}",
    summary.success, summary.error, summary.running
  );
  out
}

pub fn render_creatives(creatives: &[Creative]) -> String {
  let mut out = String::new();
  let mut current: Option<&str> = None;

  for creative in creatives {
    if current != Some(creative.product_id.as_str()) {
      let _ = writeln!(out, "\n# product {}", creative.product_id);
      current = Some(creative.product_id.as_str());
    }
    let _ = writeln!(
      out,
      "- {} | {} | {}",
      creative.headline, creative.description, creative.cta
    );
  }

  out
}
