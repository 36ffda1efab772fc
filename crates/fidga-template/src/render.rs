use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

/// Values a template can pull placeholders from.
pub trait TemplateData {
  /// The text for `key`, or None when the key is missing or null.
  fn lookup(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl TemplateData for HashMap<String, String> {
  fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
    self.get(key).map(|v| Cow::Borrowed(v.as_str()))
  }
}

impl TemplateData for BTreeMap<String, String> {
  fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
    self.get(key).map(|v| Cow::Borrowed(v.as_str()))
  }
}

/// Only object fields are visible. Strings are inserted as they are, other
/// scalars and nested values in their JSON form.
impl TemplateData for Value {
  fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
    match self.get(key)? {
      Value::Null => None,
      Value::String(s) => Some(Cow::Borrowed(s.as_str())),
      other => Some(Cow::Owned(other.to_string())),
    }
  }
}

fn placeholder() -> &'static Regex {
  static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
  PLACEHOLDER_RE.get_or_init(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder regex should compile")
  })
}

/// Replace every `{{ key }}` in `template` with the matching value.
///
/// Missing and null keys become empty strings. Nothing is evaluated:
/// anything that is not a bare word between braces is left untouched.
pub fn render<D: TemplateData + ?Sized>(template: &str, data: &D) -> String {
  placeholder()
    .replace_all(template, |caps: &Captures<'_>| {
      data.lookup(&caps[1]).map(Cow::into_owned).unwrap_or_default()
    })
    .into_owned()
}
