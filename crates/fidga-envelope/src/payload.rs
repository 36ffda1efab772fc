//! What a data-fetch function resolves to before normalization.

use serde::Deserialize;

use crate::envelope::ApiResult;

/// The resolved value of a data-fetch function.
///
/// Backends either answer with a full envelope or with a bare payload. An
/// object counts as an envelope only when it has a boolean `success` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
  /// Already shaped as `{success, data, error}`.
  Enveloped(ApiResult<T>),
  /// A bare value; `None` when the function resolved to null.
  Raw(Option<T>),
}

impl<T> Payload<T> {
  /// Wrap a bare value.
  pub fn raw(value: T) -> Self {
    Payload::Raw(Some(value))
  }

  /// Normalize into an [`ApiResult`].
  ///
  /// Envelopes pass through as they are. Bare values, null included, are
  /// successes.
  pub fn into_api_result(self) -> ApiResult<T> {
    match self {
      Payload::Enveloped(result) => result,
      Payload::Raw(data) => ApiResult::from_data(data),
    }
  }
}

impl<T> From<ApiResult<T>> for Payload<T> {
  fn from(result: ApiResult<T>) -> Self {
    Payload::Enveloped(result)
  }
}

impl From<serde_json::Value> for Payload<serde_json::Value> {
  fn from(value: serde_json::Value) -> Self {
    let enveloped = value
      .get("success")
      .is_some_and(serde_json::Value::is_boolean);

    if enveloped {
      if let Ok(result) = ApiResult::deserialize(&value) {
        return Payload::Enveloped(result);
      }
    }

    if value.is_null() {
      Payload::Raw(None)
    } else {
      Payload::Raw(Some(value))
    }
  }
}
