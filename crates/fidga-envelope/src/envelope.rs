//! The `{success, data, error}` result envelope.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};

/// Message used when a failure carries no usable text of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "API call failed";

/// Normalized outcome of one backend call.
///
/// Exactly one of `data`/`error` is meaningful. A successful result carries
/// its payload (which may legitimately be null) and no error; a failed result
/// carries a non-empty message and no data. Fields are private so every value
/// of this type upholds that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult<T> {
  success: bool,
  data: Option<T>,
  error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  timestamp: Option<DateTime<Utc>>,
  #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
  duration_ms: Option<u64>,
}

impl<T> ApiResult<T> {
  /// A successful result carrying `data`.
  pub fn success(data: T) -> Self {
    Self::from_data(Some(data))
  }

  /// A successful result whose payload is null.
  pub fn success_null() -> Self {
    Self::from_data(None)
  }

  /// A successful result from an optional payload.
  pub fn from_data(data: Option<T>) -> Self {
    Self {
      success: true,
      data,
      error: None,
      timestamp: None,
      duration_ms: None,
    }
  }

  /// A failed result. Blank messages are replaced with [`DEFAULT_ERROR_MESSAGE`].
  pub fn failure(message: impl Into<String>) -> Self {
    let message = message.into();
    let error = if message.trim().is_empty() {
      DEFAULT_ERROR_MESSAGE.to_string()
    } else {
      message
    };

    Self {
      success: false,
      data: None,
      error: Some(error),
      timestamp: None,
      duration_ms: None,
    }
  }

  pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
    self.timestamp = Some(timestamp);
    self
  }

  /// Attach the current time as the result timestamp.
  pub fn stamped(self) -> Self {
    self.with_timestamp(Utc::now())
  }

  pub fn with_duration(mut self, duration: Duration) -> Self {
    self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
    self
  }

  pub fn is_success(&self) -> bool {
    self.success
  }

  pub fn is_failure(&self) -> bool {
    !self.success
  }

  /// The payload. Always `None` for failures.
  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  /// The failure message. Always `None` for successes.
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn timestamp(&self) -> Option<DateTime<Utc>> {
    self.timestamp
  }

  pub fn duration(&self) -> Option<Duration> {
    self.duration_ms.map(Duration::from_millis)
  }

  /// Convert into a std `Result`, yielding the payload or the failure message.
  pub fn into_result(self) -> Result<Option<T>, String> {
    if self.success {
      Ok(self.data)
    } else {
      Err(
        self
          .error
          .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
      )
    }
  }
}

impl ApiResult<serde_json::Value> {
  /// Decode a JSON payload into a typed one.
  ///
  /// A payload that does not match `U` turns the result into a failure, the
  /// same way a malformed response body would.
  pub fn decode<U: DeserializeOwned>(self) -> ApiResult<U> {
    let timestamp = self.timestamp;
    let duration_ms = self.duration_ms;

    let decoded = match (self.success, self.data) {
      (false, _) => ApiResult::failure(self.error.unwrap_or_default()),
      (true, None) => ApiResult::success_null(),
      (true, Some(value)) => match serde_json::from_value(value) {
        Ok(data) => ApiResult::success(data),
        Err(e) => ApiResult::failure(format!("malformed response payload: {}", e)),
      },
    };

    ApiResult {
      timestamp,
      duration_ms,
      ..decoded
    }
  }
}

/// The envelope as the backend sends it.
///
/// Everything except `success` is read leniently: a backend that sends an odd
/// timestamp or an error object still produces an envelope instead of being
/// mistaken for a raw payload. `data` is held untyped until `success` is
/// known, since a failed envelope's data is discarded whatever its shape.
#[derive(Deserialize)]
struct WireEnvelope {
  success: bool,
  #[serde(default)]
  data: Option<serde_json::Value>,
  #[serde(default, deserialize_with = "lenient_message")]
  error: Option<String>,
  #[serde(default, deserialize_with = "lenient_message")]
  message: Option<String>,
  #[serde(default, deserialize_with = "lenient_timestamp")]
  timestamp: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "lenient_duration")]
  duration: Option<u64>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ApiResult<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let wire = WireEnvelope::deserialize(deserializer)?;

    let result = if wire.success {
      let data = match wire.data {
        Some(value) => Some(T::deserialize(value).map_err(<D::Error as de::Error>::custom)?),
        None => None,
      };
      ApiResult::from_data(data)
    } else {
      // Application-level failures may only set `message`.
      let message = wire
        .error
        .filter(|e| !e.trim().is_empty())
        .or(wire.message)
        .unwrap_or_default();
      ApiResult::failure(message)
    };

    Ok(ApiResult {
      timestamp: wire.timestamp,
      duration_ms: wire.duration,
      ..result
    })
  }
}

fn lenient_message<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(value.and_then(|v| match v {
    serde_json::Value::Null => None,
    serde_json::Value::String(s) => Some(s),
    serde_json::Value::Object(ref map) => match map.get("message") {
      Some(serde_json::Value::String(s)) => Some(s.clone()),
      _ => Some(v.to_string()),
    },
    other => Some(other.to_string()),
  }))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(
    value
      .as_ref()
      .and_then(|v| v.as_str())
      .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
      .map(|ts| ts.with_timezone(&Utc)),
  )
}

fn lenient_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(value.as_ref().and_then(|v| v.as_u64()))
}
