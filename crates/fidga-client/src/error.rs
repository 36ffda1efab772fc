use thiserror::Error;

/// Errors raised while talking to the FIDGA backend.
///
/// None of these reach the dashboard directly: fetch tasks route them through
/// `safe_call`, which turns the display text into a failed `ApiResult`.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("invalid base URL '{url}': {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  #[error("unsupported base URL '{url}': expected http or https")]
  UnsupportedScheme { url: String },

  #[error("failed to fetch: {0}")]
  Http(#[from] reqwest::Error),

  #[error("HTTP {status}: {reason}")]
  Status { status: u16, reason: String },

  #[error("malformed response from {path}")]
  MalformedResponse { path: String },
}
