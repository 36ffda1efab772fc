//! Call-and-normalize wrapper around data-fetch functions.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use fidga_envelope::{ApiResult, DEFAULT_ERROR_MESSAGE, Payload};
use futures::FutureExt;
use tracing::warn;

/// Invoke `call` and always resolve to an [`ApiResult`].
///
/// - an envelope (boolean `success`) passes through as it is
/// - a bare value is wrapped as a success
/// - an `Err` or a panic becomes a failure carrying its message, or
///   [`DEFAULT_ERROR_MESSAGE`] when there is none
///
/// Arguments are passed by capturing them in the closure.
///
/// A contained panic still goes through the process panic hook first, so with
/// the default hook its `thread ... panicked at` line reaches stderr ahead of
/// the `api_call_panicked` event. Both go to stderr; the returned result is
/// unaffected.
pub async fn safe_call<T, R, E, F, Fut>(call: F) -> ApiResult<T>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<R, E>>,
  R: Into<Payload<T>>,
  E: Display,
{
  // Calling inside the async block keeps a panic while building the future
  // inside the unwind guard too.
  let outcome = AssertUnwindSafe(async move { call().await })
    .catch_unwind()
    .await;

  match outcome {
    Ok(Ok(value)) => Into::<Payload<T>>::into(value).into_api_result(),
    Ok(Err(e)) => {
      let message = e.to_string();
      warn!(error = %message, "api_call_failed");
      ApiResult::failure(message)
    }
    Err(panic) => {
      let message = panic_message(&*panic);
      warn!(error = %message, "api_call_panicked");
      ApiResult::failure(message)
    }
  }
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    DEFAULT_ERROR_MESSAGE.to_string()
  }
}
