//! FIDGA result envelope.
//!
//! Every backend endpoint answers with `{success, data, error}`, and every
//! client-side call is normalized into the same shape before anything renders
//! it. [`ApiResult`] is that shape; [`Payload`] is what a fetch function
//! resolves to before normalization (either an envelope or a bare value).

mod envelope;
mod payload;

pub use envelope::{ApiResult, DEFAULT_ERROR_MESSAGE};
pub use payload::Payload;
