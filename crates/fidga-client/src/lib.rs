//! HTTP client for the FIDGA backend.
//!
//! One method per backend endpoint. Each returns the decoded body as a
//! [`fidga_envelope::Payload`] so callers can hand it straight to
//! `fidga_fetch::safe_call`.

mod client;
mod error;
mod query;

pub use client::ApiClient;
pub use error::ClientError;
pub use query::{DateRange, GaTrafficQuery, MarketFilter};
