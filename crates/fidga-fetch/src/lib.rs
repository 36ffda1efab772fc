//! Safe API calls and parallel fetching for FIDGA.
//!
//! Every dashboard module loads several independent data sources at once and
//! must render whatever arrived even when some sources fail. This crate holds
//! that contract.
//!
//! # Architecture
//!
//! ```text
//! safe_call(f) -> ApiResult<T>            never fails, never panics outward
//!
//! FetchTask<T>
//! └── run() -> ApiResult<T>               safe_call around a named fetch
//!
//! Orchestrator<N: FetchNotifier>
//! └── fetch_all(&[FetchTask<T>])          all tasks in flight at once
//!     └── BatchResult<T>                  positional outcomes + all_failed()
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use fidga_fetch::{FetchTask, Orchestrator};
//!
//! let tasks = vec![
//!     FetchTask::new("sales", move || client.sales()),
//!     FetchTask::new("traffic", move || client.ga_traffic(None)),
//! ];
//!
//! let batch = Orchestrator::new().fetch_all(&tasks).await;
//! if batch.all_failed() {
//!     // show one blanket error
//! }
//! ```

mod batch;
mod events;
mod orchestrator;
mod safe_call;
mod task;

pub use batch::{BatchResult, TaskOutcome};
pub use events::{ChannelNotifier, FetchEvent, FetchNotifier, NoopNotifier};
pub use orchestrator::{CANCELLED_MESSAGE, Orchestrator};
pub use safe_call::{panic_message, safe_call};
pub use task::FetchTask;
