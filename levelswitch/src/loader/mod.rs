//! Map-load requests to the map server.
//!
//! The switcher only needs one remote operation: "load this map". The
//! [`MapLoadClient`] trait abstracts the transport so the controller and
//! daemon can be tested with in-process mocks, and [`HttpMapLoadClient`]
//! provides the production HTTP/JSON implementation.
//!
//! Every call ends in exactly one [`LoadResult`]. Transport trouble and an
//! explicit rejection from the map server are kept apart:
//!
//! ```text
//! LoadResult::Success                 map server loaded the map
//! LoadResult::Failure(LoadStatus)     map server answered with a failure code
//! LoadResult::TransportError(reason)  no usable answer arrived
//! ```

mod client;
mod http;
mod types;

pub use client::MapLoadClient;
pub use http::{HttpMapLoadClient, DEFAULT_LOAD_TIMEOUT_SECS};
pub use types::{LoadResult, LoadStatus};
