//! HTTP transport client with retry logic and status-line error translation.

mod client;
mod error;
mod retry;
mod transport;

use std::collections::BTreeMap;

pub use client::HttpClient;
pub use error::{HttpError, status_line};
pub use retry::{BACKOFF_BASE, BACKOFF_UNIT, MAX_RETRIES, RetryPolicy, is_transient};
pub use transport::{REQUEST_TIMEOUT, ReqwestTransport, Request, Response, Transport};

/// Request headers. Keys are unique.
pub type Headers = BTreeMap<String, String>;

/// Query parameters. Keys are unique and encoded in key order.
pub type QueryParams = BTreeMap<String, String>;
