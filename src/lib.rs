//! Client for an organisation accounts REST API.
//!
//! - [`http`] - the transport client: query encoding, retries with
//!   exponential backoff, and status-line errors
//! - [`account`] - create, fetch, list and delete operations
//! - [`console`] - the interactive front-end used by the binary

pub mod account;
pub mod console;
pub mod http;
