//! Resilient connection to the build service API.
//!
//! A [`Connection`] owns the credentials and session state for one endpoint
//! and executes every request through a bounded-concurrency retry loop:
//! transport timeouts, `503`/`429` throttling, and `301` redirects are
//! handled internally; everything else surfaces as a typed error.
//!
//! The connection never interprets route payloads beyond handing them to
//! the XML codec; route schemas live in `bsc-api`.

pub mod connection;
pub mod credentials;
pub mod error;
pub mod options;
pub mod retry;

pub use connection::{
    Connection, ConnectionOptions, DEFAULT_API_URL, DEFAULT_MAX_CONCURRENT_REQUESTS,
};
pub use credentials::Credentials;
pub use error::{ApiError, ClientError, ClientResult};
pub use options::{RequestBody, RequestMethod, RequestOptions};
pub use retry::{RetryInfo, RetryKind};
