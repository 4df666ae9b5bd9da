use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use url::Url;

/// Why a single attempt did not yield a final result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryKind {
    /// The server replied `503 Service Unavailable`.
    ServerBusy,
    /// The server replied `429 Too Many Requests`.
    RateLimited,
    /// The server replied `301 Moved Permanently`, possibly with a new
    /// location. A missing or unparseable `Location` header degrades to a
    /// same-URL retry.
    Redirect(Option<Url>),
    /// The attempt hit the per-attempt timeout before a response arrived.
    Timeout,
}

/// Transient signal produced by one failed attempt.
///
/// `retry_after` is the server-specified wait, when the response carried a
/// usable `Retry-After` header; it overrides the computed backoff for one
/// wait without resetting the doubling sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryInfo {
    pub kind: RetryKind,
    pub retry_after: Option<Duration>,
}

impl RetryInfo {
    /// The signal for a transport-level timeout.
    pub fn timeout() -> Self {
        Self {
            kind: RetryKind::Timeout,
            retry_after: None,
        }
    }

    /// Build a `RetryInfo` from a completed response, or `None` when the
    /// status is not a retry signal.
    pub fn from_response(status: u16, headers: &HeaderMap) -> Option<Self> {
        match status {
            503 => Some(Self {
                kind: RetryKind::ServerBusy,
                retry_after: parse_retry_after(headers),
            }),
            429 => Some(Self {
                kind: RetryKind::RateLimited,
                retry_after: parse_retry_after(headers),
            }),
            301 => Some(Self {
                kind: RetryKind::Redirect(parse_location(headers)),
                retry_after: None,
            }),
            _ => None,
        }
    }
}

/// Parse a `Retry-After` header: either an integer count of seconds or an
/// HTTP date. Unparseable values (and dates already in the past) are
/// discarded silently so the caller falls back to its computed backoff.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    (date.with_timezone(&Utc) - Utc::now()).to_std().ok()
}

/// Best-effort parse of a `Location` header into an absolute URL.
fn parse_location(headers: &HeaderMap) -> Option<Url> {
    let value = headers.get(LOCATION)?.to_str().ok()?;
    Url::parse(value).ok()
}
