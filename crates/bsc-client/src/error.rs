use thiserror::Error;

use crate::options::RequestMethod;

/// Terminal rejection from the remote API.
///
/// Any completed response with a status outside `200..=299` that is not a
/// retry signal ends up here; it is never retried automatically.
#[derive(Debug, Error)]
#[error("API error: {method} {url} returned status {status}")]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// The URL the request was sent to (after any redirects).
    pub url: String,
    /// The request method.
    pub method: RequestMethod,
    /// The response body; the API puts its detailed error message here.
    pub body: String,
}

/// Errors from the connection layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote rejected the request with a terminal status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Every attempt ended in a retryable condition.
    #[error("could not make a {method} request to {url}, tried unsuccessfully {attempts} time(s)")]
    RetriesExhausted {
        method: RequestMethod,
        url: String,
        attempts: u32,
    },

    /// The endpoint URL or a route could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The endpoint URL does not use https and https is enforced.
    #[error("{url} does not use https, got {scheme}")]
    HttpsRequired { url: String, scheme: String },

    /// The endpoint URL uses a scheme the client cannot speak at all.
    #[error("{url} does not use http or https, got {scheme}")]
    UnsupportedScheme { url: String, scheme: String },

    /// A transport-level failure that is not a timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] bsc_codec::CodecError),

    /// Invariant violation inside the connection itself.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias for connection results.
pub type ClientResult<T> = Result<T, ClientError>;
