use thiserror::Error;

/// Errors from route mapping and the calls behind it.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The connection layer failed (retries exhausted, terminal API
    /// status, transport).
    #[error(transparent)]
    Client(#[from] bsc_client::ClientError),

    /// A payload could not be encoded for the wire.
    #[error("codec error: {0}")]
    Codec(#[from] bsc_codec::CodecError),

    /// A reply was missing a field the caller needs.
    #[error("invalid reply: could not obtain {0}")]
    MissingField(&'static str),

    /// A digest field in a reply was malformed.
    #[error("invalid digest in reply: {0}")]
    Digest(#[from] bsc_types::TypeError),

    /// An operation needs file contents that are not loaded.
    #[error("contents of {0} are not loaded")]
    MissingContents(String),
}

/// Convenience alias for route results.
pub type RouteResult<T> = Result<T, RouteError>;
