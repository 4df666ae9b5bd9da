use thiserror::Error;

/// Errors from XML encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be serialized to XML.
    #[error("XML encode error: {0}")]
    Encode(String),

    /// A wire payload could not be deserialized.
    #[error("XML decode error: {0}")]
    Decode(String),

    /// A wire payload was not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(String),
}

/// Convenience alias for codec results.
pub type CodecResult<T> = Result<T, CodecError>;
