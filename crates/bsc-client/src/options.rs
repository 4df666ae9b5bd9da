use std::fmt;
use std::time::Duration;

use serde::Serialize;

use bsc_codec::{CodecResult, XmlCodec};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default retry budget for idempotent requests.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Request methods supported by [`Connection::request`].
///
/// [`Connection::request`]: crate::Connection::request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    /// Whether a request with this method may be replayed.
    ///
    /// Only `GET` requests are retried on timeout; replaying a `POST`
    /// could repeat a side effect on the server.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Self::Get)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

/// A request payload, already in wire form.
///
/// The two constructors make the encoding decision explicit at the type
/// level: [`RequestBody::xml`] passes a value through the payload codec,
/// [`RequestBody::raw`] sends bytes verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestBody {
    bytes: Vec<u8>,
}

impl RequestBody {
    /// Encode a structured value through the XML codec.
    pub fn xml<T: Serialize>(value: &T) -> CodecResult<Self> {
        Ok(Self {
            bytes: XmlCodec::encode(value)?,
        })
    }

    /// Use a byte buffer as the payload verbatim.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The wire bytes of this payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes, sent as an explicit `Content-Length`.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-length payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Per-call options for [`Connection::request`].
///
/// [`Connection::request`]: crate::Connection::request
#[derive(Clone, Debug)]
pub struct RequestOptions {
    /// The request method. Defaults to `GET`.
    pub method: RequestMethod,
    /// Optional payload to send with the request.
    pub body: Option<RequestBody>,
    /// Timeout for a single attempt. Doubles after every transport
    /// timeout. Defaults to [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,
    /// How many attempts an idempotent request may use before failing.
    /// Non-idempotent methods always use exactly one attempt, whatever
    /// this is set to. Defaults to [`DEFAULT_MAX_RETRIES`].
    pub max_retries: u32,
}

impl RequestOptions {
    /// Options for a request with the given method and all defaults.
    pub fn new(method: RequestMethod) -> Self {
        Self {
            method,
            body: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Attach a payload.
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(RequestMethod::Get)
    }
}
