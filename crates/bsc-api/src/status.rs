//! The `status` schema: the server's generic operation reply.

use serde::{Deserialize, Serialize};

/// Reply of state-changing operations (`<status code="...">`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "status")]
pub struct StatusReply {
    /// Machine-readable result code, `"ok"` on success.
    #[serde(rename = "@code")]
    pub code: String,
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
    /// Additional detail, present on some errors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl StatusReply {
    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.code == "ok"
    }

    /// Best-effort decode of a terminal API error body.
    ///
    /// The server answers most failed operations with a `status` document
    /// carrying the real error message; anything else yields `None`.
    pub fn from_error_body(body: &str) -> Option<Self> {
        bsc_codec::XmlCodec::decode(body.as_bytes()).ok()
    }
}
