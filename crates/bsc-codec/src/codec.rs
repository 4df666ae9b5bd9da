use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Codec for encoding/decoding API payloads as XML documents.
pub struct XmlCodec;

impl XmlCodec {
    /// Encode a value into a complete XML document (declaration included).
    ///
    /// The root element name is taken from the value's serde name, so
    /// schema structs carry `#[serde(rename = "...")]` at the type level.
    pub fn encode<T: Serialize>(value: &T) -> CodecResult<Vec<u8>> {
        let body =
            quick_xml::se::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        let mut doc = String::with_capacity(XML_DECL.len() + 1 + body.len());
        doc.push_str(XML_DECL);
        doc.push('\n');
        doc.push_str(&body);
        Ok(doc.into_bytes())
    }

    /// Decode a wire payload into a value.
    pub fn decode<T: DeserializeOwned>(data: &[u8]) -> CodecResult<T> {
        let text = std::str::from_utf8(data).map_err(|e| CodecError::Utf8(e.to_string()))?;
        quick_xml::de::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename = "status")]
    struct Status {
        #[serde(rename = "@code")]
        code: String,
        summary: Option<String>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename = "listing")]
    struct Listing {
        #[serde(rename = "@rev")]
        rev: Option<String>,
        #[serde(rename = "entry", default)]
        entries: Vec<Entry>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        #[serde(rename = "@name")]
        name: String,
    }

    #[test]
    fn encode_prepends_declaration() {
        let doc = XmlCodec::encode(&Status {
            code: "ok".into(),
            summary: None,
        })
        .unwrap();
        let text = String::from_utf8(doc).unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(text.contains(r#"<status code="ok""#));
    }

    #[test]
    fn decode_reads_attributes_and_children() {
        let doc = br#"<?xml version="1.0" encoding="UTF-8"?>
<status code="unknown"><summary>no such package</summary></status>"#;
        let status: Status = XmlCodec::decode(doc).unwrap();
        assert_eq!(status.code, "unknown");
        assert_eq!(status.summary.as_deref(), Some("no such package"));
    }

    #[test]
    fn roundtrip_with_repeated_children() {
        let listing = Listing {
            rev: Some("7".into()),
            entries: vec![
                Entry { name: "a.spec".into() },
                Entry {
                    name: "a.changes".into(),
                },
            ],
        };
        let doc = XmlCodec::encode(&listing).unwrap();
        let decoded: Listing = XmlCodec::decode(&doc).unwrap();
        assert_eq!(decoded, listing);
    }

    #[test]
    fn decode_missing_repeated_children_defaults_empty() {
        let doc = br#"<listing rev="1"></listing>"#;
        let listing: Listing = XmlCodec::decode(doc).unwrap();
        assert!(listing.entries.is_empty());
    }

    #[test]
    fn decode_rejects_non_utf8() {
        let err = XmlCodec::decode::<Status>(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::Utf8(_)));
    }

    #[test]
    fn decode_rejects_malformed_xml() {
        let err = XmlCodec::decode::<Status>(b"<status code=").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
