//! The `revisionlist` schema: commit history of a package.

use serde::{Deserialize, Serialize};

use bsc_client::{Connection, RequestOptions};
use bsc_types::{Md5Digest, PackageId};

use crate::error::RouteResult;

/// The full history reply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "revisionlist")]
pub struct RevisionList {
    #[serde(rename = "revision", default, skip_serializing_if = "Vec::is_empty")]
    pub revisions: Vec<Revision>,
}

/// One commit in a package's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "revision")]
pub struct Revision {
    /// Revision number, counting from 1.
    #[serde(rename = "@rev")]
    pub rev: u64,
    /// Version revision, bumped by the interconnect.
    #[serde(rename = "@vrev", skip_serializing_if = "Option::is_none", default)]
    pub vrev: Option<u64>,
    /// Digest identifying this revision.
    pub srcmd5: Md5Digest,
    /// Package version at this revision.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    /// Commit time, seconds since the Unix epoch.
    pub time: u64,
    /// User that created the revision.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<String>,
    /// The commit message.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    /// Request that produced this revision, when there was one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub requestid: Option<u64>,
}

/// Fetch the commit history of a package, oldest revision first.
pub async fn fetch_history(con: &Connection, package: &PackageId) -> RouteResult<Vec<Revision>> {
    let route = format!("/source/{}/{}/_history", package.project, package.name);
    let list: RevisionList = con.request_xml(&route, &RequestOptions::default()).await?;
    Ok(list.revisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsc_codec::XmlCodec;

    const HISTORY: &str = r#"<revisionlist>
  <revision rev="1" vrev="1">
    <srcmd5>d41d8cd98f00b204e9800998ecf8427e</srcmd5>
    <version>unknown</version>
    <time>1543795200</time>
    <user>geeko</user>
    <comment>Initial import</comment>
  </revision>
  <revision rev="2" vrev="2">
    <srcmd5>0cc175b9c0f1b6a831c399e269772661</srcmd5>
    <version>unknown</version>
    <time>1543795321</time>
    <user>geeko</user>
  </revision>
</revisionlist>"#;

    #[test]
    fn decodes_two_revisions() {
        let list: RevisionList = XmlCodec::decode(HISTORY.as_bytes()).unwrap();
        assert_eq!(list.revisions.len(), 2);

        let first = &list.revisions[0];
        assert_eq!(first.rev, 1);
        assert_eq!(first.vrev, Some(1));
        assert_eq!(first.user.as_deref(), Some("geeko"));
        assert_eq!(first.comment.as_deref(), Some("Initial import"));
        assert_eq!(first.time, 1543795200);

        // The second revision has no comment at all.
        assert_eq!(list.revisions[1].comment, None);
    }

    #[test]
    fn empty_history_decodes() {
        let list: RevisionList = XmlCodec::decode(b"<revisionlist/>").unwrap();
        assert!(list.revisions.is_empty());
    }
}
