//! Package and project `_meta` routes.

use serde::{Deserialize, Serialize};

use bsc_client::{Connection, RequestBody, RequestMethod, RequestOptions};

use crate::error::RouteResult;
use crate::status::StatusReply;

/// Metadata of a package.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "package")]
pub struct PackageMeta {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@project", skip_serializing_if = "Option::is_none", default)]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// Metadata of a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "project")]
pub struct ProjectMeta {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// Fetch the metadata of a package.
pub async fn fetch_package_meta(
    con: &Connection,
    project: &str,
    package: &str,
) -> RouteResult<PackageMeta> {
    let route = format!("/source/{project}/{package}/_meta");
    Ok(con.request_xml(&route, &RequestOptions::default()).await?)
}

/// Create or update the metadata of a package.
///
/// Writing the `_meta` of a package that does not exist yet creates it.
pub async fn set_package_meta(
    con: &Connection,
    project: &str,
    package: &str,
    meta: &PackageMeta,
) -> RouteResult<StatusReply> {
    let route = format!("/source/{project}/{package}/_meta");
    let options = RequestOptions::new(RequestMethod::Put).with_body(RequestBody::xml(meta)?);
    Ok(con.request_xml(&route, &options).await?)
}

/// Fetch the metadata of a project.
pub async fn fetch_project_meta(con: &Connection, project: &str) -> RouteResult<ProjectMeta> {
    let route = format!("/source/{project}/_meta");
    Ok(con.request_xml(&route, &RequestOptions::default()).await?)
}

/// Create or update the metadata of a project.
pub async fn set_project_meta(
    con: &Connection,
    meta: &ProjectMeta,
) -> RouteResult<StatusReply> {
    let route = format!("/source/{}/_meta", meta.name);
    let options = RequestOptions::new(RequestMethod::Put).with_body(RequestBody::xml(meta)?);
    Ok(con.request_xml(&route, &options).await?)
}

/// Delete a project and everything in it.
pub async fn delete_project(con: &Connection, project: &str) -> RouteResult<StatusReply> {
    let route = format!("/source/{project}");
    Ok(con
        .request_xml(&route, &RequestOptions::new(RequestMethod::Delete))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsc_codec::XmlCodec;

    #[test]
    fn package_meta_roundtrip() {
        let meta = PackageMeta {
            name: "frobnicator".into(),
            project: None,
            title: Some("The frobnicator".into()),
            description: Some("Frobnicates things.".into()),
        };
        let doc = XmlCodec::encode(&meta).unwrap();
        let text = std::str::from_utf8(&doc).unwrap();
        assert!(text.contains(r#"<package name="frobnicator""#));
        assert!(text.contains("<title>The frobnicator</title>"));

        let decoded: PackageMeta = XmlCodec::decode(&doc).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn project_meta_decodes_server_reply() {
        let doc = br#"<project name="devel:tools">
  <title>Tools</title>
  <description/>
</project>"#;
        let meta: ProjectMeta = XmlCodec::decode(doc).unwrap();
        assert_eq!(meta.name, "devel:tools");
        assert_eq!(meta.title.as_deref(), Some("Tools"));
    }
}
