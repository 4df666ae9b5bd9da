//! The `directory` schema: source listings of a package.
//!
//! A directory reply carries the revision identifiers of the listed state
//! plus one `entry` per file. The same schema doubles as the payload of a
//! commit file list, where only `name` and `md5` are filled in.

use serde::{Deserialize, Serialize};

use bsc_client::{Connection, RequestOptions};
use bsc_types::{Md5Digest, PackageFile, PackageId};

use crate::error::{RouteError, RouteResult};

/// A source directory listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "directory")]
pub struct Directory {
    /// Name of the listed package, when the server includes it.
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Revision number of this listing.
    #[serde(rename = "@rev", skip_serializing_if = "Option::is_none", default)]
    pub rev: Option<String>,
    /// Source digest of this listing; identifies the revision.
    #[serde(rename = "@srcmd5", skip_serializing_if = "Option::is_none", default)]
    pub srcmd5: Option<Md5Digest>,
    /// Entry count, when the server includes it.
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none", default)]
    pub count: Option<u64>,
    /// The listed files.
    #[serde(rename = "entry", default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<DirectoryEntry>,
    /// Source link information, present for linked packages.
    #[serde(rename = "linkinfo", default, skip_serializing_if = "Vec::is_empty")]
    pub link_infos: Vec<LinkInfo>,
    /// Source service state of the last commit.
    #[serde(rename = "serviceinfo", default, skip_serializing_if = "Vec::is_empty")]
    pub service_infos: Vec<ServiceInfo>,
}

/// One file in a directory listing, identified by its name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@md5", skip_serializing_if = "Option::is_none", default)]
    pub md5: Option<Md5Digest>,
    #[serde(rename = "@size", skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,
    #[serde(rename = "@mtime", skip_serializing_if = "Option::is_none", default)]
    pub mtime: Option<u64>,
    #[serde(
        rename = "@originproject",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub origin_project: Option<String>,
    #[serde(rename = "@available", skip_serializing_if = "Option::is_none", default)]
    pub available: Option<bool>,
    #[serde(
        rename = "@recommended",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub recommended: Option<bool>,
}

impl DirectoryEntry {
    /// An entry carrying only name and digest, as used in commit payloads.
    pub fn for_commit(name: impl Into<String>, md5: Md5Digest) -> Self {
        Self {
            name: name.into(),
            md5: Some(md5),
            ..Default::default()
        }
    }
}

/// Information about the source link of a package.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    #[serde(rename = "@project", skip_serializing_if = "Option::is_none", default)]
    pub project: Option<String>,
    #[serde(rename = "@package", skip_serializing_if = "Option::is_none", default)]
    pub package: Option<String>,
    #[serde(rename = "@srcmd5", skip_serializing_if = "Option::is_none", default)]
    pub srcmd5: Option<Md5Digest>,
    #[serde(rename = "@rev", skip_serializing_if = "Option::is_none", default)]
    pub rev: Option<String>,
    #[serde(rename = "@baserev", skip_serializing_if = "Option::is_none", default)]
    pub baserev: Option<String>,
    #[serde(rename = "@xsrcmd5", skip_serializing_if = "Option::is_none", default)]
    pub xsrcmd5: Option<Md5Digest>,
    #[serde(rename = "@lsrcmd5", skip_serializing_if = "Option::is_none", default)]
    pub lsrcmd5: Option<Md5Digest>,
    #[serde(rename = "@error", skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Source service state of the last commit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(rename = "@code", skip_serializing_if = "Option::is_none", default)]
    pub code: Option<String>,
    #[serde(rename = "@error", skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(rename = "@xsrcmd5", skip_serializing_if = "Option::is_none", default)]
    pub xsrcmd5: Option<Md5Digest>,
    #[serde(rename = "@lsrcmd5", skip_serializing_if = "Option::is_none", default)]
    pub lsrcmd5: Option<Md5Digest>,
}

/// Fetch and decode a directory listing from the given route.
pub async fn fetch_directory(con: &Connection, route: &str) -> RouteResult<Directory> {
    Ok(con.request_xml(route, &RequestOptions::default()).await?)
}

/// Build a tracked [`PackageFile`] from a directory entry.
///
/// Fails when the entry lacks one of the fields a tracked file requires;
/// the server omits them only for degenerate listings.
pub fn package_file_from_entry(
    entry: &DirectoryEntry,
    package: &PackageId,
) -> RouteResult<PackageFile> {
    let digest = entry.md5.ok_or(RouteError::MissingField("md5"))?;
    let size = entry.size.ok_or(RouteError::MissingField("size"))?;
    let mtime = entry.mtime.ok_or(RouteError::MissingField("mtime"))?;
    Ok(PackageFile {
        name: entry.name.clone(),
        package: package.clone(),
        digest,
        size,
        mtime,
        contents: None,
    })
}
