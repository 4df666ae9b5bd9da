//! Commit finalization: the `commitfilelist` command.

use bsc_client::{Connection, RequestBody, RequestMethod, RequestOptions};
use bsc_types::{Md5Digest, PackageId};

use crate::directory::{Directory, DirectoryEntry};
use crate::error::RouteResult;

/// Finalize a commit by posting the complete post-commit file list.
///
/// `files` names every file the new revision must contain along with its
/// content digest; files staged earlier via uploads are taken from the
/// staging area, everything else from the previous revision. The reply is
/// the directory listing of the new revision, carrying its digest.
pub async fn commit_file_list(
    con: &Connection,
    package: &PackageId,
    files: &[(String, Md5Digest)],
    message: &str,
) -> RouteResult<Directory> {
    let payload = Directory {
        entries: files
            .iter()
            .map(|(name, md5)| DirectoryEntry::for_commit(name.clone(), *md5))
            .collect(),
        ..Default::default()
    };

    let route = format!(
        "/source/{}/{}?cmd=commitfilelist&comment={}",
        package.project,
        package.name,
        urlencoding::encode(message)
    );
    tracing::debug!(package = %package, files = files.len(), "finalizing commit");

    let options = RequestOptions::new(RequestMethod::Post).with_body(RequestBody::xml(&payload)?);
    Ok(con.request_xml(&route, &options).await?)
}
