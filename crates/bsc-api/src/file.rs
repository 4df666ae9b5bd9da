//! File-level routes: fetch, upload, and delete single package files.

use serde::Deserialize;

use bsc_client::{Connection, RequestBody, RequestMethod, RequestOptions};
use bsc_types::{Md5Digest, PackageFile};

use crate::error::{RouteError, RouteResult};
use crate::status::StatusReply;

/// Options for [`fetch_file_contents`].
#[derive(Clone, Debug)]
pub struct FetchFileOptions {
    /// Whether package links are expanded. Expanded content is what the
    /// build service actually uses, and pure link packages have no other
    /// files at all, so this defaults to `true`.
    pub expand_links: bool,
    /// Fetch at this revision (a revision number or digest) instead of
    /// the latest commit.
    pub revision: Option<String>,
}

impl Default for FetchFileOptions {
    fn default() -> Self {
        Self {
            expand_links: true,
            revision: None,
        }
    }
}

/// Reply of a source file upload: the staged revision.
#[derive(Debug, Deserialize)]
#[serde(rename = "revision")]
struct UploadRevision {
    #[serde(rename = "@rev", default)]
    _rev: Option<String>,
    #[serde(default)]
    srcmd5: Option<Md5Digest>,
}

/// Retrieve the contents of `file` from the server.
pub async fn fetch_file_contents(
    con: &Connection,
    file: &PackageFile,
    options: &FetchFileOptions,
) -> RouteResult<Vec<u8>> {
    let mut route = format!(
        "/source/{}/{}/{}?expand={}",
        file.package.project,
        file.package.name,
        file.name,
        if options.expand_links { 1 } else { 0 }
    );
    if let Some(rev) = &options.revision {
        route.push_str("&rev=");
        route.push_str(rev);
    }
    Ok(con.request(&route, &RequestOptions::default()).await?)
}

/// Upload the contents of `file` to the staging area of its package.
///
/// The contents must be loaded; uploads never read the disk themselves.
/// Returns the digest of the staged state when the server reports one.
pub async fn upload_file_contents(
    con: &Connection,
    file: &PackageFile,
) -> RouteResult<Option<Md5Digest>> {
    let contents = file
        .contents
        .as_ref()
        .ok_or_else(|| RouteError::MissingContents(file.name.clone()))?;

    let route = format!(
        "/source/{}/{}/{}?rev=repository",
        file.package.project, file.package.name, file.name
    );
    tracing::debug!(file = %file.name, size = contents.len(), "uploading file contents");

    let options = RequestOptions::new(RequestMethod::Put)
        .with_body(RequestBody::raw(contents.clone()));
    let reply: UploadRevision = con.request_xml(&route, &options).await?;
    Ok(reply.srcmd5)
}

/// Delete `file` from its package on the server, creating a new revision.
///
/// This creates a standalone deletion commit. To delete a file as part of
/// a larger commit, use the working-copy engine instead.
pub async fn delete_file(con: &Connection, file: &PackageFile) -> RouteResult<StatusReply> {
    let route = format!(
        "/source/{}/{}/{}",
        file.package.project, file.package.name, file.name
    );
    tracing::debug!(file = %file.name, "deleting remote file");
    Ok(con
        .request_xml(&route, &RequestOptions::new(RequestMethod::Delete))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::RawQuery;
    use axum::routing::{delete, get, put};
    use axum::Router;
    use bsc_client::{ConnectionOptions, Credentials};
    use bsc_types::PackageId;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn test_connection(url: &str) -> Connection {
        Connection::new(
            Credentials::basic("geeko", "opensuse"),
            ConnectionOptions {
                url: url.to_string(),
                force_https: false,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn tracked_file(contents: Option<Vec<u8>>) -> PackageFile {
        PackageFile {
            name: "frobnicator.spec".into(),
            package: PackageId::new("devel:tools", "frobnicator"),
            digest: Md5Digest::compute(b"spec"),
            size: 4,
            mtime: 1543795200,
            contents,
        }
    }

    #[tokio::test]
    async fn fetch_passes_expand_and_revision() {
        let query = Arc::new(Mutex::new(String::new()));
        let app = Router::new().route(
            "/source/devel:tools/frobnicator/frobnicator.spec",
            get({
                let query = query.clone();
                move |RawQuery(q): RawQuery| {
                    let query = query.clone();
                    async move {
                        *query.lock().unwrap() = q.unwrap_or_default();
                        "file contents"
                    }
                }
            }),
        );
        let url = serve(app).await;
        let con = test_connection(&url);

        let body = fetch_file_contents(
            &con,
            &tracked_file(None),
            &FetchFileOptions {
                expand_links: false,
                revision: Some("7".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(body, b"file contents");
        assert_eq!(&*query.lock().unwrap(), "expand=0&rev=7");
    }

    #[tokio::test]
    async fn upload_sends_raw_bytes() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().route(
            "/source/devel:tools/frobnicator/frobnicator.spec",
            put({
                let received = received.clone();
                move |body: axum::body::Bytes| {
                    let received = received.clone();
                    async move {
                        *received.lock().unwrap() = body.to_vec();
                        r#"<revision rev="repository"><srcmd5>900150983cd24fb0d6963f7d28e17f72</srcmd5></revision>"#
                    }
                }
            }),
        );
        let url = serve(app).await;
        let con = test_connection(&url);

        let staged = upload_file_contents(&con, &tracked_file(Some(b"spec".to_vec())))
            .await
            .unwrap();

        assert_eq!(&*received.lock().unwrap(), b"spec");
        assert_eq!(
            staged,
            Some(Md5Digest::from_hex("900150983cd24fb0d6963f7d28e17f72").unwrap())
        );
    }

    #[tokio::test]
    async fn upload_without_contents_fails_before_any_request() {
        let con = test_connection("http://127.0.0.1:9/");
        let err = upload_file_contents(&con, &tracked_file(None))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::MissingContents(name) if name == "frobnicator.spec"));
    }

    #[tokio::test]
    async fn delete_reports_status() {
        let app = Router::new().route(
            "/source/devel:tools/frobnicator/frobnicator.spec",
            delete(|| async { r#"<status code="ok"><summary>Ok</summary></status>"# }),
        );
        let url = serve(app).await;
        let con = test_connection(&url);

        let reply = delete_file(&con, &tracked_file(None)).await.unwrap();
        assert!(reply.is_ok());
    }
}
