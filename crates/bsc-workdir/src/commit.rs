//! Commit orchestration and package checkout.
//!
//! A commit is deliberately not transactional: uploads and remote deletes
//! happen one by one, then a trailing file-list post finalizes the new
//! revision. When a step fails partway, remote changes already applied are
//! not rolled back and the local intent markers stay untouched; the caller
//! re-scans and re-runs the commit after fixing the cause.

use std::fs;
use std::path::Path;

use bsc_api::{
    commit_file_list, delete_file, fetch_directory, fetch_file_contents, package_file_from_entry,
    upload_file_contents, FetchFileOptions,
};
use bsc_client::Connection;
use bsc_types::{Md5Digest, PackageFile, PackageId};

use crate::error::{WorkdirError, WorkdirResult};
use crate::fs::{package_file_from_path, write_with_mtime};
use crate::metadata::{self, StoredState};
use crate::package::{read_in_modified_package_from_dir, ModifiedPackage};
use crate::state::FileState;

/// Commit the staged changes of `pkg` as a new remote revision.
///
/// Uploads the current on-disk bytes of every file that is to be added or
/// modified, issues a remote delete for every file staged for deletion,
/// and finalizes with the complete post-commit file list. On success the
/// store is advanced to the new revision, the intent markers are removed,
/// and the returned package is what a fresh scan of the directory yields.
pub async fn commit(
    con: &Connection,
    pkg: &ModifiedPackage,
    message: &str,
) -> WorkdirResult<ModifiedPackage> {
    let mut new_files: Vec<PackageFile> = Vec::new();

    for workdir_file in &pkg.files_in_workdir {
        let name = &workdir_file.file.name;
        match workdir_file.state {
            FileState::ToBeAdded | FileState::Modified => {
                // Upload what is on disk right now, not what the scan saw.
                let file = package_file_from_path(&pkg.path.join(name), &pkg.package)?;
                tracing::info!(file = %name, size = file.size, "uploading file");
                upload_file_contents(con, &file).await?;
                new_files.push(file);
            }
            FileState::Unmodified | FileState::Missing => {
                new_files.push(workdir_file.file.clone());
            }
            FileState::ToBeDeleted => {
                tracing::info!(file = %name, "deleting remote file");
                delete_file(con, &workdir_file.file).await?;
            }
            FileState::Untracked => {}
        }
    }

    let file_list: Vec<(String, Md5Digest)> = new_files
        .iter()
        .map(|f| (f.name.clone(), f.digest))
        .collect();
    let reply = commit_file_list(con, &pkg.package, &file_list, message).await?;
    let rev_digest = reply.srcmd5.ok_or(WorkdirError::MissingRevision)?;
    tracing::info!(package = %pkg.package, revision = %rev_digest, "commit finalized");

    // The reply listing is authoritative for post-commit metadata; the
    // contents are the ones just uploaded or already held.
    let mut stored_files = Vec::with_capacity(reply.entries.len());
    for entry in &reply.entries {
        let mut file = package_file_from_entry(entry, &pkg.package)?;
        file.contents = new_files
            .iter()
            .find(|f| f.name == file.name)
            .and_then(|f| f.contents.clone());
        stored_files.push(file);
    }

    metadata::write_state(
        &pkg.path,
        &StoredState {
            package: pkg.package.clone(),
            api_url: pkg.api_url.clone(),
            rev_digest,
            files: stored_files,
        },
    )?;
    metadata::write_intents(&pkg.path, &Default::default(), &Default::default())?;

    read_in_modified_package_from_dir(&pkg.path)
}

/// Check out `package` into `path`, creating a fresh working copy.
pub async fn check_out_package(
    con: &Connection,
    package: &PackageId,
    path: impl AsRef<Path>,
) -> WorkdirResult<ModifiedPackage> {
    let path = path.as_ref();
    let route = format!("/source/{}/{}", package.project, package.name);
    let listing = fetch_directory(con, &route).await?;
    let rev_digest = listing.srcmd5.ok_or(WorkdirError::MissingRevision)?;

    fs::create_dir_all(path)?;
    let mut files = Vec::with_capacity(listing.entries.len());
    for entry in &listing.entries {
        let mut file = package_file_from_entry(entry, package)?;
        tracing::info!(file = %file.name, "fetching file");
        let contents = fetch_file_contents(con, &file, &FetchFileOptions::default()).await?;
        write_with_mtime(&path.join(&file.name), &contents, file.mtime)?;
        file.contents = Some(contents);
        files.push(file);
    }

    metadata::write_state(
        path,
        &StoredState {
            package: package.clone(),
            api_url: con.base_url().to_string(),
            rev_digest,
            files,
        },
    )?;

    read_in_modified_package_from_dir(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path as AxPath, RawQuery};
    use axum::routing::get;
    use axum::Router;
    use bsc_api::{Directory, DirectoryEntry};
    use bsc_client::{ConnectionOptions, Credentials};
    use bsc_codec::XmlCodec;

    use crate::ops::add_and_delete_files_from_package;

    const SPEC: &str = "frobnicator.spec";
    const SPEC_CONTENTS: &[u8] = b"Name: frobnicator";
    const CHANGES: &str = "frobnicator.changes";

    /// What the scripted remote has seen so far.
    #[derive(Default)]
    struct Remote {
        uploads: Vec<(String, Vec<u8>)>,
        deletes: Vec<String>,
        commit_queries: Vec<String>,
        commit_bodies: Vec<String>,
    }

    fn entry(name: &str, contents: &[u8], mtime: u64) -> DirectoryEntry {
        DirectoryEntry {
            name: name.into(),
            md5: Some(Md5Digest::compute(contents)),
            size: Some(contents.len() as u64),
            mtime: Some(mtime),
            ..Default::default()
        }
    }

    fn listing(rev: &str, srcmd5_seed: &[u8], entries: Vec<DirectoryEntry>) -> String {
        let dir = Directory {
            rev: Some(rev.into()),
            srcmd5: Some(Md5Digest::compute(srcmd5_seed)),
            entries,
            ..Default::default()
        };
        String::from_utf8(XmlCodec::encode(&dir).unwrap()).unwrap()
    }

    /// A scripted remote package: serves one tracked file, accepts
    /// uploads/deletes, and answers each commit with the file list it is
    /// scripted to contain afterwards.
    async fn scripted_remote(remote: Arc<Mutex<Remote>>) -> String {
        let upload_changes: Vec<u8> = b"- Fix everything".to_vec();

        let commitfilelist = {
            let remote = remote.clone();
            move |RawQuery(query): RawQuery, body: axum::body::Bytes| {
                let remote = remote.clone();
                let upload_changes = upload_changes.clone();
                async move {
                    let mut remote = remote.lock().unwrap();
                    remote.commit_queries.push(query.unwrap_or_default());
                    remote
                        .commit_bodies
                        .push(String::from_utf8(body.to_vec()).unwrap());
                    match remote.commit_queries.len() {
                        // First commit: spec + changes.
                        1 => listing(
                            "2",
                            b"rev-2",
                            vec![
                                entry(SPEC, SPEC_CONTENTS, 1_543_795_200),
                                entry(CHANGES, &upload_changes, 1_543_795_300),
                            ],
                        ),
                        // Second commit: the spec has been deleted.
                        _ => listing(
                            "3",
                            b"rev-3",
                            vec![entry(CHANGES, &upload_changes, 1_543_795_300)],
                        ),
                    }
                }
            }
        };

        let app = Router::new()
            .route(
                "/source/:project/:package",
                get(|| async {
                    listing("1", b"rev-1", vec![entry(SPEC, SPEC_CONTENTS, 1_543_795_200)])
                })
                .post(commitfilelist),
            )
            .route(
                "/source/:project/:package/:file",
                get(|| async { SPEC_CONTENTS.to_vec() })
                    .put({
                        let remote = remote.clone();
                        move |AxPath((_, _, file)): AxPath<(String, String, String)>,
                              body: axum::body::Bytes| {
                            let remote = remote.clone();
                            async move {
                                remote.lock().unwrap().uploads.push((file, body.to_vec()));
                                r#"<revision rev="repository"><srcmd5>d41d8cd98f00b204e9800998ecf8427e</srcmd5></revision>"#
                            }
                        }
                    })
                    .delete({
                        let remote = remote.clone();
                        move |AxPath((_, _, file)): AxPath<(String, String, String)>| {
                            let remote = remote.clone();
                            async move {
                                remote.lock().unwrap().deletes.push(file);
                                r#"<status code="ok"/>"#
                            }
                        }
                    }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn connection(url: &str) -> Connection {
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

    #[tokio::test]
    async fn checkout_add_commit_delete_roundtrip() {
        let remote = Arc::new(Mutex::new(Remote::default()));
        let url = scripted_remote(remote.clone()).await;
        let con = connection(&url);
        let package = PackageId::new("devel:tools", "frobnicator");
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("frobnicator");

        // Checkout produces a clean working copy.
        let pkg = check_out_package(&con, &package, &workdir).await.unwrap();
        assert!(pkg.is_clean());
        assert_eq!(pkg.files.len(), 1);
        assert_eq!(fs::read(workdir.join(SPEC)).unwrap(), SPEC_CONTENTS);
        assert_eq!(pkg.rev_digest, Md5Digest::compute(b"rev-1"));

        // A new file starts untracked, gets staged, then committed.
        fs::write(workdir.join(CHANGES), b"- Fix everything").unwrap();
        let pkg = read_in_modified_package_from_dir(&workdir).unwrap();
        assert_eq!(pkg.state_of(CHANGES), Some(FileState::Untracked));

        let pkg =
            add_and_delete_files_from_package(&pkg, &[], &[CHANGES.to_string()]).unwrap();
        assert_eq!(pkg.state_of(CHANGES), Some(FileState::ToBeAdded));

        let pkg = commit(&con, &pkg, "Add the changes file").await.unwrap();
        assert_eq!(pkg.state_of(CHANGES), Some(FileState::Unmodified));
        assert_eq!(pkg.state_of(SPEC), Some(FileState::Unmodified));
        assert_eq!(pkg.rev_digest, Md5Digest::compute(b"rev-2"));
        assert!(pkg.is_clean());

        {
            let remote = remote.lock().unwrap();
            assert_eq!(
                remote.uploads,
                vec![(CHANGES.to_string(), b"- Fix everything".to_vec())]
            );
            assert!(remote.commit_queries[0].starts_with("cmd=commitfilelist&comment="));
            assert!(remote.commit_bodies[0].contains(SPEC));
            assert!(remote.commit_bodies[0].contains(CHANGES));
        }

        // The intent markers are gone and a re-scan is deep-equal.
        let rescanned = read_in_modified_package_from_dir(&workdir).unwrap();
        assert_eq!(rescanned, pkg);

        // Now delete the spec file in a second commit.
        let pkg =
            add_and_delete_files_from_package(&pkg, &[SPEC.to_string()], &[]).unwrap();
        assert_eq!(pkg.state_of(SPEC), Some(FileState::ToBeDeleted));

        let pkg = commit(&con, &pkg, "Drop the spec").await.unwrap();
        assert_eq!(pkg.state_of(SPEC), None);
        assert_eq!(pkg.files.len(), 1);
        assert_eq!(pkg.rev_digest, Md5Digest::compute(b"rev-3"));

        {
            let remote = remote.lock().unwrap();
            assert_eq!(remote.deletes, vec![SPEC.to_string()]);
            assert!(!remote.commit_bodies[1].contains(SPEC));
        }

        // Deleted file is gone from the store as well, and a re-scan still
        // agrees with what commit returned.
        assert!(!workdir.join(".bsc").join(SPEC).exists());
        let rescanned = read_in_modified_package_from_dir(&workdir).unwrap();
        assert_eq!(rescanned, pkg);
    }

    #[tokio::test]
    async fn modified_files_are_uploaded_on_commit() {
        let remote = Arc::new(Mutex::new(Remote::default()));
        let url = scripted_remote(remote.clone()).await;
        let con = connection(&url);
        let package = PackageId::new("devel:tools", "frobnicator");
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("frobnicator");

        check_out_package(&con, &package, &workdir).await.unwrap();
        fs::write(workdir.join(SPEC), b"Name: frobnicator\nVersion: 2").unwrap();

        let pkg = read_in_modified_package_from_dir(&workdir).unwrap();
        assert_eq!(pkg.state_of(SPEC), Some(FileState::Modified));

        // The scripted first-commit reply lists the original spec
        // contents; only the upload record matters here.
        let _ = commit(&con, &pkg, "Bump to version 2").await.unwrap();
        let remote = remote.lock().unwrap();
        assert_eq!(remote.uploads.len(), 1);
        assert_eq!(remote.uploads[0].0, SPEC);
        assert_eq!(remote.uploads[0].1, b"Name: frobnicator\nVersion: 2");
        assert!(remote.deletes.is_empty());
    }
}
