//! The hidden `.bsc/` store of a working copy.
//!
//! Layout inside `{workdir}/.bsc/`:
//!
//! - `_project`, `_package`, `_apiurl` — owning identity, one value per
//!   file, newline-terminated
//! - `_files` — the last-known remote state as a `directory` document
//!   (revision digest plus name/md5/size/mtime per file)
//! - `_to_be_added`, `_to_be_deleted` — intent lists, one name per line;
//!   an empty list is expressed by the marker file being absent
//! - one pristine copy per tracked file, under its own name
//!
//! The intent markers are the only persisted workdir state; everything
//! else a scan derives is recomputed from this store and the directory
//! contents.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bsc_api::{package_file_from_entry, Directory, DirectoryEntry};
use bsc_codec::XmlCodec;
use bsc_types::{Md5Digest, PackageFile, PackageId};

use crate::error::{WorkdirError, WorkdirResult};

/// Name of the hidden store directory.
pub const STORE_DIR: &str = ".bsc";

const FILE_LIST: &str = "_files";
const PROJECT: &str = "_project";
const PACKAGE: &str = "_package";
const API_URL: &str = "_apiurl";
const TO_BE_ADDED: &str = "_to_be_added";
const TO_BE_DELETED: &str = "_to_be_deleted";

/// The persisted last-known remote state of a working copy.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredState {
    pub package: PackageId,
    pub api_url: String,
    pub rev_digest: Md5Digest,
    /// Tracked files; contents are loaded from the pristine copies.
    pub files: Vec<PackageFile>,
}

/// Read the complete store of the working copy at `dir`.
pub fn read_state(dir: &Path) -> WorkdirResult<StoredState> {
    let project = read_meta_file(dir, PROJECT)?;
    let name = read_meta_file(dir, PACKAGE)?;
    let api_url = read_meta_file(dir, API_URL)?;
    let package = PackageId::new(project, name);

    let list_path = dir.join(STORE_DIR).join(FILE_LIST);
    let raw = match fs::read(&list_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(WorkdirError::NotAWorkingCopy {
                path: dir.to_path_buf(),
                what: FILE_LIST,
            })
        }
        Err(e) => return Err(e.into()),
    };
    let listing: Directory = XmlCodec::decode(&raw)?;
    let rev_digest = listing.srcmd5.ok_or(WorkdirError::MissingRevision)?;

    let mut files = Vec::with_capacity(listing.entries.len());
    for entry in &listing.entries {
        let mut file = package_file_from_entry(entry, &package)?;
        match fs::read(dir.join(STORE_DIR).join(&file.name)) {
            Ok(contents) => file.contents = Some(contents),
            // A lost pristine copy only hurts restores, not scans.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        files.push(file);
    }

    Ok(StoredState {
        package,
        api_url,
        rev_digest,
        files,
    })
}

/// Write the complete store of the working copy at `dir`.
///
/// Pristine copies of files that are no longer tracked are removed; the
/// intent markers are left untouched.
pub fn write_state(dir: &Path, state: &StoredState) -> WorkdirResult<()> {
    let store = dir.join(STORE_DIR);
    fs::create_dir_all(&store)?;

    fs::write(store.join(PROJECT), format!("{}\n", state.package.project))?;
    fs::write(store.join(PACKAGE), format!("{}\n", state.package.name))?;
    fs::write(store.join(API_URL), format!("{}\n", state.api_url))?;

    let listing = directory_from_files(state.rev_digest, &state.files);
    fs::write(store.join(FILE_LIST), XmlCodec::encode(&listing)?)?;

    for file in &state.files {
        if let Some(contents) = &file.contents {
            fs::write(store.join(&file.name), contents)?;
        }
    }

    let keep: BTreeSet<&str> = state
        .files
        .iter()
        .map(|f| f.name.as_str())
        .chain([
            FILE_LIST,
            PROJECT,
            PACKAGE,
            API_URL,
            TO_BE_ADDED,
            TO_BE_DELETED,
        ])
        .collect();
    for entry in fs::read_dir(&store)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !keep.contains(name) {
            fs::remove_file(entry.path())?;
        }
    }

    Ok(())
}

/// Build the `_files` document from a revision digest and tracked files.
pub fn directory_from_files(rev_digest: Md5Digest, files: &[PackageFile]) -> Directory {
    Directory {
        srcmd5: Some(rev_digest),
        entries: files
            .iter()
            .map(|f| DirectoryEntry {
                name: f.name.clone(),
                md5: Some(f.digest),
                size: Some(f.size),
                mtime: Some(f.mtime),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

/// Read both intent lists. An absent marker file is an empty set.
pub fn read_intents(dir: &Path) -> WorkdirResult<(BTreeSet<String>, BTreeSet<String>)> {
    Ok((
        read_intent_list(dir, TO_BE_ADDED)?,
        read_intent_list(dir, TO_BE_DELETED)?,
    ))
}

/// Persist both intent lists. An empty set deletes its marker file.
pub fn write_intents(
    dir: &Path,
    to_be_added: &BTreeSet<String>,
    to_be_deleted: &BTreeSet<String>,
) -> WorkdirResult<()> {
    write_intent_list(dir, TO_BE_ADDED, to_be_added)?;
    write_intent_list(dir, TO_BE_DELETED, to_be_deleted)
}

/// Read the pristine copy of a tracked file, when the store has one.
pub fn read_pristine(dir: &Path, name: &str) -> WorkdirResult<Option<Vec<u8>>> {
    match fs::read(dir.join(STORE_DIR).join(name)) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_meta_file(dir: &Path, what: &'static str) -> WorkdirResult<String> {
    match fs::read_to_string(dir.join(STORE_DIR).join(what)) {
        Ok(s) => Ok(s.trim_end().to_owned()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(WorkdirError::NotAWorkingCopy {
            path: dir.to_path_buf(),
            what,
        }),
        Err(e) => Err(e.into()),
    }
}

fn read_intent_list(dir: &Path, marker: &str) -> WorkdirResult<BTreeSet<String>> {
    match fs::read_to_string(dir.join(STORE_DIR).join(marker)) {
        Ok(s) => Ok(s
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeSet::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_intent_list(dir: &Path, marker: &str, names: &BTreeSet<String>) -> WorkdirResult<()> {
    let store = dir.join(STORE_DIR);
    let path = store.join(marker);
    if names.is_empty() {
        return match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        };
    }
    fs::create_dir_all(&store)?;
    let mut body = names.iter().cloned().collect::<Vec<_>>().join("\n");
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}
