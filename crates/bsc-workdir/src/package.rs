//! The working copy as a value: [`ModifiedPackage`] and the directory scan
//! that constructs it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use bsc_types::{Md5Digest, PackageFile, PackageId};

use crate::error::{WorkdirError, WorkdirResult};
use crate::fs::package_file_from_path;
use crate::metadata;
use crate::state::{classify, FileState, WorkdirFile};

/// A working copy of one remote package.
///
/// `files` is the last-known remote state; `files_in_workdir` is the live
/// view, covering every name that appears in the tracked list, on disk, or
/// in either intent list, each exactly once, with its derived state.
///
/// This is an immutable value: every transition
/// ([`add_and_delete_files_from_package`], [`untrack_files`],
/// [`undo_file_deletion`], [`commit`]) returns a new, fully consistent
/// `ModifiedPackage` instead of mutating the input.
///
/// [`add_and_delete_files_from_package`]: crate::add_and_delete_files_from_package
/// [`untrack_files`]: crate::untrack_files
/// [`undo_file_deletion`]: crate::undo_file_deletion
/// [`commit`]: crate::commit
#[derive(Clone, Debug, PartialEq)]
pub struct ModifiedPackage {
    /// The remote package this directory mirrors.
    pub package: PackageId,
    /// API endpoint the package was checked out from.
    pub api_url: String,
    /// Digest of the last-known remote revision.
    pub rev_digest: Md5Digest,
    /// The working-copy directory.
    pub path: PathBuf,
    /// Files as of the last-known remote revision.
    pub files: Vec<PackageFile>,
    /// Live per-file view of the directory.
    pub files_in_workdir: Vec<WorkdirFile>,
}

impl ModifiedPackage {
    /// The current state of `name`, when it appears in the workdir view.
    pub fn state_of(&self, name: &str) -> Option<FileState> {
        self.files_in_workdir
            .iter()
            .find(|f| f.file.name == name)
            .map(|f| f.state)
    }

    /// The workdir entry for `name`.
    pub fn workdir_file(&self, name: &str) -> Option<&WorkdirFile> {
        self.files_in_workdir.iter().find(|f| f.file.name == name)
    }

    /// The tracked entry for `name`.
    pub fn tracked_file(&self, name: &str) -> Option<&PackageFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Returns `true` when nothing diverges from the remote state.
    pub fn is_clean(&self) -> bool {
        self.files_in_workdir
            .iter()
            .all(|f| f.state == FileState::Unmodified)
    }
}

/// Construct a [`ModifiedPackage`] by scanning a checked-out directory.
///
/// Reads the `.bsc/` store and the intent markers, lists the directory
/// (flat; the store itself and subdirectories are ignored), and classifies
/// every name. The scan reads file contents to compare digests, so the
/// returned value never needs the network.
pub fn read_in_modified_package_from_dir(
    path: impl AsRef<Path>,
) -> WorkdirResult<ModifiedPackage> {
    let path = path.as_ref();
    let stored = metadata::read_state(path)?;
    let (to_be_added, to_be_deleted) = metadata::read_intents(path)?;

    let mut on_disk: BTreeMap<String, PackageFile> = BTreeMap::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file = package_file_from_path(&entry.path(), &stored.package)?;
        on_disk.insert(file.name.clone(), file);
    }

    let tracked: BTreeMap<&str, &PackageFile> = stored
        .files
        .iter()
        .map(|f| (f.name.as_str(), f))
        .collect();

    let mut names: BTreeSet<&str> = tracked.keys().copied().collect();
    names.extend(on_disk.keys().map(String::as_str));
    names.extend(to_be_added.iter().map(String::as_str));
    names.extend(to_be_deleted.iter().map(String::as_str));

    let mut files_in_workdir = Vec::with_capacity(names.len());
    for name in names {
        let tracked_entry = tracked.get(name).copied();
        let disk_entry = on_disk.get(name);
        let Some(state) = classify(
            tracked_entry.map(|f| &f.digest),
            disk_entry.map(|f| &f.digest),
            to_be_added.contains(name),
            to_be_deleted.contains(name),
        ) else {
            continue;
        };

        // Tracked-side states describe the last-known remote file; the
        // others describe what is actually on disk right now.
        let file = match state {
            FileState::Unmodified | FileState::Missing | FileState::ToBeDeleted => tracked_entry,
            FileState::Modified | FileState::Untracked | FileState::ToBeAdded => disk_entry,
        }
        .or(disk_entry)
        .or(tracked_entry)
        .ok_or_else(|| WorkdirError::InvalidPath(path.join(name)))?
        .clone();

        files_in_workdir.push(WorkdirFile { file, state });
    }

    Ok(ModifiedPackage {
        package: stored.package,
        api_url: stored.api_url,
        rev_digest: stored.rev_digest,
        path: path.to_path_buf(),
        files: stored.files,
        files_in_workdir,
    })
}
