//! Working-copy transitions: staging additions and deletions, and undoing
//! them.
//!
//! Every operation validates against the package value it was handed
//! before touching the filesystem, persists the updated intent lists, and
//! returns a freshly scanned [`ModifiedPackage`]. A failed validation
//! leaves disk state untouched.

use std::collections::BTreeSet;
use std::fs;
use std::io;

use crate::error::{WorkdirError, WorkdirResult};
use crate::fs::write_with_mtime;
use crate::metadata;
use crate::package::{read_in_modified_package_from_dir, ModifiedPackage};
use crate::state::FileState;

/// Stage deletions and additions for the next commit.
///
/// Fails when a name appears in both lists, when a file to add is not
/// currently [`Untracked`](FileState::Untracked), or when a file to delete
/// has no tracked history. Staging a deletion also removes the workdir
/// copy; the pristine copy in the store stays behind for
/// [`undo_file_deletion`].
pub fn add_and_delete_files_from_package(
    pkg: &ModifiedPackage,
    to_delete: &[String],
    to_add: &[String],
) -> WorkdirResult<ModifiedPackage> {
    for name in to_add {
        if to_delete.contains(name) {
            return Err(WorkdirError::ConflictingIntent(name.clone()));
        }
    }
    for name in to_add {
        if pkg.state_of(name) != Some(FileState::Untracked) {
            return Err(WorkdirError::NotUntracked(name.clone()));
        }
    }
    for name in to_delete {
        match pkg.state_of(name) {
            None | Some(FileState::Untracked) | Some(FileState::ToBeAdded) => {
                return Err(WorkdirError::NotTracked(name.clone()))
            }
            _ => {}
        }
    }

    let (mut added, mut deleted) = intents_of(pkg);
    added.extend(to_add.iter().cloned());
    deleted.extend(to_delete.iter().cloned());

    for name in to_delete {
        tracing::debug!(file = %name, "staging deletion, removing workdir copy");
        match fs::remove_file(pkg.path.join(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    metadata::write_intents(&pkg.path, &added, &deleted)?;
    read_in_modified_package_from_dir(&pkg.path)
}

/// Reverse pending additions.
///
/// Fails when a name's current state is not
/// [`ToBeAdded`](FileState::ToBeAdded); on success the files are plain
/// [`Untracked`](FileState::Untracked) again.
pub fn untrack_files(pkg: &ModifiedPackage, names: &[String]) -> WorkdirResult<ModifiedPackage> {
    for name in names {
        if pkg.state_of(name) != Some(FileState::ToBeAdded) {
            return Err(WorkdirError::CannotUntrack(name.clone()));
        }
    }

    let (mut added, deleted) = intents_of(pkg);
    for name in names {
        added.remove(name);
    }

    metadata::write_intents(&pkg.path, &added, &deleted)?;
    read_in_modified_package_from_dir(&pkg.path)
}

/// Reverse pending deletions and restore missing files.
///
/// Each name must currently be [`ToBeDeleted`](FileState::ToBeDeleted) or
/// [`Missing`](FileState::Missing); its workdir copy is restored from the
/// tracked contents and it is [`Unmodified`](FileState::Unmodified)
/// afterwards. An empty name list returns the input unchanged.
pub fn undo_file_deletion(
    pkg: &ModifiedPackage,
    names: &[String],
) -> WorkdirResult<ModifiedPackage> {
    if names.is_empty() {
        return Ok(pkg.clone());
    }

    for name in names {
        match pkg.state_of(name) {
            Some(FileState::ToBeDeleted) | Some(FileState::Missing) => {}
            _ => return Err(WorkdirError::CannotUndelete(name.clone())),
        }
    }

    for name in names {
        let tracked = pkg
            .tracked_file(name)
            .ok_or_else(|| WorkdirError::MissingContents(name.clone()))?;
        let contents = match &tracked.contents {
            Some(contents) => contents.clone(),
            None => metadata::read_pristine(&pkg.path, name)?
                .ok_or_else(|| WorkdirError::MissingContents(name.clone()))?,
        };
        write_with_mtime(&pkg.path.join(name), &contents, tracked.mtime)?;
    }

    let (added, mut deleted) = intents_of(pkg);
    for name in names {
        deleted.remove(name);
    }

    metadata::write_intents(&pkg.path, &added, &deleted)?;
    read_in_modified_package_from_dir(&pkg.path)
}

/// The intent lists as encoded in the package's derived states.
fn intents_of(pkg: &ModifiedPackage) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut added = BTreeSet::new();
    let mut deleted = BTreeSet::new();
    for file in &pkg.files_in_workdir {
        match file.state {
            FileState::ToBeAdded => {
                added.insert(file.file.name.clone());
            }
            FileState::ToBeDeleted => {
                deleted.insert(file.file.name.clone());
            }
            _ => {}
        }
    }
    (added, deleted)
}
