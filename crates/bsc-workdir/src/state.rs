//! Per-file working-copy states and their classification.
//!
//! State is a pure function of four inputs: the tracked file list, the
//! on-disk listing, and the two persisted intent lists. It is recomputed on
//! every scan and never stored, so it cannot drift from reality.

use std::fmt;

use bsc_types::{Md5Digest, PackageFile};

/// The state of one file in the working copy.
///
/// Exactly one state holds per file name at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileState {
    /// Tracked, present on disk, contents equal to the tracked digest.
    Unmodified,
    /// Tracked, present on disk, contents differ from the tracked digest.
    Modified,
    /// Present on disk but unknown to the remote.
    Untracked,
    /// Scheduled for addition on the next commit.
    ToBeAdded,
    /// Scheduled for deletion on the next commit.
    ToBeDeleted,
    /// Tracked but absent from disk, without a deletion intent.
    Missing,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unmodified => "unmodified",
            Self::Modified => "modified",
            Self::Untracked => "untracked",
            Self::ToBeAdded => "to be added",
            Self::ToBeDeleted => "to be deleted",
            Self::Missing => "missing",
        };
        write!(f, "{name}")
    }
}

/// A file in the working copy: tracked-file metadata plus its derived state.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkdirFile {
    pub file: PackageFile,
    pub state: FileState,
}

/// Classify one file name from the four scan inputs.
///
/// Precedence: a deletion intent wins over everything (even a file still
/// physically present), then an addition intent, then tracked-but-absent,
/// then present-but-untracked; for a file that is both tracked and present
/// the digests decide. Returns `None` only when the name appears in no
/// input at all.
pub fn classify(
    tracked: Option<&Md5Digest>,
    on_disk: Option<&Md5Digest>,
    to_be_added: bool,
    to_be_deleted: bool,
) -> Option<FileState> {
    if to_be_deleted {
        return Some(FileState::ToBeDeleted);
    }
    if to_be_added {
        return Some(FileState::ToBeAdded);
    }
    match (tracked, on_disk) {
        (Some(_), None) => Some(FileState::Missing),
        (None, Some(_)) => Some(FileState::Untracked),
        (Some(tracked), Some(on_disk)) => Some(if tracked == on_disk {
            FileState::Unmodified
        } else {
            FileState::Modified
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(data: &[u8]) -> Md5Digest {
        Md5Digest::compute(data)
    }

    #[test]
    fn equal_digests_are_unmodified() {
        let digest = d(b"foo");
        assert_eq!(
            classify(Some(&digest), Some(&digest), false, false),
            Some(FileState::Unmodified)
        );
    }

    #[test]
    fn differing_digests_are_modified() {
        assert_eq!(
            classify(Some(&d(b"foo")), Some(&d(b"changed")), false, false),
            Some(FileState::Modified)
        );
    }

    #[test]
    fn tracked_but_absent_is_missing() {
        assert_eq!(
            classify(Some(&d(b"foo")), None, false, false),
            Some(FileState::Missing)
        );
    }

    #[test]
    fn present_but_untracked_is_untracked() {
        assert_eq!(
            classify(None, Some(&d(b"bar")), false, false),
            Some(FileState::Untracked)
        );
    }

    #[test]
    fn deletion_intent_wins_over_everything() {
        let digest = d(b"foo");
        // Even a file that still physically exists on disk.
        assert_eq!(
            classify(Some(&digest), Some(&digest), false, true),
            Some(FileState::ToBeDeleted)
        );
        assert_eq!(
            classify(Some(&digest), None, false, true),
            Some(FileState::ToBeDeleted)
        );
    }

    #[test]
    fn addition_intent_wins_below_deletion() {
        assert_eq!(
            classify(None, Some(&d(b"new")), true, false),
            Some(FileState::ToBeAdded)
        );
        assert_eq!(
            classify(None, Some(&d(b"new")), true, true),
            Some(FileState::ToBeDeleted)
        );
    }

    #[test]
    fn unknown_name_has_no_state() {
        assert_eq!(classify(None, None, false, false), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(FileState::ToBeAdded.to_string(), "to be added");
        assert_eq!(FileState::Missing.to_string(), "missing");
    }
}
