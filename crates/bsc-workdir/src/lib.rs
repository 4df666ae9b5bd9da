//! The working-copy engine.
//!
//! A working copy mirrors one remote package in a local directory. A hidden
//! `.bsc/` store holds the last-known remote state (identity, revision,
//! tracked file list, pristine file copies) and two persisted intent lists
//! (files to add, files to delete). Everything else, in particular the
//! per-file state, is derived fresh on every scan and never cached, so it
//! cannot go stale.
//!
//! Mutating operations take a [`ModifiedPackage`] by reference and return a
//! new, fully consistent value; nothing is updated in place.

pub mod commit;
pub mod error;
mod fs;
pub mod metadata;
pub mod ops;
pub mod package;
pub mod state;

pub use commit::{check_out_package, commit};
pub use error::{WorkdirError, WorkdirResult};
pub use ops::{add_and_delete_files_from_package, undo_file_deletion, untrack_files};
pub use package::{read_in_modified_package_from_dir, ModifiedPackage};
pub use state::{classify, FileState, WorkdirFile};
