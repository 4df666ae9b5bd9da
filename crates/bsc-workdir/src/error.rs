use std::path::PathBuf;

use thiserror::Error;

/// Errors from the working-copy engine.
#[derive(Debug, Error)]
pub enum WorkdirError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `.bsc` store could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] bsc_codec::CodecError),

    /// A remote call failed.
    #[error(transparent)]
    Route(#[from] bsc_api::RouteError),

    /// The directory is not a working copy (a `.bsc` store file is missing).
    #[error("{path} is not a working copy: missing {what}")]
    NotAWorkingCopy { path: PathBuf, what: &'static str },

    /// A path inside the working copy has a name the engine cannot track.
    #[error("invalid path in working copy: {0}")]
    InvalidPath(PathBuf),

    /// The same name was requested for addition and deletion.
    #[error("cannot add and remove the file {0} at the same time")]
    ConflictingIntent(String),

    /// A file requested for addition is not currently untracked.
    #[error("cannot add file {0}: it is not untracked")]
    NotUntracked(String),

    /// A file requested for deletion has no tracked history.
    #[error("cannot remove file {0}: it is not tracked")]
    NotTracked(String),

    /// A file requested for untracking is not pending addition.
    #[error("cannot untrack {0}: it is not to be added")]
    CannotUntrack(String),

    /// A file requested for undeletion is neither pending deletion nor
    /// missing.
    #[error("cannot undelete {0}: it is neither to be deleted nor missing")]
    CannotUndelete(String),

    /// The server reply did not carry the revision digest the engine needs.
    #[error("server reply carries no revision digest")]
    MissingRevision,

    /// A tracked file's contents are available neither in memory nor in
    /// the pristine store.
    #[error("contents of {0} are not available for restore")]
    MissingContents(String),
}

/// Convenience alias for engine results.
pub type WorkdirResult<T> = Result<T, WorkdirError>;
