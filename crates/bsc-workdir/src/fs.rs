//! Filesystem helpers shared by the scan and transition code.

use std::fs::{self, File, FileTimes};
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use bsc_types::{PackageFile, PackageId};

use crate::error::{WorkdirError, WorkdirResult};

/// Build a [`PackageFile`] from a file on disk, contents loaded.
///
/// The remote stores timestamps with one-second precision, so the on-disk
/// mtime is truncated to whole seconds and written back; otherwise every
/// scan after a checkout would disagree with the remote by a sub-second
/// remainder.
pub(crate) fn package_file_from_path(
    path: &Path,
    package: &PackageId,
) -> WorkdirResult<PackageFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| WorkdirError::InvalidPath(path.to_path_buf()))?
        .to_owned();

    let contents = fs::read(path)?;
    let meta = fs::metadata(path)?;
    let mtime = meta
        .modified()?
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    set_mtime(path, mtime)?;

    Ok(PackageFile::from_contents(name, package.clone(), contents, mtime))
}

/// Write `contents` to `path` and pin its mtime to `mtime` seconds.
pub(crate) fn write_with_mtime(path: &Path, contents: &[u8], mtime: u64) -> WorkdirResult<()> {
    fs::write(path, contents)?;
    set_mtime(path, mtime)?;
    Ok(())
}

/// Set the modification time of `path` to whole seconds since the epoch.
pub(crate) fn set_mtime(path: &Path, mtime: u64) -> WorkdirResult<()> {
    let file = File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_modified(UNIX_EPOCH + Duration::from_secs(mtime)))?;
    Ok(())
}
