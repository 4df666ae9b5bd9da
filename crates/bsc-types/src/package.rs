use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::Md5Digest;

/// Owning identity of a package: the project it lives in plus its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId {
    /// Name of the owning project.
    pub project: String,
    /// Name of the package inside the project.
    pub name: String,
}

impl PackageId {
    /// Create a new package identity.
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.name)
    }
}

/// A file as last known to be committed remotely.
///
/// The remote stores modification times with one-second precision, so
/// `mtime` is whole seconds since the Unix epoch; local timestamps must be
/// truncated before comparison or spurious diffs appear on every scan.
///
/// This is an immutable value: operations that change a file produce a new
/// `PackageFile` rather than mutating in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    /// File name (flat namespace, no directories).
    pub name: String,
    /// The package this file belongs to.
    pub package: PackageId,
    /// Digest of the file contents.
    pub digest: Md5Digest,
    /// Size in bytes.
    pub size: u64,
    /// Modification time, whole seconds since the Unix epoch.
    pub mtime: u64,
    /// Cached contents, when they have been read or fetched.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contents: Option<Vec<u8>>,
}

impl PackageFile {
    /// Create a tracked file from in-memory contents.
    pub fn from_contents(
        name: impl Into<String>,
        package: PackageId,
        contents: Vec<u8>,
        mtime: u64,
    ) -> Self {
        let digest = Md5Digest::compute(&contents);
        let size = contents.len() as u64;
        Self {
            name: name.into(),
            package,
            digest,
            size,
            mtime,
            contents: Some(contents),
        }
    }

    /// A copy of this file without the cached contents.
    pub fn without_contents(&self) -> Self {
        Self {
            contents: None,
            ..self.clone()
        }
    }

    /// A copy of this file with the given cached contents.
    ///
    /// Digest and size are recomputed so the value stays consistent.
    pub fn with_contents(&self, contents: Vec<u8>) -> Self {
        let digest = Md5Digest::compute(&contents);
        let size = contents.len() as u64;
        Self {
            digest,
            size,
            contents: Some(contents),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg() -> PackageId {
        PackageId::new("devel:tools", "frobnicator")
    }

    #[test]
    fn package_id_display() {
        assert_eq!(pkg().to_string(), "devel:tools/frobnicator");
    }

    #[test]
    fn from_contents_computes_digest_and_size() {
        let f = PackageFile::from_contents("a.spec", pkg(), b"contents".to_vec(), 1_500_000_000);
        assert_eq!(f.digest, Md5Digest::compute(b"contents"));
        assert_eq!(f.size, 8);
        assert_eq!(f.contents.as_deref(), Some(b"contents".as_slice()));
    }

    #[test]
    fn without_contents_drops_cache_only() {
        let f = PackageFile::from_contents("a.spec", pkg(), b"contents".to_vec(), 0);
        let stripped = f.without_contents();
        assert!(stripped.contents.is_none());
        assert_eq!(stripped.digest, f.digest);
        assert_eq!(stripped.size, f.size);
    }

    #[test]
    fn with_contents_recomputes() {
        let f = PackageFile::from_contents("a.spec", pkg(), b"old".to_vec(), 0);
        let updated = f.with_contents(b"brand new".to_vec());
        assert_eq!(updated.digest, Md5Digest::compute(b"brand new"));
        assert_eq!(updated.size, 9);
        assert_eq!(updated.name, "a.spec");
    }
}
