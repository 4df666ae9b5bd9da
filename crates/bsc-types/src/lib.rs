//! Foundation types for the build service client.
//!
//! This crate provides the value types shared by every other `bsc` crate:
//! the MD5 content digest the remote uses to address file contents and
//! revisions, package identity, and the tracked-file value type.
//!
//! # Key Types
//!
//! - [`Md5Digest`] — content digest (the remote speaks MD5 hex)
//! - [`PackageId`] — owning project/package pair
//! - [`PackageFile`] — a file as last known committed remotely

pub mod digest;
pub mod error;
pub mod package;

pub use digest::Md5Digest;
pub use error::TypeError;
pub use package::{PackageFile, PackageId};
