//! Schema mapping for the build service API routes.
//!
//! Every module here is a thin, mechanical translation layer: serde structs
//! mirroring one XML vocabulary plus call wrappers that drive the
//! [`Connection`](bsc_client::Connection). No retry or state logic lives
//! here; that is the connection's job.

pub mod commit;
pub mod directory;
pub mod error;
pub mod file;
pub mod history;
pub mod meta;
pub mod status;

pub use commit::commit_file_list;
pub use directory::{
    fetch_directory, package_file_from_entry, Directory, DirectoryEntry, LinkInfo, ServiceInfo,
};
pub use error::{RouteError, RouteResult};
pub use file::{delete_file, fetch_file_contents, upload_file_contents, FetchFileOptions};
pub use history::{fetch_history, Revision, RevisionList};
pub use meta::{
    delete_project, fetch_package_meta, fetch_project_meta, set_package_meta, set_project_meta,
    PackageMeta, ProjectMeta,
};
pub use status::StatusReply;
