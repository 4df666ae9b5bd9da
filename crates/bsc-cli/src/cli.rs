use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bsc",
    about = "Command-line client for the build service",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// API endpoint; overrides the BSC_API_URL environment variable.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Accept plain http endpoints (for local test instances).
    #[arg(long, global = true)]
    pub insecure_http: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check out a package into a local working copy
    Checkout(CheckoutArgs),
    /// Show the per-file state of a working copy
    Status(StatusArgs),
    /// Schedule untracked files for addition
    Add(AddArgs),
    /// Schedule tracked files for deletion
    Rm(RmArgs),
    /// Undo pending additions, deletions, or missing files
    Revert(RevertArgs),
    /// Commit the staged changes as a new remote revision
    Commit(CommitArgs),
    /// Show the commit history of the package
    Log(LogArgs),
}

#[derive(Args)]
pub struct CheckoutArgs {
    pub project: String,
    pub package: String,
    /// Target directory; defaults to the package name.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(required = true)]
    pub files: Vec<String>,
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct RmArgs {
    #[arg(required = true)]
    pub files: Vec<String>,
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct RevertArgs {
    #[arg(required = true)]
    pub files: Vec<String>,
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(default_value = ".")]
    pub path: PathBuf,
}
