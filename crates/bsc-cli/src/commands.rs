use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;

use bsc_api::fetch_history;
use bsc_client::{Connection, ConnectionOptions, Credentials, DEFAULT_API_URL};
use bsc_types::PackageId;
use bsc_workdir::{
    add_and_delete_files_from_package, check_out_package, commit, read_in_modified_package_from_dir,
    undo_file_deletion, untrack_files, FileState,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = ConnectionSettings {
        api_url: cli.api_url.clone(),
        insecure_http: cli.insecure_http,
    };
    match cli.command {
        Command::Checkout(args) => cmd_checkout(&settings, args).await,
        Command::Status(args) => cmd_status(args),
        Command::Add(args) => cmd_add(args),
        Command::Rm(args) => cmd_rm(args),
        Command::Revert(args) => cmd_revert(args),
        Command::Commit(args) => cmd_commit(&settings, args).await,
        Command::Log(args) => cmd_log(&settings, args).await,
    }
}

struct ConnectionSettings {
    api_url: Option<String>,
    insecure_http: bool,
}

/// Build a connection from flags and the `BSC_*` environment.
///
/// A `BSC_TOKEN` wins over a username/password pair.
fn connect(settings: &ConnectionSettings) -> anyhow::Result<Connection> {
    let url = settings
        .api_url
        .clone()
        .or_else(|| env::var("BSC_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let credentials = match env::var("BSC_TOKEN") {
        Ok(token) => Credentials::token(token),
        Err(_) => {
            let username =
                env::var("BSC_USERNAME").context("neither BSC_TOKEN nor BSC_USERNAME is set")?;
            let password = env::var("BSC_PASSWORD").context("BSC_PASSWORD is not set")?;
            Credentials::basic(username, password)
        }
    };

    Ok(Connection::new(
        credentials,
        ConnectionOptions {
            url,
            force_https: !settings.insecure_http,
            ..Default::default()
        },
    )?)
}

async fn cmd_checkout(settings: &ConnectionSettings, args: CheckoutArgs) -> anyhow::Result<()> {
    let con = connect(settings)?;
    let package = PackageId::new(args.project, args.package);
    let dir = args
        .dir
        .unwrap_or_else(|| PathBuf::from(package.name.clone()));

    let pkg = check_out_package(&con, &package, &dir).await?;
    println!(
        "{} Checked out {} ({} files) at revision {}",
        "✓".green().bold(),
        package.to_string().bold(),
        pkg.files.len(),
        pkg.rev_digest.short_hex().yellow()
    );
    Ok(())
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<()> {
    let pkg = read_in_modified_package_from_dir(&args.path)?;
    let mut clean = true;
    for file in &pkg.files_in_workdir {
        let flag = match file.state {
            FileState::Unmodified => continue,
            FileState::Modified => "M".yellow(),
            FileState::Untracked => "?".cyan(),
            FileState::ToBeAdded => "A".green(),
            FileState::ToBeDeleted => "D".red(),
            FileState::Missing => "!".red().bold(),
        };
        clean = false;
        println!("{flag} {}", file.file.name);
    }
    if clean {
        println!(
            "Working copy of {} is clean.",
            pkg.package.to_string().bold()
        );
    }
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    let pkg = read_in_modified_package_from_dir(&args.path)?;
    add_and_delete_files_from_package(&pkg, &[], &args.files)?;
    for file in &args.files {
        println!("{} {}", "A".green(), file);
    }
    Ok(())
}

fn cmd_rm(args: RmArgs) -> anyhow::Result<()> {
    let pkg = read_in_modified_package_from_dir(&args.path)?;
    add_and_delete_files_from_package(&pkg, &args.files, &[])?;
    for file in &args.files {
        println!("{} {}", "D".red(), file);
    }
    Ok(())
}

fn cmd_revert(args: RevertArgs) -> anyhow::Result<()> {
    let pkg = read_in_modified_package_from_dir(&args.path)?;

    let mut to_untrack = Vec::new();
    let mut to_undelete = Vec::new();
    for name in &args.files {
        match pkg.state_of(name) {
            Some(FileState::ToBeAdded) => to_untrack.push(name.clone()),
            Some(FileState::ToBeDeleted) | Some(FileState::Missing) => {
                to_undelete.push(name.clone())
            }
            Some(state) => bail!("cannot revert {name}: it is {state}"),
            None => bail!("cannot revert {name}: no such file in the working copy"),
        }
    }

    let pkg = untrack_files(&pkg, &to_untrack)?;
    undo_file_deletion(&pkg, &to_undelete)?;
    for file in &args.files {
        println!("{} {}", "reverted:".green(), file);
    }
    Ok(())
}

async fn cmd_commit(settings: &ConnectionSettings, args: CommitArgs) -> anyhow::Result<()> {
    let con = connect(settings)?;
    let pkg = read_in_modified_package_from_dir(&args.path)?;
    let committed = commit(&con, &pkg, &args.message).await?;
    println!(
        "{} Committed {} at revision {}",
        "✓".green().bold(),
        committed.package.to_string().bold(),
        committed.rev_digest.short_hex().yellow()
    );
    Ok(())
}

async fn cmd_log(settings: &ConnectionSettings, args: LogArgs) -> anyhow::Result<()> {
    let con = connect(settings)?;
    let pkg = read_in_modified_package_from_dir(&args.path)?;

    let revisions = fetch_history(&con, &pkg.package).await?;
    for rev in revisions.iter().rev() {
        let date = chrono::DateTime::from_timestamp(rev.time as i64, 0)
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        println!(
            "{}  {}  {}  {}",
            format!("r{}", rev.rev).yellow().bold(),
            rev.srcmd5.short_hex().dimmed(),
            rev.user.as_deref().unwrap_or("unknown").bold(),
            date
        );
        if let Some(comment) = &rev.comment {
            println!("  {comment}");
        }
        println!();
    }
    Ok(())
}
