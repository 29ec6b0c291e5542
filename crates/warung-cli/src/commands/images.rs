use std::path::PathBuf;

use warung_core::config::join_repo_path;
use warung_core::remote::{BatchProgress, BatchReport, ContentStore, SyncClient, UploadFile};

use crate::cli::ImagesCommands;
use crate::commands::common::{open_sync_client, RemoteOptions};
use crate::error::CliError;

pub async fn run_images(
    command: ImagesCommands,
    options: RemoteOptions<'_>,
) -> Result<(), CliError> {
    let client = open_sync_client(options)?;
    let images_dir = client.store().config().images_dir.clone();

    match command {
        ImagesCommands::Upload {
            files,
            dir,
            overwrite,
        } => {
            let dir = dir.unwrap_or(images_dir);
            let report = upload_images(&client, &files, &dir, overwrite).await;
            finish_batch("uploaded", &report)
        }
        ImagesCommands::Delete { paths } => {
            let paths = qualify_paths(&paths, &images_dir);
            let report = client.delete_files(&paths, print_progress).await;
            finish_batch("deleted", &report)
        }
        ImagesCommands::List { dir, json } => {
            list_images(&client, dir.as_deref().unwrap_or(&images_dir), json).await
        }
    }
}

pub async fn list_images<C: ContentStore>(
    client: &SyncClient<C>,
    dir: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let entries = client.list_dir(dir).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in entries {
            println!("{}", entry.path);
        }
    }
    Ok(())
}

/// Files are only read once the batch reaches them.
pub fn upload_sources(files: &[PathBuf]) -> Vec<UploadFile> {
    files.iter().map(UploadFile::from_path).collect()
}

pub async fn upload_images<C: ContentStore>(
    client: &SyncClient<C>,
    files: &[PathBuf],
    dest_dir: &str,
    overwrite: bool,
) -> BatchReport {
    client
        .upload_files_sequentially(&upload_sources(files), dest_dir, overwrite, print_progress)
        .await
}

/// Bare names are taken relative to the images directory.
pub fn qualify_paths(paths: &[String], images_dir: &str) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.trim())
        .filter(|path| !path.is_empty())
        .map(|path| {
            if path.contains('/') {
                path.trim_start_matches('/').to_string()
            } else {
                join_repo_path(images_dir, path)
            }
        })
        .collect()
}

pub fn progress_line(progress: &BatchProgress, verb: &str) -> String {
    let status = if progress.succeeded { "ok" } else { "failed" };
    format!(
        "{}/{} {verb} {} ({status})",
        progress.completed, progress.total, progress.path
    )
}

fn print_progress(progress: &BatchProgress) {
    println!("{}", progress_line(progress, "processed"));
}

fn finish_batch(verb: &str, report: &BatchReport) -> Result<(), CliError> {
    println!("{} of {} {verb}", report.succeeded, report.attempted);
    if report.is_complete_success() {
        return Ok(());
    }

    for failure in &report.failures {
        eprintln!("  {}: {}", failure.path, failure.message);
    }
    Err(CliError::InvalidInput(format!(
        "{} of {} items failed",
        report.failures.len(),
        report.attempted
    )))
}
