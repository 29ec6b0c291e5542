use std::path::Path;

use warung_core::remote::{ContentStore, SyncClient};

use crate::commands::common::{open_catalog, open_sync_client, RemoteOptions};
use crate::error::CliError;

pub async fn run_publish(
    remote_path: Option<&str>,
    options: RemoteOptions<'_>,
    catalog_path: &Path,
) -> Result<(), CliError> {
    let client = open_sync_client(options)?;
    let path = remote_path.map_or_else(
        || client.store().config().catalog_path.clone(),
        ToString::to_string,
    );
    publish_with(&client, &path, catalog_path).await?;
    println!("Published catalog to {path}");
    Ok(())
}

pub async fn publish_with<C: ContentStore>(
    client: &SyncClient<C>,
    remote_path: &str,
    catalog_path: &Path,
) -> Result<String, CliError> {
    let catalog = open_catalog(catalog_path);
    Ok(client.publish_catalog(catalog.products(), remote_path).await?)
}

pub async fn run_fetch(
    remote_path: Option<&str>,
    confirmed: bool,
    options: RemoteOptions<'_>,
    catalog_path: &Path,
) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::ConfirmationRequired(
            "overwrite the local catalog with the remote copy",
        ));
    }

    let client = open_sync_client(options)?;
    let path = remote_path.map_or_else(
        || client.store().config().catalog_path.clone(),
        ToString::to_string,
    );
    let count = fetch_with(&client, &path, catalog_path).await?;
    println!("Fetched {count} products from {path}");
    Ok(())
}

pub async fn fetch_with<C: ContentStore>(
    client: &SyncClient<C>,
    remote_path: &str,
    catalog_path: &Path,
) -> Result<usize, CliError> {
    let mut catalog = open_catalog(catalog_path);
    Ok(client.fetch_catalog(remote_path, &mut catalog).await?)
}
