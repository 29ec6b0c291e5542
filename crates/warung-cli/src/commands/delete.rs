use std::path::Path;

use crate::commands::common::{open_catalog, resolve_product};
use crate::error::CliError;

pub fn run_delete(id: &str, catalog_path: &Path) -> Result<(), CliError> {
    let mut catalog = open_catalog(catalog_path);
    let product = resolve_product(&catalog, id)?;

    catalog.delete_by_id(&product.id)?;
    println!("{}", product.id);
    Ok(())
}

pub fn run_clear(confirmed: bool, catalog_path: &Path) -> Result<usize, CliError> {
    if !confirmed {
        return Err(CliError::ConfirmationRequired("clear the catalog"));
    }

    let mut catalog = open_catalog(catalog_path);
    let removed = catalog.clear()?;
    println!("Removed {removed} products");
    Ok(removed)
}
