use std::path::Path;

use warung_core::util::image_search_url;

use crate::commands::common::{open_catalog, resolve_product};
use crate::error::CliError;

pub fn run_image_url(id: &str, catalog_path: &Path) -> Result<String, CliError> {
    let catalog = open_catalog(catalog_path);
    let product = resolve_product(&catalog, id)?;
    let url = image_search_url(&product.name);

    println!("{url}");
    Ok(url)
}
