use std::path::Path;

use warung_core::{ImagePath, UpsertOutcome};

use crate::commands::common::open_catalog;
use crate::error::CliError;

pub fn run_add(
    name: &str,
    price: f64,
    category: &str,
    img: &str,
    catalog_path: &Path,
) -> Result<UpsertOutcome, CliError> {
    let (name, category) = (name.trim(), category.trim());
    if name.is_empty() || category.is_empty() || img.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "Name, price, category and image are all required".to_string(),
        ));
    }
    if !(price.is_finite() && price > 0.0) {
        return Err(CliError::InvalidInput(format!(
            "Price must be greater than zero, got {price}"
        )));
    }
    let img = ImagePath::parse(img);
    if img.is_empty() {
        return Err(CliError::InvalidInput(
            "Image name has no usable characters".to_string(),
        ));
    }

    let mut catalog = open_catalog(catalog_path);
    let outcome = catalog.upsert_by_identity(name, price, category, img)?;
    match &outcome {
        UpsertOutcome::Inserted(id) => println!("Added {id}"),
        UpsertOutcome::Replaced(id) => println!("Updated existing product {id}"),
    }
    Ok(outcome)
}
