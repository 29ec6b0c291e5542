use std::path::Path;

use warung_core::{Product, ProductField};

use crate::cli::FieldArg;
use crate::commands::common::{open_catalog, resolve_product};
use crate::error::CliError;

pub const fn product_field(field: FieldArg) -> ProductField {
    match field {
        FieldArg::Name => ProductField::Name,
        FieldArg::Price => ProductField::Price,
        FieldArg::Category => ProductField::Category,
        FieldArg::Img => ProductField::Img,
    }
}

pub fn run_edit(
    id: &str,
    field: FieldArg,
    value: &str,
    catalog_path: &Path,
) -> Result<Product, CliError> {
    let mut catalog = open_catalog(catalog_path);
    let product = resolve_product(&catalog, id)?;
    let updated = catalog.update_field(&product.id, product_field(field), value)?;

    println!("{}", updated.id);
    Ok(updated)
}
