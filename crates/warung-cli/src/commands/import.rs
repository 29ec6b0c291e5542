use std::path::Path;

use warung_core::catalog::ImportReport;

use crate::commands::common::{open_catalog, read_input_document};
use crate::error::CliError;

pub fn run_import(input: Option<&Path>, catalog_path: &Path) -> Result<ImportReport, CliError> {
    let document = read_input_document(input)?;
    import_document(&document, catalog_path)
}

pub fn import_document(document: &str, catalog_path: &Path) -> Result<ImportReport, CliError> {
    let mut catalog = open_catalog(catalog_path);
    let report = catalog.bulk_import(document)?;

    println!(
        "Imported {} new, {} updated, {} skipped",
        report.inserted, report.updated, report.skipped
    );
    Ok(report)
}
