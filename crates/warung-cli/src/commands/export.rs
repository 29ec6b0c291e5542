use std::path::{Path, PathBuf};

use chrono::Utc;
use warung_core::export::{render_export, suggested_export_file_name, ExportFormat};

use crate::cli::ExportFormatArg;
use crate::commands::common::open_catalog;
use crate::error::CliError;

pub const fn export_format(format: ExportFormatArg) -> ExportFormat {
    match format {
        ExportFormatArg::Json => ExportFormat::Json,
        ExportFormatArg::Csv => ExportFormat::Csv,
    }
}

/// Writes to `output_path` (a directory gets a timestamped file name), or to
/// stdout when no path is given. Returns the written file, if any.
pub fn run_export(
    format: ExportFormatArg,
    output_path: Option<&Path>,
    catalog_path: &Path,
) -> Result<Option<PathBuf>, CliError> {
    let catalog = open_catalog(catalog_path);
    let format = export_format(format);
    let rendered = render_export(catalog.products(), format)?;

    let Some(path) = output_path else {
        print!("{rendered}");
        if !rendered.ends_with('\n') {
            println!();
        }
        return Ok(None);
    };

    let target = if path.is_dir() {
        path.join(suggested_export_file_name(format, Utc::now()))
    } else {
        path.to_path_buf()
    };
    std::fs::write(&target, rendered)?;
    println!("{}", target.display());
    Ok(Some(target))
}
