//! Catalog export helpers shared by publish, push, and local exports.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{Product, PublishedProduct};
use crate::util::format_price;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format '{other}' (expected json or csv)"
            ))),
        }
    }
}

/// Products in the published exchange shape, catalog order preserved.
#[must_use]
pub fn published_items(products: &[Product]) -> Vec<PublishedProduct> {
    products.iter().map(Product::to_published).collect()
}

/// Render the published document: a pretty-printed array without ids.
pub fn render_published_json(products: &[Product]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&published_items(products))
}

/// Render products as CSV with a 1-based row number column.
#[must_use]
pub fn render_csv(products: &[Product]) -> String {
    let mut output = String::from("No,Name,Price,Category,Image\n");
    for (index, product) in products.iter().enumerate() {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            index + 1,
            csv_field(&product.name),
            format_price(product.price),
            csv_field(&product.category),
            csv_field(&product.img.to_string()),
        );
    }
    output
}

/// Render products in the selected format.
pub fn render_export(products: &[Product], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_published_json(products),
        ExportFormat::Csv => Ok(render_csv(products)),
    }
}

/// Default file name for an export taken at `timestamp`.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp: DateTime<Utc>) -> String {
    format!(
        "products-{}.{}",
        timestamp.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
