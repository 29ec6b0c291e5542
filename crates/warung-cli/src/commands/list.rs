use std::path::Path;

use warung_core::view::{category_options, project, ViewQuery};

use crate::cli::SortArg;
use crate::commands::common::{
    format_product_lines, open_catalog, product_to_list_item, sort_key, ProductListItem,
};
use crate::error::CliError;

pub fn run_list(
    category: Option<&str>,
    search: Option<&str>,
    sort: SortArg,
    as_json: bool,
    catalog_path: &Path,
) -> Result<(), CliError> {
    let catalog = open_catalog(catalog_path);
    let query = ViewQuery::new(category, search, sort_key(sort));
    let view = project(catalog.products(), &query);

    if as_json {
        let json_items = view
            .iter()
            .map(|product| product_to_list_item(product))
            .collect::<Vec<ProductListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if view.is_empty() {
        println!("No products.");
    } else {
        for line in format_product_lines(&view) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn run_categories(as_json: bool, catalog_path: &Path) -> Result<(), CliError> {
    let catalog = open_catalog(catalog_path);
    let options = category_options(catalog.products());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&options)?);
    } else {
        for option in options {
            println!("{option}");
        }
    }

    Ok(())
}
