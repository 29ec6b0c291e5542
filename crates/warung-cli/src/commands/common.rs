use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use warung_core::config::RemoteConfig;
use warung_core::remote::{GithubContentStore, SyncClient};
use warung_core::util::format_price;
use warung_core::view::SortKey;
use warung_core::{CatalogStore, FileSnapshot, Product, ProductId};

use crate::cli::SortArg;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::credentials::{resolve_passphrase, resolve_token};
use crate::error::CliError;

/// Global options threaded into the remote commands.
#[derive(Clone, Copy)]
pub struct RemoteOptions<'a> {
    pub profile: Option<&'a str>,
    pub passphrase: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ProductListItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub img: String,
}

pub fn product_to_list_item(product: &Product) -> ProductListItem {
    ProductListItem {
        id: product.id.to_string(),
        name: product.name.clone(),
        price: product.price,
        category: product.category.clone(),
        img: product.img.to_string(),
    }
}

pub fn format_product_lines(products: &[&Product]) -> Vec<String> {
    products
        .iter()
        .map(|product| {
            let id_label = short_id(&product.id);
            let name = truncate(&product.name, 32);
            let price = format_price(product.price);
            let category = if product.category.is_empty() {
                "-"
            } else {
                product.category.as_str()
            };
            format!(
                "{id_label:<13}  {name:<32}  {price:>10}  {category:<12}  {}",
                product.img
            )
        })
        .collect()
}

pub fn short_id(id: &ProductId) -> String {
    id.as_str().chars().take(13).collect()
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = value.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub const fn sort_key(sort: SortArg) -> SortKey {
    match sort {
        SortArg::NameAsc => SortKey::NameAsc,
        SortArg::NameDesc => SortKey::NameDesc,
        SortArg::PriceAsc => SortKey::PriceAsc,
        SortArg::PriceDesc => SortKey::PriceDesc,
        SortArg::None => SortKey::None,
    }
}

pub fn normalize_product_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyProductId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Resolve a full id or a unique id prefix to a product.
pub fn resolve_product(
    catalog: &CatalogStore<FileSnapshot>,
    query: &str,
) -> Result<Product, CliError> {
    let query = normalize_product_identifier(query)?;
    if let Some(product) = catalog.get(&ProductId::from(query.as_str())) {
        return Ok(product.clone());
    }

    let matches = catalog.find_by_id_prefix(&query);
    match matches.as_slice() {
        [] => Err(CliError::ProductNotFound(query)),
        [product] => Ok((*product).clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|product| short_id(&product.id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousProductId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn open_catalog(path: &Path) -> CatalogStore<FileSnapshot> {
    CatalogStore::load(FileSnapshot::new(path))
}

pub fn resolve_catalog_path(cli_catalog_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    cli_catalog_path
        .or_else(|| env::var_os("WARUNG_CATALOG_PATH").map(PathBuf::from))
        .map_or_else(default_catalog_path, Ok)
}

pub fn default_catalog_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("warung").join("catalog.json"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

/// Read a document from a file, or from piped stdin when `input` is `None`
/// or `-`.
pub fn read_input_document(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(CliError::InvalidInput(
                    "No input file given and stdin is a terminal".to_string(),
                ));
            }
            let mut buffer = String::new();
            stdin.lock().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Load the named (or active) profile. A missing profile is empty.
pub fn load_profile(explicit: Option<&str>) -> Result<(String, CliProfile), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(explicit);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    Ok((profile_name, profile))
}

/// Profile settings first, then `WARUNG_GITHUB_*` variables.
pub fn resolve_remote_config(profile: &CliProfile) -> Result<RemoteConfig, CliError> {
    if let Some(config) = profile.remote_config().map_err(CliError::Config)? {
        return Ok(config);
    }
    RemoteConfig::from_env()?.ok_or(CliError::RemoteNotConfigured)
}

pub fn open_sync_client(
    options: RemoteOptions<'_>,
) -> Result<SyncClient<GithubContentStore>, CliError> {
    let (profile_name, profile) = load_profile(options.profile)?;
    let remote = resolve_remote_config(&profile)?;
    let passphrase = resolve_passphrase(options.passphrase);
    let token = resolve_token(&profile_name, passphrase.as_deref())?
        .ok_or(CliError::TokenMissing)?;

    tracing::debug!(
        "Using remote {}/{}@{} via profile '{}'",
        remote.owner,
        remote.repo,
        remote.branch,
        profile_name
    );
    Ok(SyncClient::new(GithubContentStore::new(remote, token)?))
}
