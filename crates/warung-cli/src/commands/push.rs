use std::path::Path;

use serde::Deserialize;
use warung_core::export::published_items;
use warung_core::util::{compact_text, is_http_url};

use crate::commands::common::{load_profile, open_catalog};
use crate::config_profiles::normalize_text_option;
use crate::error::CliError;

#[derive(Debug, Deserialize)]
pub struct MergeResponse {
    pub added: usize,
    pub total: usize,
}

pub async fn run_push(
    endpoint: Option<String>,
    global_profile: Option<&str>,
    catalog_path: &Path,
) -> Result<MergeResponse, CliError> {
    let endpoint = match normalize_text_option(endpoint) {
        Some(endpoint) => endpoint,
        None => {
            let (_, profile) = load_profile(global_profile)?;
            profile
                .merge_endpoint()
                .ok_or(CliError::MergeEndpointNotConfigured)?
        }
    };
    if !is_http_url(&endpoint) {
        return Err(CliError::Config(
            "merge endpoint must include http:// or https://".to_string(),
        ));
    }

    let catalog = open_catalog(catalog_path);
    if catalog.is_empty() {
        return Err(CliError::InvalidInput("Catalog is empty; nothing to push".to_string()));
    }

    let response = reqwest::Client::new()
        .post(&endpoint)
        .header("Accept", "application/json")
        .json(&published_items(catalog.products()))
        .send()
        .await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(CliError::Push(format!(
            "HTTP {status}: {}",
            compact_text(&body)
        )));
    }

    let merged = response.json::<MergeResponse>().await?;
    println!(
        "Pushed {} products; server file now holds {}",
        merged.added, merged.total
    );
    Ok(merged)
}
