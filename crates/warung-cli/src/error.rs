use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] warung_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Product ID cannot be empty")]
    EmptyProductId,
    #[error("Product not found for id/prefix: {0}")]
    ProductNotFound(String),
    #[error("{0}")]
    AmbiguousProductId(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Remote repository is not configured. Run `warung config init --owner <owner> --repo <repo>`, or set WARUNG_GITHUB_OWNER and WARUNG_GITHUB_REPO."
    )]
    RemoteNotConfigured,
    #[error(
        "No GitHub token available. Run `warung token set`, or set GITHUB_TOKEN for this shell."
    )]
    TokenMissing,
    #[error("Refusing to {0} without --yes")]
    ConfirmationRequired(&'static str),
    #[error("Merge endpoint is not configured. Pass --endpoint or set merge_endpoint via `warung config init`.")]
    MergeEndpointNotConfigured,
    #[error("Merge push failed: {0}")]
    Push(String),
}
