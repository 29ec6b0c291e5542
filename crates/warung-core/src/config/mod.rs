//! Remote content store configuration.
//!
//! Describes which repository, branch, and paths the sync client targets.
//! Values come from a CLI profile or from `WARUNG_GITHUB_*` environment
//! variables; both paths validate through [`RemoteConfig::new`].

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_CATALOG_PATH: &str = "data/products.json";
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Target repository for publish, fetch, and image operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub api_base_url: String,
    /// Repository path of the published catalog document
    pub catalog_path: String,
    /// Repository directory holding product images
    pub images_dir: String,
}

impl RemoteConfig {
    /// Build a config, defaulting every optional field.
    pub fn new(
        owner: &str,
        repo: &str,
        branch: Option<String>,
        api_base_url: Option<String>,
    ) -> Result<Self> {
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() {
            return Err(Error::InvalidInput(
                "Remote owner and repository must not be empty".to_string(),
            ));
        }
        if owner.contains('/') || repo.contains('/') {
            return Err(Error::InvalidInput(
                "Remote owner and repository must not contain '/'".to_string(),
            ));
        }

        let api_base_url = normalize_text_option(api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !is_http_url(&api_base_url) {
            return Err(Error::InvalidInput(
                "Remote API URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: normalize_text_option(branch).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            api_base_url,
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
        })
    }

    #[must_use]
    pub fn with_catalog_path(mut self, path: Option<String>) -> Self {
        if let Some(path) = normalize_text_option(path) {
            self.catalog_path = normalize_repo_path(&path);
        }
        self
    }

    #[must_use]
    pub fn with_images_dir(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = normalize_text_option(dir) {
            self.images_dir = normalize_repo_path(&dir);
        }
        self
    }

    /// Resolve from `WARUNG_GITHUB_*` environment variables.
    ///
    /// Returns `Ok(None)` when neither owner nor repository is set.
    pub fn from_env() -> Result<Option<Self>> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let owner = optional_trimmed(&lookup, "WARUNG_GITHUB_OWNER");
        let repo = optional_trimmed(&lookup, "WARUNG_GITHUB_REPO");

        let (owner, repo) = match (owner, repo) {
            (None, None) => return Ok(None),
            (Some(owner), Some(repo)) => (owner, repo),
            (Some(_), None) => {
                return Err(Error::InvalidInput(
                    "WARUNG_GITHUB_REPO must be set together with WARUNG_GITHUB_OWNER"
                        .to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(Error::InvalidInput(
                    "WARUNG_GITHUB_OWNER must be set together with WARUNG_GITHUB_REPO"
                        .to_string(),
                ))
            }
        };

        let config = Self::new(
            &owner,
            &repo,
            optional_trimmed(&lookup, "WARUNG_GITHUB_BRANCH"),
            optional_trimmed(&lookup, "WARUNG_GITHUB_API_URL"),
        )?
        .with_catalog_path(optional_trimmed(&lookup, "WARUNG_GITHUB_CATALOG_PATH"))
        .with_images_dir(optional_trimmed(&lookup, "WARUNG_GITHUB_IMAGES_DIR"));
        Ok(Some(config))
    }

    /// Repository path for an image file in the configured images directory.
    pub fn image_path(&self, file_name: &str) -> String {
        join_repo_path(&self.images_dir, file_name)
    }
}

/// Join a directory and a name with exactly one `/`.
pub fn join_repo_path(dir: &str, name: &str) -> String {
    let dir = normalize_repo_path(dir);
    let name = name.trim().trim_start_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

fn normalize_repo_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    normalize_text_option(lookup(name))
}
