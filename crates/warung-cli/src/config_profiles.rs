//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warung_core::config::RemoteConfig;
use warung_core::util::is_http_url;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

/// Remote settings for one profile. Unset fields take the core defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub github_owner: Option<String>,
    #[serde(default)]
    pub github_repo: Option<String>,
    #[serde(default)]
    pub github_branch: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub images_dir: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub merge_endpoint: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("warung").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    warung_core::util::normalize_text_option(value)
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        self.resolve_profile_name_with_env(
            explicit,
            std::env::var("WARUNG_PROFILE").ok().as_deref(),
        )
    }

    fn resolve_profile_name_with_env(&self, explicit: Option<&str>, env: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(env))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| "default".to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    /// Remote config for this profile, or `None` when owner/repo are unset.
    pub fn remote_config(&self) -> Result<Option<RemoteConfig>, String> {
        let owner = normalize_text_option(self.github_owner.clone());
        let repo = normalize_text_option(self.github_repo.clone());
        let (Some(owner), Some(repo)) = (owner, repo) else {
            return Ok(None);
        };

        let config = RemoteConfig::new(
            &owner,
            &repo,
            self.github_branch.clone(),
            self.api_base_url.clone(),
        )
        .map_err(|error| error.to_string())?
        .with_catalog_path(self.catalog_path.clone())
        .with_images_dir(self.images_dir.clone());
        Ok(Some(config))
    }

    pub fn merge_endpoint(&self) -> Option<String> {
        normalize_text_option(self.merge_endpoint.clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = normalize_text_option(self.api_base_url.clone()) {
            if !is_http_url(&url) {
                return Err("api_base_url must include http:// or https://".to_string());
            }
        }
        if let Some(url) = self.merge_endpoint() {
            if !is_http_url(&url) {
                return Err("merge_endpoint must include http:// or https://".to_string());
            }
        }
        if self.github_owner.is_some() != self.github_repo.is_some() {
            return Err("owner and repo must be configured together".to_string());
        }
        Ok(())
    }

    /// Names of fields still needed before remote commands work.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.github_owner.is_none() {
            missing.push("owner");
        }
        if self.github_repo.is_none() {
            missing.push("repo");
        }
        missing
    }

    fn normalize(&mut self) {
        self.github_owner = normalize_text_option(self.github_owner.take());
        self.github_repo = normalize_text_option(self.github_repo.take());
        self.github_branch = normalize_text_option(self.github_branch.take());
        self.catalog_path = normalize_text_option(self.catalog_path.take());
        self.images_dir = normalize_text_option(self.images_dir.take());
        self.api_base_url = normalize_text_option(self.api_base_url.take());
        self.merge_endpoint = normalize_text_option(self.merge_endpoint.take());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize_profile_name_rejects_empty() {
        assert_eq!(normalize_profile_name(None), None);
        assert_eq!(normalize_profile_name(Some(" ")), None);
    }

    #[test]
    fn config_roundtrip_trims_profile_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some(" toko ".to_string()),
            profiles: BTreeMap::new(),
        };
        config.profiles.insert(
            "toko".to_string(),
            CliProfile {
                github_owner: Some(" warung ".to_string()),
                github_repo: Some("katalog".to_string()),
                github_branch: Some("   ".to_string()),
                ..CliProfile::default()
            },
        );

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.active_profile.as_deref(), Some("toko"));
        let profile = loaded.profile("toko").unwrap();
        assert_eq!(profile.github_owner.as_deref(), Some("warung"));
        assert_eq!(profile.github_branch, None);
    }

    #[test]
    fn load_from_missing_path_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliProfilesConfig::load_from_path(&dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, CliProfilesConfig::default());
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_env_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(
            config.resolve_profile_name_with_env(Some("mobile"), Some("env")),
            "mobile"
        );
        assert_eq!(config.resolve_profile_name_with_env(None, Some("env")), "env");
        assert_eq!(config.resolve_profile_name_with_env(None, None), "work");
        assert_eq!(
            CliProfilesConfig::default().resolve_profile_name_with_env(None, None),
            "default"
        );
    }

    #[test]
    fn remote_config_applies_defaults_and_overrides() {
        let profile = CliProfile {
            github_owner: Some("warung".to_string()),
            github_repo: Some("katalog".to_string()),
            images_dir: Some("assets/img".to_string()),
            ..CliProfile::default()
        };
        let config = profile.remote_config().unwrap().unwrap();
        assert_eq!(config.branch, "main");
        assert_eq!(config.catalog_path, "data/products.json");
        assert_eq!(config.images_dir, "assets/img");

        assert_eq!(CliProfile::default().remote_config().unwrap(), None);
    }

    #[test]
    fn validate_rejects_bad_urls_and_half_repositories() {
        let profile = CliProfile {
            merge_endpoint: Some("example.com/merge".to_string()),
            ..CliProfile::default()
        };
        assert!(profile.validate().is_err());

        let profile = CliProfile {
            github_owner: Some("warung".to_string()),
            ..CliProfile::default()
        };
        assert!(profile.validate().is_err());
    }
}
