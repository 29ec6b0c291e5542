use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub products_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "WARUNG_API_BIND_ADDR", "127.0.0.1:8080");
        if bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "WARUNG_API_BIND_ADDR must be a host:port socket address, got '{bind_addr}'"
            )));
        }

        let products_file = PathBuf::from(value_or_default(
            &lookup,
            "WARUNG_PRODUCTS_FILE",
            "products.json",
        ));

        Ok(Self {
            bind_addr,
            products_file,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn config_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(
            config,
            AppConfig {
                bind_addr: "127.0.0.1:8080".to_string(),
                products_file: PathBuf::from("products.json"),
            }
        );
    }

    #[test]
    fn config_trims_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("WARUNG_API_BIND_ADDR", " 0.0.0.0:9000 "),
            ("WARUNG_PRODUCTS_FILE", "/srv/warung/products.json"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(
            config.products_file,
            PathBuf::from("/srv/warung/products.json")
        );
    }

    #[test]
    fn config_rejects_unparseable_bind_addr() {
        let result = AppConfig::from_lookup(lookup_from(&[("WARUNG_API_BIND_ADDR", "localhost")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
