//! GitHub token storage in the OS keychain, one slot pair per profile.

#[cfg(test)]
use std::collections::HashMap;
use std::env;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;
use warung_core::vault::{BearerToken, CredentialSlots, CredentialVault, Slot};
use warung_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "warung-cli";

#[derive(Debug, Clone)]
pub struct KeyringSlots {
    profile_name: String,
}

impl KeyringSlots {
    pub fn new(profile_name: &str) -> Self {
        Self {
            profile_name: profile_name.to_string(),
        }
    }

    fn username(&self, slot: Slot) -> String {
        format!("github_token:{}:{}", self.profile_name, slot.key())
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self, slot: Slot) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username(slot))
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }
}

impl CredentialSlots for KeyringSlots {
    #[cfg(not(test))]
    fn load(&self, slot: Slot) -> Result<Option<String>> {
        match self.entry(slot)?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load(&self, slot: Slot) -> Result<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        Ok(guard.get(&self.username(slot)).cloned())
    }

    #[cfg(not(test))]
    fn save(&self, slot: Slot, value: &str) -> Result<()> {
        self.entry(slot)?
            .set_password(value)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save(&self, slot: Slot, value: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.insert(self.username(slot), value.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear(&self, slot: Slot) -> Result<()> {
        match self.entry(slot)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear(&self, slot: Slot) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.remove(&self.username(slot));
        Ok(())
    }
}

pub fn vault_for_profile(profile_name: &str) -> CredentialVault<KeyringSlots> {
    CredentialVault::new(KeyringSlots::new(profile_name))
}

/// `--passphrase`, then `WARUNG_PASSPHRASE`.
pub fn resolve_passphrase(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(ToString::to_string)
        .or_else(|| env::var("WARUNG_PASSPHRASE").ok())
        .filter(|value| !value.is_empty())
}

/// `GITHUB_TOKEN` wins over the stored token.
pub fn resolve_token(
    profile_name: &str,
    passphrase: Option<&str>,
) -> Result<Option<BearerToken>> {
    resolve_token_with_env(
        &vault_for_profile(profile_name),
        env::var("GITHUB_TOKEN").ok(),
        passphrase,
    )
}

pub fn resolve_token_with_env<S: CredentialSlots>(
    vault: &CredentialVault<S>,
    env_token: Option<String>,
    passphrase: Option<&str>,
) -> Result<Option<BearerToken>> {
    if let Some(token) = env_token.filter(|token| !token.trim().is_empty()) {
        return BearerToken::new(token).map(Some);
    }
    vault.unlock(passphrase)
}

#[cfg(test)]
mod tests {
    use warung_core::vault::{MemorySlots, StoredCredential};

    use super::*;

    #[test]
    fn keyring_slots_are_scoped_per_profile() {
        let vault_a = vault_for_profile("slots-profile-a");
        let vault_b = vault_for_profile("slots-profile-b");
        vault_a
            .store_plain(&BearerToken::new("token-a").unwrap())
            .unwrap();

        assert!(vault_b.load().unwrap().is_none());
        assert!(matches!(
            vault_a.load().unwrap(),
            Some(StoredCredential::Plain(_))
        ));
        vault_a.clear().unwrap();
    }

    #[test]
    fn env_token_overrides_vault() {
        let vault = CredentialVault::new(MemorySlots::new());
        vault
            .store_plain(&BearerToken::new("stored").unwrap())
            .unwrap();

        let token = resolve_token_with_env(&vault, Some("from-env".to_string()), None)
            .unwrap()
            .unwrap();
        assert_eq!(token.expose(), "from-env");

        let token = resolve_token_with_env(&vault, Some("  ".to_string()), None)
            .unwrap()
            .unwrap();
        assert_eq!(token.expose(), "stored");
    }

    #[test]
    fn encrypted_vault_needs_passphrase() {
        let vault = CredentialVault::new(MemorySlots::new());
        vault
            .seal(&BearerToken::new("sealed").unwrap(), "kunci")
            .unwrap();

        assert!(resolve_token_with_env(&vault, None, None).is_err());
        let token = resolve_token_with_env(&vault, None, Some("kunci"))
            .unwrap()
            .unwrap();
        assert_eq!(token.expose(), "sealed");
    }
}
