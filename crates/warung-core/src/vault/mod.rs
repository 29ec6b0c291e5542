//! Credential vault for the remote bearer token.
//!
//! The token lives in one of two mutually exclusive slots: plaintext, or an
//! encrypted [`Envelope`] unlocked with a passphrase.

mod envelope;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use zeroize::{Zeroize, ZeroizeOnDrop};

pub use envelope::{decrypt, derive_key, encrypt, DerivedKey, Envelope, PBKDF2_ITERATIONS};

use crate::error::{Error, Result};

/// Persisted credential slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Plain,
    Encrypted,
}

impl Slot {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Plain => "token_plain",
            Self::Encrypted => "token_encrypted",
        }
    }
}

/// Backend holding the raw slot values.
pub trait CredentialSlots {
    fn load(&self, slot: Slot) -> Result<Option<String>>;
    fn save(&self, slot: Slot, value: &str) -> Result<()>;
    fn clear(&self, slot: Slot) -> Result<()>;
}

/// In-memory slots, shared between clones (primarily for tests).
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    values: Arc<Mutex<HashMap<Slot, String>>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut HashMap<Slot, String>) -> T) -> Result<T> {
        let mut guard = self
            .values
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        Ok(f(&mut guard))
    }
}

impl CredentialSlots for MemorySlots {
    fn load(&self, slot: Slot) -> Result<Option<String>> {
        self.with_values(|values| values.get(&slot).cloned())
    }

    fn save(&self, slot: Slot, value: &str) -> Result<()> {
        self.with_values(|values| {
            values.insert(slot, value.to_string());
        })
    }

    fn clear(&self, slot: Slot) -> Result<()> {
        self.with_values(|values| {
            values.remove(&slot);
        })
    }
}

/// A bearer token ready for use. The text is wiped when the token drops.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let mut raw = token.into();
        let token = raw.trim().to_string();
        raw.zeroize();
        if token.is_empty() {
            return Err(Error::InvalidInput("Token must not be empty".to_string()));
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("BearerToken([REDACTED])")
    }
}

/// What the vault currently holds.
#[derive(Clone, PartialEq, Eq)]
pub enum StoredCredential {
    Plain(BearerToken),
    Encrypted(Envelope),
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => formatter.write_str("Plain([REDACTED])"),
            Self::Encrypted(envelope) => formatter
                .debug_tuple("Encrypted")
                .field(envelope)
                .finish(),
        }
    }
}

/// Stores the token in exactly one slot at a time.
#[derive(Debug, Clone)]
pub struct CredentialVault<S: CredentialSlots> {
    slots: S,
}

impl<S: CredentialSlots> CredentialVault<S> {
    pub const fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Store the token in plaintext, dropping any encrypted copy.
    pub fn store_plain(&self, token: &BearerToken) -> Result<()> {
        self.slots.clear(Slot::Encrypted)?;
        self.slots.save(Slot::Plain, token.expose())?;
        tracing::info!("Stored plaintext credential");
        Ok(())
    }

    /// Store an envelope, dropping any plaintext copy.
    pub fn store_encrypted(&self, envelope: &Envelope) -> Result<()> {
        let serialized = serde_json::to_string(envelope)?;
        self.slots.clear(Slot::Plain)?;
        self.slots.save(Slot::Encrypted, &serialized)?;
        tracing::info!("Stored encrypted credential");
        Ok(())
    }

    /// Encrypt `token` under `passphrase` and store the envelope.
    pub fn seal(&self, token: &BearerToken, passphrase: &str) -> Result<()> {
        if passphrase.is_empty() {
            return Err(Error::InvalidInput("Passphrase must not be empty".to_string()));
        }
        let envelope = encrypt(token.expose(), passphrase)?;
        self.store_encrypted(&envelope)
    }

    /// Read whichever slot is populated.
    pub fn load(&self) -> Result<Option<StoredCredential>> {
        if let Some(raw) = self.slots.load(Slot::Encrypted)? {
            let envelope = serde_json::from_str::<Envelope>(&raw).map_err(|error| {
                Error::Authentication(format!("stored envelope is unreadable: {error}"))
            })?;
            return Ok(Some(StoredCredential::Encrypted(envelope)));
        }

        match self.slots.load(Slot::Plain)? {
            Some(raw) if !raw.trim().is_empty() => {
                Ok(Some(StoredCredential::Plain(BearerToken::new(raw)?)))
            }
            _ => Ok(None),
        }
    }

    /// Resolve the usable token, decrypting with `passphrase` when needed.
    pub fn unlock(&self, passphrase: Option<&str>) -> Result<Option<BearerToken>> {
        match self.load()? {
            None => Ok(None),
            Some(StoredCredential::Plain(token)) => Ok(Some(token)),
            Some(StoredCredential::Encrypted(envelope)) => {
                let passphrase = passphrase.ok_or_else(|| {
                    Error::Authentication(
                        "credential is encrypted; a passphrase is required".to_string(),
                    )
                })?;
                Ok(Some(BearerToken::new(decrypt(&envelope, passphrase)?)?))
            }
        }
    }

    /// Erase both slots.
    pub fn clear(&self) -> Result<()> {
        self.slots.clear(Slot::Plain)?;
        self.slots.clear(Slot::Encrypted)?;
        tracing::info!("Cleared stored credentials");
        Ok(())
    }
}
