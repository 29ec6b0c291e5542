//! Passphrase-based authenticated encryption of a credential.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// PBKDF2-HMAC-SHA256 rounds used for every envelope.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Encrypted-at-rest credential. Byte fields serialize as base64 strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(serialize_with = "encode_b64", deserialize_with = "decode_b64")]
    pub ciphertext: Vec<u8>,
    #[serde(serialize_with = "encode_b64", deserialize_with = "decode_b64")]
    pub iv: Vec<u8>,
    #[serde(serialize_with = "encode_b64", deserialize_with = "decode_b64")]
    pub salt: Vec<u8>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Envelope")
            .field("ciphertext", &format_args!("[{} bytes]", self.ciphertext.len()))
            .field("iv", &B64.encode(&self.iv))
            .field("salt", &B64.encode(&self.salt))
            .finish()
    }
}

/// A 256-bit symmetric key derived from a passphrase. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Derive a key from `passphrase` and `salt` with PBKDF2-HMAC-SHA256.
pub fn derive_key(passphrase: &str, salt: &[u8]) -> DerivedKey {
    let mut key = DerivedKey([0u8; 32]);
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key.0);
    key
}

/// Encrypt a token under a passphrase with fresh random salt and nonce.
pub fn encrypt(token: &str, passphrase: &str) -> Result<Envelope> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|error| Error::InvalidInput(format!("Cipher error: {error}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), token.as_bytes())
        .map_err(|error| Error::InvalidInput(format!("Encryption error: {error}")))?;

    Ok(Envelope {
        ciphertext,
        iv: iv.to_vec(),
        salt: salt.to_vec(),
    })
}

/// Decrypt an envelope.
///
/// A wrong passphrase, a tampered field, or a malformed nonce all fail with
/// [`Error::Authentication`]; no partial plaintext is ever returned.
pub fn decrypt(envelope: &Envelope, passphrase: &str) -> Result<String> {
    if envelope.iv.len() != NONCE_LEN {
        return Err(Error::Authentication(format!(
            "envelope nonce must be {NONCE_LEN} bytes, found {}",
            envelope.iv.len()
        )));
    }

    let key = derive_key(passphrase, &envelope.salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|error| Error::InvalidInput(format!("Cipher error: {error}")))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&envelope.iv), envelope.ciphertext.as_slice())
        .map_err(|_| {
            Error::Authentication("wrong passphrase or tampered envelope".to_string())
        })?;

    String::from_utf8(plaintext)
        .map_err(|_| Error::Authentication("decrypted credential is not UTF-8".to_string()))
}

fn encode_b64<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&B64.encode(bytes))
}

fn decode_b64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    B64.decode(raw.trim()).map_err(serde::de::Error::custom)
}
