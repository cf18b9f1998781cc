//! Symmetric encryption for opaque tokens round-tripped through third parties.
//!
//! Tokens are AES-256-GCM ciphertexts keyed by the SHA-256 digest of a shared
//! secret. The wire form is URL-safe base64 (no padding) of `nonce || ciphertext`
//! so it can travel in a query string without further escaping.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Nonce size for AES-256-GCM (96 bits)
const NONCE_SIZE: usize = 12;

/// Authentication tag appended by GCM
const TAG_SIZE: usize = 16;

/// Error type for token encryption operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Malformed token")]
    MalformedToken,

    #[error("Decryption failed")]
    Decryption,

    #[error("Decrypted value is not valid UTF-8")]
    InvalidUtf8,
}

/// Encrypts and decrypts short strings with a key derived from a shared secret.
#[derive(Clone)]
pub struct StateCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for StateCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCipher")
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}

impl StateCipher {
    /// Creates a cipher whose key is the SHA-256 digest of `secret`.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypts `plaintext` into a URL-safe token.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Decrypts a token produced by [`StateCipher::encrypt`].
    pub fn decrypt(&self, token: &str) -> Result<String, CryptoError> {
        let payload = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CryptoError::MalformedToken)?;

        if payload.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::MalformedToken);
        }

        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}
