//! Secret sealing for key material at rest
//!
//! Private keys are persisted only as ChaCha20-Poly1305 ciphertext under a
//! master key derived from an operator passphrase. Plaintext is produced
//! on demand and must not outlive the caller's scope.

use crate::{Error, Result};
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Nonce length for ChaCha20-Poly1305
const NONCE_LEN: usize = 12;

/// Environment variable holding the master passphrase
pub const MASTER_KEY_ENV: &str = "WGMESH_MASTER_KEY";

/// Seals and opens secrets under a 256-bit master key
#[derive(Clone)]
pub struct SecretBox {
    key: [u8; 32],
}

impl SecretBox {
    /// Derive the master key from an operator passphrase
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(passphrase.as_bytes());
        let digest = hasher.finalize();
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Read the passphrase from `WGMESH_MASTER_KEY`
    pub fn from_env() -> Result<Self> {
        let passphrase = std::env::var(MASTER_KEY_ENV).map_err(|_| {
            Error::InvalidConfig(format!("{} is not set", MASTER_KEY_ENV))
        })?;
        if passphrase.is_empty() {
            return Err(Error::InvalidConfig(format!("{} is empty", MASTER_KEY_ENV)));
        }
        Ok(Self::from_passphrase(&passphrase))
    }

    /// Encrypt a secret. Output is nonce || ciphertext.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| Error::Crypto(format!("seal failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt a sealed secret
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() <= NONCE_LEN {
            return Err(Error::Crypto("sealed secret too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| Error::Crypto("decryption failed (wrong key or tampered data)".to_string()))
    }

    /// Decrypt a sealed secret expected to be UTF-8
    pub fn open_string(&self, sealed: &[u8]) -> Result<String> {
        let plaintext = self.open(sealed)?;
        String::from_utf8(plaintext)
            .map_err(|_| Error::Crypto("sealed secret is not valid UTF-8".to_string()))
    }
}

impl std::fmt::Debug for SecretBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBox").finish_non_exhaustive()
    }
}
