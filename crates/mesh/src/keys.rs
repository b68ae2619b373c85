//! WireGuard key pair generation
//!
//! Curve25519 key pairs in the daemon's base64 wire format, generated from
//! the operating system RNG via x25519-dalek.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use wgmesh_common::{Error, Result};
use x25519_dalek::{PublicKey, StaticSecret};

/// WireGuard key pair, both halves base64-encoded
#[derive(Clone)]
pub struct WgKeyPair {
    pub private_key: String,
    pub public_key: String,
}

impl WgKeyPair {
    /// Generate a fresh key pair.
    ///
    /// RNG failure is fatal and surfaced; keys are never defaulted.
    pub fn generate() -> Result<Self> {
        let mut private_key_bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut private_key_bytes)
            .map_err(|e| Error::KeyGeneration(format!("system RNG unavailable: {}", e)))?;

        // WireGuard key clamping
        private_key_bytes[0] &= 248;
        private_key_bytes[31] &= 127;
        private_key_bytes[31] |= 64;

        let secret = StaticSecret::from(private_key_bytes);
        let public = PublicKey::from(&secret);

        Ok(Self {
            private_key: STANDARD.encode(private_key_bytes),
            public_key: STANDARD.encode(public.as_bytes()),
        })
    }

    /// Rebuild a key pair from an existing base64 private key
    pub fn from_private_key(private_key_b64: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(private_key_b64)
            .map_err(|_| Error::KeyGeneration("private key is not valid base64".to_string()))?;

        let key_bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::KeyGeneration("private key must be 32 bytes".to_string()))?;

        let secret = StaticSecret::from(key_bytes);
        let public = PublicKey::from(&secret);

        Ok(Self {
            private_key: private_key_b64.to_string(),
            public_key: STANDARD.encode(public.as_bytes()),
        })
    }
}

impl std::fmt::Debug for WgKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgKeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp = WgKeyPair::generate().unwrap();
        assert_eq!(kp.private_key.len(), 44); // base64 of 32 bytes
        assert_eq!(kp.public_key.len(), 44);
        assert_ne!(kp.private_key, kp.public_key);
    }

    #[test]
    fn test_keypairs_are_unique() {
        let a = WgKeyPair::generate().unwrap();
        let b = WgKeyPair::generate().unwrap();
        assert_ne!(a.private_key, b.private_key);
        assert_ne!(a.public_key, b.public_key);
    }

    #[test]
    fn test_public_key_rederivation() {
        let kp = WgKeyPair::generate().unwrap();
        let rebuilt = WgKeyPair::from_private_key(&kp.private_key).unwrap();
        assert_eq!(rebuilt.public_key, kp.public_key);
    }

    #[test]
    fn test_from_private_key_rejects_garbage() {
        assert!(WgKeyPair::from_private_key("not base64!!!").is_err());
        assert!(WgKeyPair::from_private_key("c2hvcnQ=").is_err()); // 5 bytes
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let kp = WgKeyPair::generate().unwrap();
        let rendered = format!("{:?}", kp);
        assert!(!rendered.contains(&kp.private_key));
    }
}
