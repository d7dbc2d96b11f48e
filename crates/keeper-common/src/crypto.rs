//! At-rest envelope encryption for indexed columns (spec §4.5).
//!
//! Deterministic AES-256-GCM: the nonce is derived from the key digest
//! rather than drawn fresh per call, so the same plaintext always produces
//! the same ciphertext under a given key. This is what lets the snapshot
//! query group rows by `(type, key)` without ever decrypting them — the
//! server does equality matching on ciphertext.
//!
//! This forfeits semantic security (an observer with query access can tell
//! which rows share a plaintext). The key is process-wide, server-side-only
//! configuration, and decryption is never exposed to unauthenticated
//! callers — see spec §4.5's security note. A stronger design would use a
//! real deterministic-encryption scheme (AES-GCM-SIV); substituting one
//! would not change the `encode`/`decode` call shape below.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("ciphertext is not valid hex")]
    NotHex(#[from] hex::FromHexError),
    #[error("decryption failed")]
    Decrypt,
    #[error("encryption failed")]
    Encrypt,
}

/// A derived 256-bit envelope key plus its fixed nonce.
///
/// Built once from the configured passphrase and held for the process
/// lifetime — §5 calls this a read-only shared resource needing no
/// synchronization.
#[derive(Clone)]
pub struct EnvelopeKey {
    cipher: Aes256Gcm,
    nonce: [u8; 12],
}

impl EnvelopeKey {
    /// Derive the key and its deterministic nonce from a passphrase.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        let cipher = Aes256Gcm::new(key);

        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&digest[digest.len() - 12..]);

        Self { cipher, nonce }
    }

    /// Encrypt `plaintext`, returning hex-encoded ciphertext.
    pub fn encode(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let nonce = Nonce::from_slice(&self.nonce);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Encrypt)?;
        Ok(hex::encode(ciphertext))
    }

    /// Decrypt a hex-encoded blob produced by [`Self::encode`].
    pub fn decode(&self, hex_ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
        let bytes = hex::decode(hex_ciphertext)?;
        let nonce = Nonce::from_slice(&self.nonce);
        self.cipher
            .decrypt(nonce, bytes.as_ref())
            .map_err(|_| CryptoError::Decrypt)
    }

    pub fn encode_str(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.encode(plaintext.as_bytes())
    }

    pub fn decode_to_string(&self, hex_ciphertext: &str) -> Result<String, CryptoError> {
        let bytes = self.decode(hex_ciphertext)?;
        String::from_utf8(bytes).map_err(|_| CryptoError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = EnvelopeKey::from_passphrase("correct-horse-battery-staple");
        let ct = key.encode_str("hello world").unwrap();
        assert_eq!(key.decode_to_string(&ct).unwrap(), "hello world");
    }

    #[test]
    fn is_deterministic() {
        let key = EnvelopeKey::from_passphrase("s3cr3t");
        let a = key.encode_str("text").unwrap();
        let b = key.encode_str("text").unwrap();
        assert_eq!(a, b, "same plaintext under same key must encrypt identically");
    }

    #[test]
    fn different_plaintexts_differ() {
        let key = EnvelopeKey::from_passphrase("s3cr3t");
        let a = key.encode_str("text-a").unwrap();
        let b = key.encode_str("text-b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let key_a = EnvelopeKey::from_passphrase("key-a");
        let key_b = EnvelopeKey::from_passphrase("key-b");
        let ct = key_a.encode_str("secret").unwrap();
        assert!(key_b.decode_to_string(&ct).is_err());
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let key = EnvelopeKey::from_passphrase("k");
        assert!(key.decode("not-hex!!").is_err());
    }
}
