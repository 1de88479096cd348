//! Encryption at rest for server seeds
//!
//! AES-256-GCM with a fresh random 16-byte IV per record. The seed's
//! commitment hash is bound as associated data, so a ciphertext moved onto
//! another record fails to decrypt.

use super::types::EncryptedSeed;
use crate::errors::CryptoError;
use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, Aead, KeyInit, Payload},
    aes::Aes256,
    AesGcm,
};
use rand_core::{OsRng, RngCore};

/// AES-256-GCM with a 16-byte nonce
type Aes256Gcm16 = AesGcm<Aes256, U16>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

/// Symmetric cipher for server seeds, built from the process-wide key
pub struct SeedCipher {
    cipher: Aes256Gcm16,
}

impl std::fmt::Debug for SeedCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedCipher").finish_non_exhaustive()
    }
}

impl SeedCipher {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let cipher = Aes256Gcm16::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }

    /// Build from a hex-encoded 32-byte key
    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        let key = hex::decode(key_hex.trim())
            .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;
        Self::new(&key)
    }

    pub fn encrypt(&self, server_seed: &str, server_seed_hash: &str) -> Result<EncryptedSeed, CryptoError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let payload = Payload {
            msg: server_seed.as_bytes(),
            aad: server_seed_hash.as_bytes(),
        };
        let ciphertext = self
            .cipher
            .encrypt(GenericArray::from_slice(&iv), payload)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(EncryptedSeed {
            iv: hex::encode(iv),
            ciphertext: hex::encode(ciphertext),
        })
    }

    /// Decrypt a stored seed; any failure means the record is corrupted
    pub fn decrypt(&self, sealed: &EncryptedSeed, server_seed_hash: &str) -> Result<String, CryptoError> {
        let corrupted = || CryptoError::SeedCorrupted {
            server_seed_hash: server_seed_hash.to_string(),
        };

        let iv = hex::decode(&sealed.iv).map_err(|_| corrupted())?;
        if iv.len() != IV_LEN {
            return Err(corrupted());
        }
        let ciphertext = hex::decode(&sealed.ciphertext).map_err(|_| corrupted())?;

        let payload = Payload {
            msg: ciphertext.as_slice(),
            aad: server_seed_hash.as_bytes(),
        };
        let plaintext = self
            .cipher
            .decrypt(GenericArray::from_slice(&iv), payload)
            .map_err(|_| corrupted())?;

        String::from_utf8(plaintext).map_err(|_| corrupted())
    }
}
