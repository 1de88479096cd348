//! HMAC-SHA256 keyed byte stream
//!
//! Block `n` of the stream is `HMAC-SHA256(server_seed, "{client_seed}:{nonce}:{n}")`.
//! Bytes are yielded in digest order, block after block, for as long as the
//! caller keeps pulling. The layout is bit-exact and must never change:
//! historical outcomes are verified against it.

use crate::errors::{CryptoError, FairplayResult};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Size of one HMAC-SHA256 digest block
pub const BLOCK_SIZE: usize = 32;

/// Inputs that fully determine a bet's random stream
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedData {
    /// Plaintext server seed (hex string, used as the HMAC key bytes)
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
}

impl SeedData {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    /// Open a byte stream starting at `cursor` bytes into the sequence
    pub fn stream(&self, cursor: u64) -> FairplayResult<ByteStream<'_>> {
        ByteStream::new(self, cursor)
    }
}

/// Lazy, unbounded byte iterator over consecutive HMAC blocks
pub struct ByteStream<'a> {
    seed: &'a SeedData,
    keyed: HmacSha256,
    block_index: u64,
    byte_index: usize,
    block: [u8; BLOCK_SIZE],
}

impl<'a> ByteStream<'a> {
    pub fn new(seed: &'a SeedData, cursor: u64) -> FairplayResult<Self> {
        let keyed = HmacSha256::new_from_slice(seed.server_seed.as_bytes())
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: BLOCK_SIZE,
                actual: seed.server_seed.len(),
            })?;

        let block_index = cursor / BLOCK_SIZE as u64;
        let byte_index = (cursor % BLOCK_SIZE as u64) as usize;
        let block = digest_block(&keyed, seed, block_index);

        Ok(Self {
            seed,
            keyed,
            block_index,
            byte_index,
            block,
        })
    }
}

impl Iterator for ByteStream<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.byte_index == BLOCK_SIZE {
            self.block_index += 1;
            self.byte_index = 0;
            self.block = digest_block(&self.keyed, self.seed, self.block_index);
        }

        let byte = self.block[self.byte_index];
        self.byte_index += 1;
        Some(byte)
    }
}

/// Compute one 32-byte block of the stream
fn digest_block(keyed: &HmacSha256, seed: &SeedData, block_index: u64) -> [u8; BLOCK_SIZE] {
    let message = format!("{}:{}:{}", seed.client_seed, seed.nonce, block_index);
    let mut mac = keyed.clone();
    mac.update(message.as_bytes());
    mac.finalize().into_bytes().into()
}
