//! Seed lifecycle management
//!
//! Issues, rotates and tracks seed pairs per account and owns the nonce
//! counter. Server seeds only leave this module in plaintext for bet
//! computation or after their pair has expired.

use super::cipher::SeedCipher;
use super::store::{RoundRequest, SeedStore};
use super::types::{AccountSeeds, Rotation, SeedPair, SeedPairView, SeedStatus};
use crate::config::SeedConfig;
use crate::engine::SeedData;
use crate::errors::{FairplayResult, ValidationError};
use crate::games::Game;
use crate::verification::{commitment_hash, verify_commitment};
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Random bytes behind a server seed
pub const SERVER_SEED_BYTES: usize = 32;
/// Random bytes behind a generated client seed
pub const CLIENT_SEED_BYTES: usize = 8;

/// Seed data issued for a single bet
#[derive(Debug, Clone)]
pub struct IssuedSeed {
    pub seed: SeedData,
    pub server_seed_hash: String,
}

/// Generate a fresh server seed: 32 random bytes, hex encoded
pub fn generate_server_seed() -> String {
    let mut bytes = [0u8; SERVER_SEED_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a default client seed: 8 random bytes, hex encoded
pub fn generate_client_seed() -> String {
    let mut bytes = [0u8; CLIENT_SEED_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Check a player-supplied client seed
pub fn validate_client_seed(client_seed: &str, max_length: usize) -> Result<(), ValidationError> {
    if client_seed.is_empty() {
        return Err(ValidationError::EmptyClientSeed);
    }
    if let Some(position) = client_seed.chars().position(|c| !c.is_ascii_graphic()) {
        return Err(ValidationError::InvalidClientSeedCharacter { position });
    }
    if client_seed.len() > max_length {
        return Err(ValidationError::ClientSeedTooLong {
            length: client_seed.len(),
            max_length,
        });
    }
    Ok(())
}

/// Issues and rotates seed pairs on top of a [`SeedStore`]
pub struct SeedManager {
    store: Arc<dyn SeedStore>,
    cipher: SeedCipher,
    max_client_seed_length: usize,
}

impl SeedManager {
    pub fn new(store: Arc<dyn SeedStore>, cipher: SeedCipher, config: &SeedConfig) -> Self {
        Self {
            store,
            cipher,
            max_client_seed_length: config.max_client_seed_length,
        }
    }

    /// Ensure the account has an `ACTIVE` and a `NEXT` pair
    ///
    /// Safe to call repeatedly; existing pairs are never replaced.
    pub async fn create_initial_pair(&self, account: &str) -> FairplayResult<SeedPairView> {
        if let Some(seeds) = self.store.load(account).await? {
            if let (true, Some(active)) = (seeds.is_complete(), seeds.active.as_ref()) {
                return self.view(active);
            }
        }

        let mut active = self.fresh_pair(account, SeedStatus::Active)?;
        active.client_seed = generate_client_seed();
        active.activated_at = Some(active.created_at);
        let next = self.fresh_pair(account, SeedStatus::Next)?;

        let seeds = self.store.insert_missing(account, active, next).await?;
        let active = seeds
            .active
            .as_ref()
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()))?;

        debug!("Seed pairs ready for account {} (active {})", account, active.server_seed_hash);
        self.view(active)
    }

    /// Retire the active pair and promote the next one with a new client seed
    ///
    /// The active seed is decrypted and checked against its commitment before
    /// the store is touched, and the store only swaps while that same pair is
    /// still active. Any failure leaves the account unchanged.
    pub async fn rotate(&self, account: &str, new_client_seed: &str) -> FairplayResult<Rotation> {
        validate_client_seed(new_client_seed, self.max_client_seed_length)?;

        let seeds = self.load(account).await?;
        let active = seeds
            .active
            .as_ref()
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()))?;
        let revealed = self.open(active)?;

        let fresh_next = self.fresh_pair(account, SeedStatus::Next)?;
        let record = self
            .store
            .rotate(account, &active.server_seed_hash, new_client_seed.to_string(), fresh_next)
            .await?;

        info!(
            "Rotated seeds for account {}: expired {} after {} bets, active {}",
            account, record.expired.server_seed_hash, record.expired.nonce, record.active.server_seed_hash
        );

        Ok(Rotation {
            revealed_server_seed: revealed,
            expired_server_seed_hash: record.expired.server_seed_hash,
            expired_nonce: record.expired.nonce,
            new_server_seed_hash: record.active.server_seed_hash,
            new_client_seed: record.active.client_seed,
            next_server_seed_hash: record.next.server_seed_hash,
        })
    }

    /// Atomically take the next nonce of the active pair
    pub async fn next_nonce(&self, account: &str) -> FairplayResult<IssuedSeed> {
        let pair = self.store.issue_nonce(account, None).await?;
        self.issued(pair)
    }

    /// Take the next nonce and open a multi-round game on it
    pub async fn open_round(&self, account: &str, round_id: Uuid, game: Game) -> FairplayResult<IssuedSeed> {
        let pair = self
            .store
            .issue_nonce(account, Some(RoundRequest { round_id, game }))
            .await?;
        self.issued(pair)
    }

    /// Close a multi-round game, allowing rotation again
    pub async fn finish_round(&self, account: &str, round_id: Uuid) -> FairplayResult<()> {
        let round = self.store.close_round(account, round_id).await?;
        debug!("Closed round {} ({}) for account {}", round_id, round.game, account);
        Ok(())
    }

    /// Commitment of the active pair
    pub async fn commitment(&self, account: &str) -> FairplayResult<String> {
        let seeds = self.load(account).await?;
        seeds
            .active
            .map(|pair| pair.server_seed_hash)
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()).into())
    }

    /// Plaintext server seed of an expired pair
    pub async fn revealed_seed(&self, account: &str, server_seed_hash: &str) -> FairplayResult<String> {
        let seeds = self.load(account).await?;
        let pair = seeds
            .find(server_seed_hash)
            .ok_or_else(|| ValidationError::SeedNotFound {
                account: account.to_string(),
                server_seed_hash: server_seed_hash.to_string(),
            })?;

        if pair.status != SeedStatus::Expired {
            return Err(ValidationError::SeedNotRevealed {
                server_seed_hash: pair.server_seed_hash.clone(),
                status: pair.status.to_string(),
            }
            .into());
        }

        self.open(pair)
    }

    /// All pairs of the account, newest first
    pub async fn history(&self, account: &str) -> FairplayResult<Vec<SeedPairView>> {
        let seeds = self.load(account).await?;

        seeds
            .next
            .iter()
            .chain(seeds.active.iter())
            .chain(seeds.expired.iter().rev())
            .map(|pair| self.view(pair))
            .collect()
    }

    async fn load(&self, account: &str) -> FairplayResult<AccountSeeds> {
        self.store
            .load(account)
            .await?
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()).into())
    }

    fn fresh_pair(&self, account: &str, status: SeedStatus) -> FairplayResult<SeedPair> {
        let server_seed = generate_server_seed();
        let server_seed_hash = commitment_hash(&server_seed);
        let sealed = self.cipher.encrypt(&server_seed, &server_seed_hash)?;

        Ok(SeedPair {
            account: account.to_string(),
            server_seed: sealed,
            server_seed_hash,
            client_seed: String::new(),
            nonce: 0,
            status,
            created_at: Utc::now(),
            activated_at: None,
            expired_at: None,
        })
    }

    /// Decrypt a pair's server seed and check it against its commitment
    fn open(&self, pair: &SeedPair) -> FairplayResult<String> {
        let server_seed = self.cipher.decrypt(&pair.server_seed, &pair.server_seed_hash)?;
        if let Err(violation) = verify_commitment(&server_seed, &pair.server_seed_hash) {
            warn!("Stored seed for account {} breaks its commitment: {}", pair.account, violation);
            return Err(violation.into());
        }
        Ok(server_seed)
    }

    fn issued(&self, pair: SeedPair) -> FairplayResult<IssuedSeed> {
        let server_seed = self.open(&pair)?;
        Ok(IssuedSeed {
            seed: SeedData::new(server_seed, pair.client_seed, pair.nonce),
            server_seed_hash: pair.server_seed_hash,
        })
    }

    fn view(&self, pair: &SeedPair) -> FairplayResult<SeedPairView> {
        let server_seed = match pair.status {
            SeedStatus::Expired => Some(self.open(pair)?),
            SeedStatus::Active | SeedStatus::Next => None,
        };

        Ok(SeedPairView {
            server_seed_hash: pair.server_seed_hash.clone(),
            server_seed,
            client_seed: pair.client_seed.clone(),
            nonce: pair.nonce,
            status: pair.status,
            created_at: pair.created_at,
            expired_at: pair.expired_at,
        })
    }
}
