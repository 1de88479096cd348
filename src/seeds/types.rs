use crate::games::Game;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Seed pair lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeedStatus {
    /// Commitment shown, not yet used for bets
    Next,
    /// Used for betting
    Active,
    /// Retired; server seed revealed
    Expired,
}

impl fmt::Display for SeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedStatus::Next => write!(f, "NEXT"),
            SeedStatus::Active => write!(f, "ACTIVE"),
            SeedStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// Server seed as stored at rest
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedSeed {
    /// Hex-encoded 16-byte initialization vector, unique per record
    pub iv: String,
    /// Hex-encoded ciphertext with authentication tag
    pub ciphertext: String,
}

impl fmt::Debug for EncryptedSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedSeed")
            .field("iv", &self.iv)
            .field("ciphertext_len", &(self.ciphertext.len() / 2))
            .finish()
    }
}

/// Stored seed pair record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedPair {
    pub account: String,
    pub server_seed: EncryptedSeed,
    /// SHA-256 of the server seed, published before any bet
    pub server_seed_hash: String,
    pub client_seed: String,
    /// Nonce the next bet under this pair will use
    pub nonce: u64,
    pub status: SeedStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
}

/// Multi-round game holding the account's active seed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenRound {
    pub round_id: Uuid,
    pub game: Game,
    pub nonce: u64,
    pub server_seed_hash: String,
    pub opened_at: DateTime<Utc>,
}

/// Every seed record of one account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSeeds {
    pub active: Option<SeedPair>,
    pub next: Option<SeedPair>,
    /// Retired pairs, oldest first
    pub expired: Vec<SeedPair>,
    pub open_round: Option<OpenRound>,
}

impl AccountSeeds {
    /// Find any pair of the account by its commitment
    pub fn find(&self, server_seed_hash: &str) -> Option<&SeedPair> {
        self.active
            .iter()
            .chain(self.next.iter())
            .chain(self.expired.iter())
            .find(|pair| pair.server_seed_hash.eq_ignore_ascii_case(server_seed_hash))
    }

    pub fn is_complete(&self) -> bool {
        self.active.is_some() && self.next.is_some()
    }
}

/// Outward-facing view of a seed pair
///
/// `server_seed` is only populated once the pair is expired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedPairView {
    pub server_seed_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_seed: Option<String>,
    pub client_seed: String,
    pub nonce: u64,
    pub status: SeedStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
}

/// Records touched by a rotation, as returned by the store
#[derive(Debug, Clone)]
pub struct RotationRecord {
    pub expired: SeedPair,
    pub active: SeedPair,
    pub next: SeedPair,
}

/// Result of a seed rotation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rotation {
    /// Plaintext of the pair that was just retired
    pub revealed_server_seed: String,
    pub expired_server_seed_hash: String,
    /// Final nonce of the retired pair (number of bets placed under it)
    pub expired_nonce: u64,
    pub new_server_seed_hash: String,
    pub new_client_seed: String,
    pub next_server_seed_hash: String,
}
