//! Fairplay - Provably-Fair Game Outcome Core
//!
//! Deterministic game results derived from a committed server seed, a
//! player-chosen client seed and a per-bet nonce. Outcomes are a pure
//! function of those three values, so any bet can be replayed offline once
//! its server seed has been revealed.
//!
//! The pipeline for one bet:
//! 1. [`seeds::SeedManager`] issues the active seed pair and the next nonce
//! 2. [`engine::ByteStream`] expands them into an HMAC-SHA256 byte stream
//! 3. [`engine::final_values`] turns 4-byte groups into floats in `[0, 1)`
//! 4. the game's mapper in [`games::GameRegistry`] maps floats to an [`Outcome`]

pub mod config;
pub mod engine;
pub mod errors;
pub mod games;
pub mod seeds;
pub mod service;
pub mod verification;

pub use config::{ConfigBuilder, ConfigLoader, FairplayConfig};
pub use engine::{SeedData, PROTOCOL_VERSION};
pub use errors::{FairplayError, FairplayResult};
pub use games::{Game, GameRegistry, GameType, Outcome};
pub use seeds::{InMemorySeedStore, SeedManager, SeedStore};
pub use service::{BetOutcome, FairnessService};
pub use verification::{commitment_hash, verify, verify_commitment, verify_record};
