//! Seed record storage
//!
//! The backing store is owned by the surrounding application. Every method
//! that changes state must apply its effects as one atomic step: a nonce is
//! read and incremented in a single operation, and a rotation either lands
//! completely or not at all.

use super::types::{AccountSeeds, OpenRound, RotationRecord, SeedPair, SeedStatus};
use crate::errors::{ConflictError, FairplayResult, ValidationError};
use crate::games::Game;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

/// Round to open together with a nonce issuance
#[derive(Debug, Clone, Copy)]
pub struct RoundRequest {
    pub round_id: Uuid,
    pub game: Game,
}

/// Storage interface for per-account seed records
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Read every record of an account
    async fn load(&self, account: &str) -> FairplayResult<Option<AccountSeeds>>;

    /// Fill the account's empty `ACTIVE`/`NEXT` slots; existing pairs are kept
    async fn insert_missing(
        &self,
        account: &str,
        active: SeedPair,
        next: SeedPair,
    ) -> FairplayResult<AccountSeeds>;

    /// Increment the active nonce and return the pair as it was before
    ///
    /// With `round`, also opens a multi-round game on the issued nonce; fails
    /// without issuing if a round is already open.
    async fn issue_nonce(&self, account: &str, round: Option<RoundRequest>) -> FairplayResult<SeedPair>;

    /// Expire `ACTIVE`, promote `NEXT` with `client_seed`, install `fresh_next`
    ///
    /// Applies only while `ACTIVE` is still the pair committed to by
    /// `expected_active_hash`; otherwise fails with
    /// [`ConflictError::ConcurrentUpdate`] and changes nothing. Transactional
    /// backends return the same error on a serialization failure.
    async fn rotate(
        &self,
        account: &str,
        expected_active_hash: &str,
        client_seed: String,
        fresh_next: SeedPair,
    ) -> FairplayResult<RotationRecord>;

    /// Close an open round, returning it
    async fn close_round(&self, account: &str, round_id: Uuid) -> FairplayResult<OpenRound>;
}

/// In-process store backed by a concurrent map
///
/// Each account entry is mutated under its shard lock, which makes every
/// operation atomic with respect to the others.
#[derive(Default)]
pub struct InMemorySeedStore {
    accounts: DashMap<String, AccountSeeds>,
}

impl InMemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl SeedStore for InMemorySeedStore {
    async fn load(&self, account: &str) -> FairplayResult<Option<AccountSeeds>> {
        Ok(self.accounts.get(account).map(|entry| entry.value().clone()))
    }

    async fn insert_missing(
        &self,
        account: &str,
        active: SeedPair,
        next: SeedPair,
    ) -> FairplayResult<AccountSeeds> {
        let mut entry = self.accounts.entry(account.to_string()).or_default();

        if entry.active.is_none() {
            entry.active = Some(active);
        }
        if entry.next.is_none() {
            entry.next = Some(next);
        }

        Ok(entry.value().clone())
    }

    async fn issue_nonce(&self, account: &str, round: Option<RoundRequest>) -> FairplayResult<SeedPair> {
        let mut entry = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()))?;
        let seeds = entry.value_mut();

        if let (Some(_), Some(open)) = (round, seeds.open_round.as_ref()) {
            return Err(ConflictError::RoundAlreadyOpen {
                account: account.to_string(),
                round_id: open.round_id.to_string(),
            }
            .into());
        }

        let active = seeds
            .active
            .as_mut()
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()))?;
        let issued = active.clone();
        active.nonce += 1;

        if let Some(request) = round {
            seeds.open_round = Some(OpenRound {
                round_id: request.round_id,
                game: request.game,
                nonce: issued.nonce,
                server_seed_hash: issued.server_seed_hash.clone(),
                opened_at: Utc::now(),
            });
        }

        Ok(issued)
    }

    async fn rotate(
        &self,
        account: &str,
        expected_active_hash: &str,
        client_seed: String,
        fresh_next: SeedPair,
    ) -> FairplayResult<RotationRecord> {
        let mut entry = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| ValidationError::NoActiveSeed(account.to_string()))?;
        let seeds = entry.value_mut();

        // All checks run before the first write
        if let Some(open) = &seeds.open_round {
            return Err(ConflictError::RoundInProgress {
                account: account.to_string(),
                round_id: open.round_id.to_string(),
            }
            .into());
        }
        if let Some(active) = &seeds.active {
            if !active.server_seed_hash.eq_ignore_ascii_case(expected_active_hash) {
                return Err(ConflictError::ConcurrentUpdate(account.to_string()).into());
            }
        }
        let (mut expired, mut promoted) = match (seeds.active.take(), seeds.next.take()) {
            (Some(active), Some(next)) => (active, next),
            (active, next) => {
                let err = if active.is_none() {
                    ValidationError::NoActiveSeed(account.to_string())
                } else {
                    ValidationError::NoNextSeed(account.to_string())
                };
                seeds.active = active;
                seeds.next = next;
                return Err(err.into());
            }
        };

        let now = Utc::now();
        expired.status = SeedStatus::Expired;
        expired.expired_at = Some(now);

        promoted.status = SeedStatus::Active;
        promoted.client_seed = client_seed;
        promoted.nonce = 0;
        promoted.activated_at = Some(now);

        seeds.expired.push(expired.clone());
        seeds.active = Some(promoted.clone());
        seeds.next = Some(fresh_next.clone());

        Ok(RotationRecord {
            expired,
            active: promoted,
            next: fresh_next,
        })
    }

    async fn close_round(&self, account: &str, round_id: Uuid) -> FairplayResult<OpenRound> {
        let mut entry = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| ValidationError::RoundNotFound(round_id.to_string()))?;

        match entry.open_round.take() {
            Some(open) if open.round_id == round_id => Ok(open),
            other => {
                entry.open_round = other;
                Err(ValidationError::RoundNotFound(round_id.to_string()).into())
            }
        }
    }
}
