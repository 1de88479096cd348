//! Fairness service
//!
//! The outward interface used by the betting layer. It ties seed management
//! to outcome generation: every bet consumes exactly one nonce of the
//! account's active pair, and multi-round games hold off seed rotation until
//! they are settled.

use crate::config::FairplayConfig;
use crate::errors::{FairplayError, FairplayResult, ValidationError};
use crate::games::{Game, GameRegistry, Outcome};
use crate::seeds::{IssuedSeed, Rotation, SeedManager, SeedPairView, SeedStore};
use crate::verification::{self, VerificationReport, VerificationRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of one bet, ready to be persisted by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetOutcome {
    pub outcome: Outcome,
    pub nonce: u64,
    pub server_seed_hash: String,
    pub client_seed: String,
    /// Set for multi-round games; pass to [`FairnessService::settle_round`]
    pub round_id: Option<Uuid>,
}

pub struct FairnessService {
    seeds: SeedManager,
    registry: GameRegistry,
}

impl FairnessService {
    pub fn new(store: Arc<dyn SeedStore>, config: &FairplayConfig) -> FairplayResult<Self> {
        let cipher = config.seeds.cipher()?;
        Ok(Self {
            seeds: SeedManager::new(store, cipher, &config.seeds),
            registry: GameRegistry::new(),
        })
    }

    pub fn seeds(&self) -> &SeedManager {
        &self.seeds
    }

    /// Generate the outcome of a bet on the account's active seed pair
    ///
    /// Game parameters are validated before a nonce is issued, so a rejected
    /// request leaves the account untouched. Accounts without seeds get their
    /// first pair here.
    pub async fn request_outcome(&self, account: &str, game: Game) -> FairplayResult<BetOutcome> {
        self.registry.mapper(game.game_type())?.floats_needed(&game)?;

        let round_id = game.is_multi_round().then(Uuid::new_v4);
        let issued = match self.issue(account, round_id, game).await {
            Err(FairplayError::Validation(ValidationError::NoActiveSeed(_))) => {
                self.seeds.create_initial_pair(account).await?;
                self.issue(account, round_id, game).await?
            }
            other => other?,
        };

        let outcome = match self.registry.outcome(&issued.seed, &game) {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Some(round_id) = round_id {
                    if let Err(close_err) = self.seeds.finish_round(account, round_id).await {
                        warn!("Failed to release round {} for account {}: {}", round_id, account, close_err);
                    }
                }
                return Err(e);
            }
        };

        debug!(
            "Account {} played {} with nonce {} under {}",
            account, game, issued.seed.nonce, issued.server_seed_hash
        );

        Ok(BetOutcome {
            outcome,
            nonce: issued.seed.nonce,
            server_seed_hash: issued.server_seed_hash,
            client_seed: issued.seed.client_seed,
            round_id,
        })
    }

    /// Settle a multi-round game, allowing seed rotation again
    pub async fn settle_round(&self, account: &str, round_id: Uuid) -> FairplayResult<()> {
        self.seeds.finish_round(account, round_id).await
    }

    /// Reveal the active server seed and switch to the next pair
    pub async fn rotate_seed(&self, account: &str, new_client_seed: &str) -> FairplayResult<Rotation> {
        self.seeds.rotate(account, new_client_seed).await
    }

    /// Commitment of the account's active pair, creating the account's seeds if needed
    pub async fn get_commitment(&self, account: &str) -> FairplayResult<String> {
        let active = self.seeds.create_initial_pair(account).await?;
        Ok(active.server_seed_hash)
    }

    pub async fn history(&self, account: &str) -> FairplayResult<Vec<SeedPairView>> {
        self.seeds.history(account).await
    }

    /// Recompute a bet from its revealed inputs
    pub fn verify(&self, server_seed: &str, client_seed: &str, nonce: u64, game: &Game) -> FairplayResult<Outcome> {
        verification::verify(&self.registry, server_seed, client_seed, nonce, game)
    }

    pub fn verify_record(&self, request: &VerificationRequest) -> FairplayResult<VerificationReport> {
        verification::verify_record(&self.registry, request)
    }

    async fn issue(&self, account: &str, round_id: Option<Uuid>, game: Game) -> FairplayResult<IssuedSeed> {
        match round_id {
            Some(round_id) => self.seeds.open_round(account, round_id, game).await,
            None => self.seeds.next_nonce(account).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::errors::ConflictError;
    use crate::games::RiskTier;
    use crate::seeds::{InMemorySeedStore, SeedStore};

    fn service() -> (FairnessService, Arc<InMemorySeedStore>) {
        let config = ConfigBuilder::new()
            .encryption_key("42".repeat(32))
            .build()
            .unwrap();
        let store = Arc::new(InMemorySeedStore::new());
        (FairnessService::new(store.clone(), &config).unwrap(), store)
    }

    #[test]
    fn test_requires_encryption_key() {
        let store = Arc::new(InMemorySeedStore::new());
        assert!(FairnessService::new(store, &FairplayConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_first_bet_creates_seeds_and_uses_nonce_zero() {
        let (service, _) = service();

        let bet = service.request_outcome("wallet-1", Game::Dice).await.unwrap();
        assert_eq!(bet.nonce, 0);
        assert!(bet.round_id.is_none());
        assert_eq!(service.get_commitment("wallet-1").await.unwrap(), bet.server_seed_hash);

        let second = service.request_outcome("wallet-1", Game::Coin).await.unwrap();
        assert_eq!(second.nonce, 1);
    }

    #[tokio::test]
    async fn test_invalid_game_does_not_consume_nonce() {
        let (service, store) = service();
        service.get_commitment("wallet-1").await.unwrap();

        assert!(service.request_outcome("wallet-1", Game::Mines { mines: 0 }).await.is_err());
        assert!(service.request_outcome("wallet-1", Game::Mines { mines: 25 }).await.is_err());
        assert!(service
            .request_outcome("wallet-1", Game::Plinko { rows: 7, risk: RiskTier::Low })
            .await
            .is_err());

        let seeds = store.load("wallet-1").await.unwrap().unwrap();
        assert_eq!(seeds.active.unwrap().nonce, 0);
        assert!(seeds.open_round.is_none());
    }

    #[tokio::test]
    async fn test_rotation_reveals_seed_that_verifies_past_bets() {
        let (service, _) = service();
        let bet = service
            .request_outcome("wallet-1", Game::Plinko { rows: 12, risk: RiskTier::Medium })
            .await
            .unwrap();

        let rotation = service.rotate_seed("wallet-1", "player-choice").await.unwrap();
        assert_eq!(rotation.expired_server_seed_hash, bet.server_seed_hash);

        let replayed = service
            .verify(
                &rotation.revealed_server_seed,
                &bet.client_seed,
                bet.nonce,
                &Game::Plinko { rows: 12, risk: RiskTier::Medium },
            )
            .unwrap();
        assert_eq!(replayed, bet.outcome);

        let report = service
            .verify_record(&VerificationRequest {
                server_seed: rotation.revealed_server_seed.clone(),
                server_seed_hash: Some(bet.server_seed_hash.clone()),
                client_seed: bet.client_seed.clone(),
                nonce: bet.nonce,
                game: Game::Plinko { rows: 12, risk: RiskTier::Medium },
                reported: Some(bet.outcome.clone()),
            })
            .unwrap();
        assert!(report.matches);
    }

    #[tokio::test]
    async fn test_mines_round_blocks_rotation_until_settled() {
        let (service, _) = service();
        let bet = service
            .request_outcome("wallet-1", Game::Mines { mines: 4 })
            .await
            .unwrap();
        let round_id = bet.round_id.unwrap();

        match bet.outcome {
            Outcome::Mines { ref mines, ref grid } => {
                assert_eq!(mines.len(), 4);
                assert_eq!(grid.iter().filter(|cell| **cell).count(), 4);
            }
            ref other => panic!("unexpected outcome {:?}", other),
        }

        let err = service.rotate_seed("wallet-1", "fresh").await.unwrap_err();
        assert!(matches!(
            err,
            FairplayError::Conflict(ConflictError::RoundInProgress { .. })
        ));

        let err = service
            .request_outcome("wallet-1", Game::Mines { mines: 2 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FairplayError::Conflict(ConflictError::RoundAlreadyOpen { .. })
        ));

        // Single-round games keep working while the board is open
        assert_eq!(service.request_outcome("wallet-1", Game::Dice).await.unwrap().nonce, 1);

        service.settle_round("wallet-1", round_id).await.unwrap();
        assert!(service.rotate_seed("wallet-1", "fresh").await.is_ok());
    }

    #[tokio::test]
    async fn test_history_reveals_only_expired_pairs() {
        let (service, _) = service();
        service.request_outcome("wallet-1", Game::Wheel).await.unwrap();
        service.rotate_seed("wallet-1", "one").await.unwrap();
        service.rotate_seed("wallet-1", "two").await.unwrap();

        let history = service.history("wallet-1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(
            history.iter().filter(|view| view.server_seed.is_some()).count(),
            2
        );
    }
}
