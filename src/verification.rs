//! Offline outcome verification
//!
//! Everything here is a pure function of its inputs: a player holding the
//! revealed server seed, their client seed and the nonce can replay any bet
//! without contacting the house.

use crate::engine::{SeedData, PROTOCOL_VERSION};
use crate::errors::{FairnessViolation, FairplayResult, ValidationError};
use crate::games::{Game, GameRegistry, Outcome};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// SHA-256 of the server seed string, lowercase hex
pub fn commitment_hash(server_seed: &str) -> String {
    hex::encode(Sha256::digest(server_seed.as_bytes()))
}

/// Check a revealed server seed against its published commitment
pub fn verify_commitment(server_seed: &str, server_seed_hash: &str) -> Result<(), FairnessViolation> {
    let computed_hash = commitment_hash(server_seed);
    if computed_hash.eq_ignore_ascii_case(server_seed_hash) {
        return Ok(());
    }

    Err(FairnessViolation {
        committed_hash: server_seed_hash.to_string(),
        computed_hash,
    })
}

/// Recompute the outcome of a bet
pub fn verify(
    registry: &GameRegistry,
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    game: &Game,
) -> FairplayResult<Outcome> {
    registry.outcome(&SeedData::new(server_seed, client_seed, nonce), game)
}

/// A recorded bet as published to the player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationRequest {
    pub server_seed: String,
    /// Commitment shown before the bet; checked when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_seed_hash: Option<String>,
    pub client_seed: String,
    pub nonce: u64,
    pub game: Game,
    /// Outcome the house reported; compared when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported: Option<Outcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationReport {
    pub protocol: String,
    pub server_seed_hash: String,
    pub nonce: u64,
    pub recomputed: Outcome,
    pub reported: Option<Outcome>,
    /// `false` only when a reported outcome differs from the recomputed one
    pub matches: bool,
}

/// Verify a recorded bet
///
/// The commitment is checked before anything is recomputed; a mismatch is
/// returned as a [`FairnessViolation`](crate::errors::FairnessViolation)
/// error rather than a report. A reported outcome of another game is
/// rejected as malformed input.
pub fn verify_record(registry: &GameRegistry, request: &VerificationRequest) -> FairplayResult<VerificationReport> {
    if let Some(committed) = &request.server_seed_hash {
        if let Err(violation) = verify_commitment(&request.server_seed, committed) {
            warn!("Commitment mismatch for nonce {}: {}", request.nonce, violation);
            return Err(violation.into());
        }
    }

    if let Some(reported) = &request.reported {
        if reported.game_type() != request.game.game_type() {
            return Err(ValidationError::InvalidParameter {
                game: request.game.game_type().to_string(),
                reason: format!("reported outcome is for {}", reported.game_type()),
            }
            .into());
        }
    }

    let recomputed = verify(
        registry,
        &request.server_seed,
        &request.client_seed,
        request.nonce,
        &request.game,
    )?;
    let matches = request.reported.as_ref().map_or(true, |reported| *reported == recomputed);

    if !matches {
        warn!(
            "Reported {} outcome for nonce {} does not match recomputation",
            request.game, request.nonce
        );
    }

    Ok(VerificationReport {
        protocol: PROTOCOL_VERSION.to_string(),
        server_seed_hash: commitment_hash(&request.server_seed),
        nonce: request.nonce,
        recomputed,
        reported: request.reported.clone(),
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FairplayError;

    const SEED_HASH: &str = "ffe054fe7ae0cb6dc65c3af9b61d5209f439851db43d0ba5997337df154668eb";

    fn request(nonce: u64, reported: Option<Outcome>) -> VerificationRequest {
        VerificationRequest {
            server_seed: "a".repeat(64),
            server_seed_hash: Some(SEED_HASH.to_string()),
            client_seed: "client1".to_string(),
            nonce,
            game: Game::Dice,
            reported,
        }
    }

    #[test]
    fn test_commitment_hash() {
        assert_eq!(commitment_hash(&"a".repeat(64)), SEED_HASH);
        assert!(verify_commitment(&"a".repeat(64), &SEED_HASH.to_uppercase()).is_ok());
    }

    #[test]
    fn test_commitment_mismatch() {
        let violation = verify_commitment(&"b".repeat(64), SEED_HASH).unwrap_err();
        assert_eq!(violation.committed_hash, SEED_HASH);
        assert_ne!(violation.computed_hash, SEED_HASH);
    }

    #[test]
    fn test_verify_matches_registry() {
        let registry = GameRegistry::new();
        let outcome = verify(&registry, &"a".repeat(64), "client1", 0, &Game::Dice).unwrap();
        assert_eq!(outcome, Outcome::Dice { face: 1 });
    }

    #[test]
    fn test_verify_record_reports_match() {
        let registry = GameRegistry::new();
        let report = verify_record(&registry, &request(1, Some(Outcome::Dice { face: 4 }))).unwrap();

        assert!(report.matches);
        assert_eq!(report.protocol, PROTOCOL_VERSION);
        assert_eq!(report.server_seed_hash, SEED_HASH);
    }

    #[test]
    fn test_verify_record_reports_mismatch() {
        let registry = GameRegistry::new();
        let report = verify_record(&registry, &request(1, Some(Outcome::Dice { face: 6 }))).unwrap();

        assert!(!report.matches);
        assert_eq!(report.recomputed, Outcome::Dice { face: 4 });
    }

    #[test]
    fn test_verify_record_without_reported_outcome() {
        let registry = GameRegistry::new();
        let mut unreported = request(2, None);
        unreported.server_seed_hash = None;

        let report = verify_record(&registry, &unreported).unwrap();
        assert!(report.matches);
        assert_eq!(report.recomputed, Outcome::Dice { face: 2 });
    }

    #[test]
    fn test_verify_record_checks_commitment_first() {
        let registry = GameRegistry::new();
        let mut forged = request(0, Some(Outcome::Dice { face: 1 }));
        forged.server_seed = "b".repeat(64);

        let err = verify_record(&registry, &forged).unwrap_err();
        assert!(matches!(err, FairplayError::FairnessViolation(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_verify_record_rejects_outcome_of_other_game() {
        let registry = GameRegistry::new();
        let err = verify_record(&registry, &request(1, Some(Outcome::Coin { side: 1 }))).unwrap_err();

        assert!(matches!(
            err,
            FairplayError::Validation(ValidationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_request_json_shape() {
        let json = r#"{
            "server_seed": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "client_seed": "client1",
            "nonce": 0,
            "game": {"game": "mines", "mines": 5}
        }"#;
        let parsed: VerificationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.game, Game::Mines { mines: 5 });
        assert!(parsed.reported.is_none());
        assert!(parsed.server_seed_hash.is_none());
    }
}
