//! Error types for the fairplay core
//!
//! Every failure is classified by what the caller is allowed to do about it:
//! validation errors are rejected before any state changes, conflicts may be
//! retried from scratch, and fairness violations are never retried.

use thiserror::Error;

/// Root error type for all fairplay operations
#[derive(Debug, Error)]
pub enum FairplayError {
    /// Request rejected before any state mutation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Concurrent state change prevented the operation
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// Revealed server seed does not match its published commitment
    #[error("Fairness violation: {0}")]
    FairnessViolation(#[from] FairnessViolation),

    /// Seed encryption or decryption failure
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Input and lookup errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Client seed must not be empty")]
    EmptyClientSeed,

    #[error("Client seed contains a non-printable or non-ASCII character at position {position}")]
    InvalidClientSeedCharacter { position: usize },

    #[error("Client seed is {length} characters long (max {max_length})")]
    ClientSeedTooLong { length: usize, max_length: usize },

    #[error("Invalid parameter for {game}: {reason}")]
    InvalidParameter { game: String, reason: String },

    #[error("Missing parameter for {game}: {parameter}")]
    MissingParameter { game: String, parameter: String },

    #[error("Unknown game type: {0}")]
    UnknownGame(String),

    #[error("No active seed pair for account {0}")]
    NoActiveSeed(String),

    #[error("No next seed pair for account {0}")]
    NoNextSeed(String),

    #[error("Seed pair not found for account {account} with hash {server_seed_hash}")]
    SeedNotFound {
        account: String,
        server_seed_hash: String,
    },

    #[error("Seed pair {server_seed_hash} is still {status}; server seed is not revealed")]
    SeedNotRevealed {
        server_seed_hash: String,
        status: String,
    },

    #[error("Round {0} not found")]
    RoundNotFound(String),

    #[error("Expected {expected} floats, got {actual}")]
    DrawCountMismatch { expected: usize, actual: usize },
}

/// Errors raised when the account's seed state changed underneath an operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Account {account} has a round in progress ({round_id}); finish it before rotating seeds")]
    RoundInProgress { account: String, round_id: String },

    #[error("Concurrent update on account {0}; retry the operation")]
    ConcurrentUpdate(String),

    #[error("Account {account} already has a round in progress ({round_id})")]
    RoundAlreadyOpen { account: String, round_id: String },
}

/// Commitment mismatch details
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("sha256(server_seed) = {computed_hash}, committed hash was {committed_hash}")]
pub struct FairnessViolation {
    pub committed_hash: String,
    pub computed_hash: String,
}

/// Encryption at rest errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Encryption key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Encryption key is not valid hex: {0}")]
    InvalidKeyEncoding(String),

    #[error("Server seed encryption failed")]
    EncryptionFailed,

    #[error("Stored server seed for {server_seed_hash} could not be decrypted")]
    SeedCorrupted { server_seed_hash: String },
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl FairplayError {
    /// Whether the whole operation may be retried from scratch
    pub fn is_retryable(&self) -> bool {
        matches!(self, FairplayError::Conflict(ConflictError::ConcurrentUpdate(_)))
    }

    /// Whether this error proves a broken commitment
    pub fn is_fairness_violation(&self) -> bool {
        matches!(self, FairplayError::FairnessViolation(_))
    }
}

// Convenience type alias for Results
pub type FairplayResult<T> = Result<T, FairplayError>;
