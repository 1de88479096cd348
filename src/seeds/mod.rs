//! Seed pairs, their storage and their lifecycle

pub mod cipher;
pub mod manager;
pub mod store;
pub mod types;

pub use cipher::SeedCipher;
pub use manager::{generate_client_seed, generate_server_seed, validate_client_seed, IssuedSeed, SeedManager};
pub use store::{InMemorySeedStore, RoundRequest, SeedStore};
pub use types::*;
