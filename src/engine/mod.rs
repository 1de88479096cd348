//! Deterministic randomness engine
//!
//! Turns a (server seed, client seed, nonce) triple into a reproducible
//! stream of bytes and then into uniform floats in `[0, 1)`.

pub mod floats;
pub mod stream;

pub use floats::{bytes_to_float, final_values};
pub use stream::{ByteStream, SeedData};

/// Identifier of the canonical outcome algorithm.
///
/// Outcomes generated under a different protocol are not comparable.
pub const PROTOCOL_VERSION: &str = "hmac-sha256-stream/v1";
