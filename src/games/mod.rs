pub mod draw;
pub mod mappers;
pub mod plinko;
pub mod types;

pub use draw::{draw_distinct, DrawPool};
pub use mappers::{GameMapper, GameRegistry};
pub use types::*;
