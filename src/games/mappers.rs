//! Game outcome mappers
//!
//! One mapper per game type, each turning the bet's uniform floats into the
//! game's structured outcome. Mappers are registered once in a
//! [`GameRegistry`] and selected by [`GameType`].

use super::draw::DrawPool;
use super::plinko;
use super::types::{Game, GameType, Hundredths, Outcome, Pocket, RiskTier, RouletteVariant};
use crate::engine::{final_values, SeedData};
use crate::errors::{FairplayResult, ValidationError};
use std::collections::HashMap;

/// Numbers drawn per Keno round
pub const KENO_DRAWS: usize = 10;
/// Keno numbers run from 1 to this value
pub const KENO_POOL: u8 = 40;
/// Mines board size
pub const MINES_TILES: u8 = 25;
/// Limbo scale constant, 2^24
pub const LIMBO_SCALE: f64 = 16_777_216.0;
/// Limbo multiplier ceiling
pub const LIMBO_MAX: f64 = 1_000_000.0;

/// Maps uniform floats to one game's outcome
pub trait GameMapper: Send + Sync {
    /// How many floats the game consumes for these parameters
    fn floats_needed(&self, game: &Game) -> Result<usize, ValidationError>;

    /// Map exactly `floats_needed` floats to an outcome
    fn draw(&self, game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError>;
}

fn single(floats: &[f64]) -> Result<f64, ValidationError> {
    match floats {
        [e] => Ok(*e),
        _ => Err(ValidationError::DrawCountMismatch {
            expected: 1,
            actual: floats.len(),
        }),
    }
}

fn mismatched(game: &Game, expected: GameType) -> ValidationError {
    ValidationError::InvalidParameter {
        game: expected.to_string(),
        reason: format!("mapper received {}", game),
    }
}

fn check_len(floats: &[f64], expected: usize) -> Result<(), ValidationError> {
    if floats.len() != expected {
        return Err(ValidationError::DrawCountMismatch {
            expected,
            actual: floats.len(),
        });
    }
    Ok(())
}

pub struct DiceMapper;

impl GameMapper for DiceMapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(1)
    }

    fn draw(&self, _game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let e = single(floats)?;
        Ok(Outcome::Dice {
            face: (e * 6.0).floor() as u8 + 1,
        })
    }
}

pub struct CoinMapper;

impl GameMapper for CoinMapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(1)
    }

    fn draw(&self, _game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let e = single(floats)?;
        Ok(Outcome::Coin {
            side: (e * 2.0).floor() as u8 + 1,
        })
    }
}

/// Over/under roll in [0.00, 100.00]
pub struct Dice2Mapper;

impl GameMapper for Dice2Mapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(1)
    }

    fn draw(&self, _game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let e = single(floats)?;
        Ok(Outcome::Dice2 {
            roll: Hundredths((e * 10_001.0).floor() as u64),
        })
    }
}

pub struct LimboMapper;

impl GameMapper for LimboMapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(1)
    }

    fn draw(&self, _game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let e = single(floats)?;
        let raw = LIMBO_SCALE / (LIMBO_SCALE * e + 1.0);
        Ok(Outcome::Limbo {
            multiplier: Hundredths::from_f64_floor(raw.min(LIMBO_MAX)),
        })
    }
}

/// Segment 1..=100; payouts per risk tier are applied by the caller
pub struct WheelMapper;

impl GameMapper for WheelMapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(1)
    }

    fn draw(&self, _game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let e = single(floats)?;
        Ok(Outcome::Wheel {
            segment: (e * 100.0).floor() as u8 + 1,
        })
    }
}

pub struct KenoMapper;

impl GameMapper for KenoMapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(KENO_DRAWS)
    }

    fn draw(&self, _game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        check_len(floats, KENO_DRAWS)?;

        let mut pool = DrawPool::new();
        let numbers = floats
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let remaining = f64::from(KENO_POOL - i as u8);
                pool.insert((e * remaining).ceil() as u8)
            })
            .collect();

        Ok(Outcome::Keno { numbers })
    }
}

pub struct MinesMapper;

impl MinesMapper {
    fn mine_count(game: &Game) -> Result<u8, ValidationError> {
        match game {
            Game::Mines { mines } if (1..MINES_TILES).contains(mines) => Ok(*mines),
            Game::Mines { mines } => Err(ValidationError::InvalidParameter {
                game: GameType::Mines.to_string(),
                reason: format!("mine count must be 1..={}, got {}", MINES_TILES - 1, mines),
            }),
            other => Err(mismatched(other, GameType::Mines)),
        }
    }
}

impl GameMapper for MinesMapper {
    fn floats_needed(&self, game: &Game) -> Result<usize, ValidationError> {
        Self::mine_count(game).map(usize::from)
    }

    fn draw(&self, game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let count = Self::mine_count(game)?;
        check_len(floats, usize::from(count))?;

        let mut pool = DrawPool::new();
        let mines: Vec<u8> = floats
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let remaining = f64::from(MINES_TILES - i as u8);
                pool.insert((e * remaining).floor() as u8)
            })
            .collect();

        let grid = (0..MINES_TILES).map(|tile| pool.contains(tile)).collect();

        Ok(Outcome::Mines { mines, grid })
    }
}

pub struct PlinkoMapper;

impl PlinkoMapper {
    fn board(game: &Game) -> Result<(u8, RiskTier), ValidationError> {
        match *game {
            Game::Plinko { rows, risk } if (plinko::MIN_ROWS..=plinko::MAX_ROWS).contains(&rows) => Ok((rows, risk)),
            Game::Plinko { rows, .. } => Err(ValidationError::InvalidParameter {
                game: GameType::Plinko.to_string(),
                reason: format!("rows must be {}..={}, got {}", plinko::MIN_ROWS, plinko::MAX_ROWS, rows),
            }),
            ref other => Err(mismatched(other, GameType::Plinko)),
        }
    }
}

impl GameMapper for PlinkoMapper {
    fn floats_needed(&self, game: &Game) -> Result<usize, ValidationError> {
        Self::board(game).map(|_| 1)
    }

    fn draw(&self, game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let (rows, risk) = Self::board(game)?;
        let e = single(floats)?;

        let slot = plinko::binomial_slot(rows, e);
        let multiplier = plinko::multiplier(rows, risk, slot).ok_or_else(|| {
            ValidationError::InvalidParameter {
                game: GameType::Plinko.to_string(),
                reason: format!("no payout for slot {} on {} rows", slot, rows),
            }
        })?;

        Ok(Outcome::Plinko {
            bucket: (f64::from(rows) * e).floor() as u8 + 1,
            slot,
            multiplier,
        })
    }
}

pub struct RouletteMapper;

impl GameMapper for RouletteMapper {
    fn floats_needed(&self, _game: &Game) -> Result<usize, ValidationError> {
        Ok(1)
    }

    fn draw(&self, game: &Game, floats: &[f64]) -> Result<Outcome, ValidationError> {
        let Game::Roulette { variant } = *game else {
            return Err(mismatched(game, GameType::Roulette));
        };
        let e = single(floats)?;
        let index = (e * 37.0).floor() as i8;

        let pocket = match variant {
            RouletteVariant::European => index,
            RouletteVariant::American => index - 1,
        };

        Ok(Outcome::Roulette {
            variant,
            pocket: Pocket(pocket),
        })
    }
}

/// Dispatch table from game type to mapper, built once at startup
pub struct GameRegistry {
    mappers: HashMap<GameType, Box<dyn GameMapper>>,
}

impl GameRegistry {
    /// Registry with every supported game
    pub fn new() -> Self {
        let mut mappers: HashMap<GameType, Box<dyn GameMapper>> = HashMap::new();
        mappers.insert(GameType::Dice, Box::new(DiceMapper));
        mappers.insert(GameType::Coin, Box::new(CoinMapper));
        mappers.insert(GameType::Dice2, Box::new(Dice2Mapper));
        mappers.insert(GameType::Limbo, Box::new(LimboMapper));
        mappers.insert(GameType::Wheel, Box::new(WheelMapper));
        mappers.insert(GameType::Keno, Box::new(KenoMapper));
        mappers.insert(GameType::Mines, Box::new(MinesMapper));
        mappers.insert(GameType::Plinko, Box::new(PlinkoMapper));
        mappers.insert(GameType::Roulette, Box::new(RouletteMapper));
        Self { mappers }
    }

    pub fn mapper(&self, game_type: GameType) -> Result<&dyn GameMapper, ValidationError> {
        self.mappers
            .get(&game_type)
            .map(|mapper| mapper.as_ref())
            .ok_or_else(|| ValidationError::UnknownGame(game_type.to_string()))
    }

    /// Compute the outcome of one bet
    ///
    /// Pure function of the seed data and the game; floats are drawn from
    /// cursor 0 in a single request so multi-draw games stay correlated.
    pub fn outcome(&self, seed: &SeedData, game: &Game) -> FairplayResult<Outcome> {
        let mapper = self.mapper(game.game_type())?;
        let count = mapper.floats_needed(game)?;
        let floats = final_values(seed, count)?;
        let outcome = mapper.draw(game, &floats)?;

        tracing::debug!(
            "Computed {} outcome for nonce {} from {} floats",
            game,
            seed.nonce,
            count
        );
        Ok(outcome)
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
