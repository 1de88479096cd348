use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Dice,
    Coin,
    Dice2,
    Limbo,
    Wheel,
    Keno,
    Mines,
    Plinko,
    Roulette,
}

impl GameType {
    pub const ALL: [GameType; 9] = [
        GameType::Dice,
        GameType::Coin,
        GameType::Dice2,
        GameType::Limbo,
        GameType::Wheel,
        GameType::Keno,
        GameType::Mines,
        GameType::Plinko,
        GameType::Roulette,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Dice => "dice",
            GameType::Coin => "coin",
            GameType::Dice2 => "dice2",
            GameType::Limbo => "limbo",
            GameType::Wheel => "wheel",
            GameType::Keno => "keno",
            GameType::Mines => "mines",
            GameType::Plinko => "plinko",
            GameType::Roulette => "roulette",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .into_iter()
            .find(|game| game.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownGame(s.to_string()))
    }
}

/// Plinko payout risk tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl FromStr for RiskTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            other => Err(ValidationError::InvalidParameter {
                game: GameType::Plinko.to_string(),
                reason: format!("unknown risk tier '{}'", other),
            }),
        }
    }
}

/// Roulette wheel layout
///
/// `European` pockets are `floor(37e)` (0..=36). `American` pockets are
/// shifted down by one (-1..=35), with -1 standing for the "00" pocket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RouletteVariant {
    European,
    American,
}

impl FromStr for RouletteVariant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "european" => Ok(RouletteVariant::European),
            "american" => Ok(RouletteVariant::American),
            other => Err(ValidationError::InvalidParameter {
                game: GameType::Roulette.to_string(),
                reason: format!("unknown variant '{}'", other),
            }),
        }
    }
}

/// A game selection together with its shape parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Game {
    Dice,
    Coin,
    Dice2,
    Limbo,
    Wheel,
    Keno,
    Mines { mines: u8 },
    Plinko { rows: u8, risk: RiskTier },
    Roulette { variant: RouletteVariant },
}

impl Game {
    pub fn game_type(&self) -> GameType {
        match self {
            Game::Dice => GameType::Dice,
            Game::Coin => GameType::Coin,
            Game::Dice2 => GameType::Dice2,
            Game::Limbo => GameType::Limbo,
            Game::Wheel => GameType::Wheel,
            Game::Keno => GameType::Keno,
            Game::Mines { .. } => GameType::Mines,
            Game::Plinko { .. } => GameType::Plinko,
            Game::Roulette { .. } => GameType::Roulette,
        }
    }

    /// Build a game from its type and the loosely-typed request parameters
    pub fn from_parts(
        game_type: GameType,
        parameter: Option<u32>,
        risk: Option<RiskTier>,
        variant: Option<RouletteVariant>,
    ) -> Result<Self, ValidationError> {
        let require = |name: &str| {
            parameter.ok_or_else(|| ValidationError::MissingParameter {
                game: game_type.to_string(),
                parameter: name.to_string(),
            })
        };
        let narrow = |value: u32| {
            u8::try_from(value).map_err(|_| ValidationError::InvalidParameter {
                game: game_type.to_string(),
                reason: format!("{} is out of range", value),
            })
        };

        let game = match game_type {
            GameType::Dice => Game::Dice,
            GameType::Coin => Game::Coin,
            GameType::Dice2 => Game::Dice2,
            GameType::Limbo => Game::Limbo,
            GameType::Wheel => Game::Wheel,
            GameType::Keno => Game::Keno,
            GameType::Mines => Game::Mines {
                mines: narrow(require("mines")?)?,
            },
            GameType::Plinko => Game::Plinko {
                rows: narrow(require("rows")?)?,
                risk: risk.ok_or_else(|| ValidationError::MissingParameter {
                    game: game_type.to_string(),
                    parameter: "risk".to_string(),
                })?,
            },
            GameType::Roulette => Game::Roulette {
                variant: variant.unwrap_or(RouletteVariant::European),
            },
        };

        Ok(game)
    }

    /// Whether the game spans several player actions under one draw
    pub fn is_multi_round(&self) -> bool {
        matches!(self, Game::Mines { .. })
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::Mines { mines } => write!(f, "mines({})", mines),
            Game::Plinko { rows, risk } => write!(f, "plinko({}, {:?})", rows, risk),
            Game::Roulette { variant } => write!(f, "roulette({:?})", variant),
            other => write!(f, "{}", other.game_type()),
        }
    }
}

/// Exact decimal with two fractional digits, stored as hundredths
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Hundredths(pub u64);

impl Hundredths {
    /// Truncate a non-negative float to two decimals
    pub fn from_f64_floor(value: f64) -> Self {
        Hundredths((value * 100.0).floor() as u64)
    }
}

impl fmt::Display for Hundredths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Roulette pocket, where -1 is the American "00"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Pocket(pub i8);

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == -1 {
            f.write_str("00")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Structured result of one bet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Outcome {
    Dice { face: u8 },
    Coin { side: u8 },
    Dice2 { roll: Hundredths },
    Limbo { multiplier: Hundredths },
    Wheel { segment: u8 },
    Keno { numbers: Vec<u8> },
    Mines { mines: Vec<u8>, grid: Vec<bool> },
    Plinko {
        bucket: u8,
        slot: u8,
        multiplier: Hundredths,
    },
    Roulette {
        variant: RouletteVariant,
        pocket: Pocket,
    },
}

impl Outcome {
    pub fn game_type(&self) -> GameType {
        match self {
            Outcome::Dice { .. } => GameType::Dice,
            Outcome::Coin { .. } => GameType::Coin,
            Outcome::Dice2 { .. } => GameType::Dice2,
            Outcome::Limbo { .. } => GameType::Limbo,
            Outcome::Wheel { .. } => GameType::Wheel,
            Outcome::Keno { .. } => GameType::Keno,
            Outcome::Mines { .. } => GameType::Mines,
            Outcome::Plinko { .. } => GameType::Plinko,
            Outcome::Roulette { .. } => GameType::Roulette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_parsing() {
        assert_eq!("dice".parse::<GameType>().unwrap(), GameType::Dice);
        assert_eq!("PLINKO".parse::<GameType>().unwrap(), GameType::Plinko);
        assert!(matches!(
            "hilo".parse::<GameType>(),
            Err(ValidationError::UnknownGame(_))
        ));
    }

    #[test]
    fn test_from_parts_requires_parameters() {
        assert!(matches!(
            Game::from_parts(GameType::Mines, None, None, None),
            Err(ValidationError::MissingParameter { .. })
        ));
        assert!(matches!(
            Game::from_parts(GameType::Plinko, Some(8), None, None),
            Err(ValidationError::MissingParameter { .. })
        ));
        assert!(matches!(
            Game::from_parts(GameType::Mines, Some(300), None, None),
            Err(ValidationError::InvalidParameter { .. })
        ));

        let plinko = Game::from_parts(GameType::Plinko, Some(12), Some(RiskTier::High), None).unwrap();
        assert_eq!(plinko, Game::Plinko { rows: 12, risk: RiskTier::High });

        let roulette = Game::from_parts(GameType::Roulette, None, None, None).unwrap();
        assert_eq!(roulette, Game::Roulette { variant: RouletteVariant::European });
    }

    #[test]
    fn test_hundredths_formatting() {
        assert_eq!(Hundredths(0).to_string(), "0.00");
        assert_eq!(Hundredths(1151).to_string(), "11.51");
        assert_eq!(Hundredths(100_000_000).to_string(), "1000000.00");
        assert_eq!(Hundredths::from_f64_floor(1.999).0, 199);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = Outcome::Dice2 { roll: Hundredths(868) };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["game"], "dice2");
        assert_eq!(json["roll"], 868);
        assert_eq!(Pocket(-1).to_string(), "00");
    }
}
