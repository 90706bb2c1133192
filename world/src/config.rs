//! Match configuration loaded from TOML.

use std::{fs, path::Path};

use outpost_core::{UnitKind, UnitSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PlacementError;

/// Smallest board side that fits both headquarters with their spawn rings.
pub const MIN_BOARD_SIDE: u32 = 8;

/// Largest board side accepted from configuration or snapshots.
pub const MAX_BOARD_SIDE: u32 = 1024;

/// Errors raised while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has unknown keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The board cannot hold both headquarters.
    #[error("board {width}x{height} is smaller than {min}x{min}", min = MIN_BOARD_SIDE)]
    BoardTooSmall {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The board exceeds the largest supported side.
    #[error("board {width}x{height} is larger than {max}x{max}", max = MAX_BOARD_SIDE)]
    BoardTooLarge {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The turn limit is zero.
    #[error("turn limit must be positive")]
    NoTurns,
    /// More starting citizens than free cells around a headquarters.
    #[error("{requested} starting citizens exceed the {available} cells around a headquarters")]
    TooManyCitizens {
        /// Configured starting citizens.
        requested: u32,
        /// Cells bordering a headquarters.
        available: u32,
    },
    /// Generated entities could not be placed.
    #[error("board generation failed: {0}")]
    Placement(#[from] PlacementError),
}

/// Parameters of a generated match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Turn limit.
    pub max_turns: u32,
    /// Population cap per team.
    pub max_pop: u32,
    /// Food each team starts with.
    pub starting_food: u32,
    /// Citizens placed around each headquarters.
    pub starting_citizens: u32,
    /// Walls placed on the board, in mirrored pairs.
    pub wall_count: u32,
    /// Loose food placed on the board, in mirrored pairs.
    pub food_count: u32,
    /// Seed of the board generator.
    pub seed: u64,
    /// Unit constants shared by both teams.
    pub units: UnitSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            max_turns: 500,
            max_pop: 20,
            starting_food: 5,
            starting_citizens: 2,
            wall_count: 24,
            food_count: 16,
            seed: 0x0075_7470_6f73_7400,
            units: UnitSettings::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document; missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that a board can be generated from the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_BOARD_SIDE || self.height < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_BOARD_SIDE || self.height > MAX_BOARD_SIDE {
            return Err(ConfigError::BoardTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_turns == 0 {
            return Err(ConfigError::NoTurns);
        }
        let footprint = UnitKind::Headquarters.footprint();
        let available = 2 * (footprint.width() + footprint.height());
        if self.starting_citizens > available {
            return Err(ConfigError::TooManyCitizens {
                requested: self.starting_citizens,
                available,
            });
        }
        Ok(())
    }
}
