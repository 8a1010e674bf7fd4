//! Game configuration.
//!
//! A [`GameConfig`] is read from a JSON file whose every field is optional;
//! missing fields take their defaults. The file is named by the `--config`
//! flag or, failing that, the `NINEGRID_CONFIG` environment variable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::board::{DEFAULT_BOARD_SIZE, WIN_LENGTH};
use crate::deck::{DEFAULT_COPIES_PER_VALUE, DEFAULT_HAND_SIZE};
use crate::eval::HeuristicWeights;
use crate::rules::TiePolicy;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "NINEGRID_CONFIG";

/// Largest supported board side.
pub const MAX_BOARD_SIZE: usize = 25;

/// Errors that can occur while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunable rules and bot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Side of the square board.
    pub board_size: usize,
    /// Cards held in hand between turns.
    pub hand_size: usize,
    /// Copies of each card value in every deck.
    pub copies_per_value: usize,
    /// Outcome of a full tie at the end of the game.
    pub tie_policy: TiePolicy,
    /// Default bot weights for new rooms.
    pub weights: HeuristicWeights,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_size: DEFAULT_BOARD_SIZE,
            hand_size: DEFAULT_HAND_SIZE,
            copies_per_value: DEFAULT_COPIES_PER_VALUE,
            tie_policy: TiePolicy::default(),
            weights: HeuristicWeights::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Loads from `explicit` if given, else from the file named by
    /// [`CONFIG_ENV_VAR`], else returns the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(WIN_LENGTH..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::Invalid(format!(
                "board_size must be between {WIN_LENGTH} and {MAX_BOARD_SIZE}, got {}",
                self.board_size
            )));
        }
        if self.hand_size == 0 {
            return Err(ConfigError::Invalid("hand_size must be at least 1".into()));
        }
        if self.copies_per_value == 0 {
            return Err(ConfigError::Invalid("copies_per_value must be at least 1".into()));
        }
        self.weights
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
