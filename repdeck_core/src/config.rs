//! Configuration file support for repdeck.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/repdeck/config.toml`.

use crate::{DeckType, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lowest difficulty level a player can pick
pub const MIN_DIFFICULTY_LEVEL: i32 = 1;

/// Highest difficulty level a player can pick
pub const MAX_DIFFICULTY_LEVEL: i32 = 10;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub affect: AffectConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub game: GameConfig,
}

/// Player preferences
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_difficulty_level")]
    pub difficulty_level: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            difficulty_level: default_difficulty_level(),
        }
    }
}

/// Opponent reaction display settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AffectConfig {
    #[serde(default = "default_visibility_window_ms")]
    pub visibility_window_ms: u64,
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            visibility_window_ms: default_visibility_window_ms(),
        }
    }
}

/// Special ability amounts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_bonus_points")]
    pub bonus_points: u32,

    #[serde(default = "default_steal_points")]
    pub steal_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            bonus_points: default_bonus_points(),
            steal_points: default_steal_points(),
        }
    }
}

/// Game shape
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    #[serde(default)]
    pub deck: DeckType,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            deck: DeckType::default(),
        }
    }
}

// Default value functions
fn default_difficulty_level() -> i32 {
    5
}

fn default_visibility_window_ms() -> u64 {
    crate::affect::DEFAULT_VISIBILITY_WINDOW_MS
}

fn default_bonus_points() -> u32 {
    2
}

fn default_steal_points() -> u32 {
    2
}

fn default_rounds() -> u32 {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            config_path => {
                tracing::info!(
                    "No config file found at {:?}, using defaults",
                    config_path
                );
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("repdeck").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check values the engine relies on callers to keep in range
    pub fn validate(&self) -> Result<()> {
        let level = self.player.difficulty_level;
        if !(MIN_DIFFICULTY_LEVEL..=MAX_DIFFICULTY_LEVEL).contains(&level) {
            return Err(Error::Config(format!(
                "difficulty_level {} is outside {}..={}",
                level, MIN_DIFFICULTY_LEVEL, MAX_DIFFICULTY_LEVEL
            )));
        }
        if self.game.rounds == 0 {
            return Err(Error::Config("rounds must be at least 1".into()));
        }
        Ok(())
    }
}
