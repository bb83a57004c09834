//! Battle configuration loading
//!
//! A [`BattleConfig`] is a plain value owned by the battle session. There is
//! no process-wide instance: every calculator receives the constants it needs
//! from the session that owns them.

mod constants;
mod narration;

pub use constants::CombatConstants;
pub use narration::NarrationFlags;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading battle configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path:?}': {error}")]
    Parse {
        error: toml::de::Error,
        path: Option<PathBuf>,
    },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Everything a battle session reads but never derives from combatants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleConfig {
    #[serde(default)]
    pub narration: NarrationFlags,
    #[serde(default)]
    pub constants: CombatConstants,
}

impl BattleConfig {
    /// Default constants with every narration category switched off
    pub fn silent() -> Self {
        BattleConfig {
            narration: NarrationFlags::all_disabled(),
            constants: CombatConstants::default(),
        }
    }

    /// Load a config from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let config: BattleConfig = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.constants.blind_accuracy_divisor <= 0.0 {
            return Err(ConfigError::Validation(
                "blind_accuracy_divisor must be positive".to_string(),
            ));
        }
        if self.constants.crit_damage_multiplier < 1.0 {
            return Err(ConfigError::Validation(
                "crit_damage_multiplier must be at least 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        error: e,
        path: Some(path.to_path_buf()),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        error: e,
        path: Some(path.to_path_buf()),
    })
}

pub(crate) fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        error: e,
        path: None,
    })
}
