//! progression_core - Level tables for battle_core
//!
//! A level table maps levels to the total experience needed to reach them,
//! the stat gains granted on arrival and the spells unlocked there. Tables
//! are written in TOML and loaded into a [`LevelTableRegistry`]:
//!
//! ```toml
//! [table]
//! id = "warrior"
//!
//! [[spells]]
//! name = "Ember"
//! element = "fire"
//! power = 6
//! cost = 2
//!
//! [[levels]]
//! level = 2
//! exp = 10
//! spells = ["Ember"]
//!
//! [levels.stats]
//! max_health = 5
//! strength = 2
//! ```

mod config;
mod registry;
mod table;

pub use config::{LevelConfig, LevelTableFileConfig, TableConfig};
pub use registry::LevelTableRegistry;
pub use table::LevelTable;

use std::path::PathBuf;
use thiserror::Error;

/// Error loading level table configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}

/// A level table that parsed but does not make sense
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Level {0} is listed twice")]
    DuplicateLevel(u32),
    #[error("Levels must start at 2 and have no gaps, found {0}")]
    LevelGap(u32),
    #[error("Experience for level {level} ({exp}) does not exceed the previous level")]
    ExpNotIncreasing { level: u32, exp: u32 },
    #[error("Negative stat gain at level {0}")]
    NegativeGain(u32),
    #[error("Spell '{0}' is defined twice")]
    DuplicateSpell(String),
    #[error("Spell '{0}' has negative power or cost")]
    InvalidSpell(String),
    #[error("Level {level} unlocks unknown spell '{spell}'")]
    UnknownSpell { level: u32, spell: String },
}
