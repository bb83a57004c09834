use battle_core::{LevelStats, Spell};
use serde::Deserialize;

/// TOML configuration for a level table file
#[derive(Debug, Deserialize)]
pub struct LevelTableFileConfig {
    pub table: TableConfig,
    /// Spells the levels below may unlock, by name
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub levels: Vec<LevelConfig>,
}

/// Configuration for the table itself
#[derive(Debug, Deserialize)]
pub struct TableConfig {
    pub id: String,
}

/// One level past the first
#[derive(Debug, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    /// Total experience needed to reach this level
    pub exp: u32,
    #[serde(default)]
    pub stats: LevelStats,
    #[serde(default)]
    pub spells: Vec<String>,
}
