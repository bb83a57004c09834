//! Read-only progression queries
//!
//! Level thresholds, stat growth and spell unlocks are owned by a
//! collaborator. The engine only asks; it never writes back.

use crate::moves::Spell;
use serde::{Deserialize, Serialize};

/// Stat increases granted on reaching a level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelStats {
    pub max_health: i32,
    pub max_mana: i32,
    pub strength: i32,
    pub defense: i32,
    pub speed: i32,
    pub evade: i32,
    pub luck: i32,
    pub magic_strength: i32,
    pub magic_resistance: i32,
}

/// Source of level thresholds and per-level rewards
pub trait Progression {
    /// Total experience needed to reach `level`, or `None` past the cap
    fn exp_for_level(&self, level: u32) -> Option<u32>;

    /// Stat gains applied on reaching `level`
    fn stat_gains_for_level(&self, level: u32) -> Option<LevelStats>;

    /// Spells unlocked on reaching `level`
    fn spells_for_level(&self, level: u32) -> Vec<Spell>;
}
