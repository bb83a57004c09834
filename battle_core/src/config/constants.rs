//! Tunable combat constants

use serde::{Deserialize, Serialize};

/// Numbers the calculators use that are not part of any combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConstants {
    /// Critical chance (percent) every attack has before luck is added
    #[serde(default = "default_base_crit_chance")]
    pub base_crit_chance: f64,
    /// Attack power multiplier applied on a critical hit
    #[serde(default = "default_crit_damage_multiplier")]
    pub crit_damage_multiplier: f64,
    /// Hit chance divisor while the attacker is blinded
    #[serde(default = "default_blind_accuracy_divisor")]
    pub blind_accuracy_divisor: f64,
    /// Accuracy of a combatant's basic attack (also used for counters)
    #[serde(default = "default_attack_accuracy")]
    pub default_attack_accuracy: i32,
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants {
            base_crit_chance: default_base_crit_chance(),
            crit_damage_multiplier: default_crit_damage_multiplier(),
            blind_accuracy_divisor: default_blind_accuracy_divisor(),
            default_attack_accuracy: default_attack_accuracy(),
        }
    }
}

fn default_base_crit_chance() -> f64 {
    5.0
}
fn default_crit_damage_multiplier() -> f64 {
    2.0
}
fn default_blind_accuracy_divisor() -> f64 {
    3.0
}
fn default_attack_accuracy() -> i32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = CombatConstants::default();
        assert!((constants.base_crit_chance - 5.0).abs() < f64::EPSILON);
        assert!((constants.crit_damage_multiplier - 2.0).abs() < f64::EPSILON);
        assert!((constants.blind_accuracy_divisor - 3.0).abs() < f64::EPSILON);
        assert_eq!(constants.default_attack_accuracy, 100);
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let constants: CombatConstants = toml::from_str("base_crit_chance = 10.0").unwrap();
        assert!((constants.base_crit_chance - 10.0).abs() < f64::EPSILON);
        assert!((constants.crit_damage_multiplier - 2.0).abs() < f64::EPSILON);
    }
}
