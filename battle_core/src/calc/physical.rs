//! Physical attack math
//!
//! Formula:
//! - attack = (strength × strength multipliers + move bonus) × dance boost,
//!   × crit damage multiplier on a critical hit
//! - defense = shield defense if a shield is equipped, else
//!   defense × defense multipliers
//! - damage = max(0, attack − defense)
//! - hit chance = (accuracy − evade) / 100, divided by the blind divisor
//! - crit chance = (base crit + luck) / 100 × crit multipliers

use super::effective_stat;
use crate::combatant::Combatant;
use crate::config::CombatConstants;
use crate::status::ModifierStack;
use crate::types::StatType;

/// Attack power before any critical hit
///
/// # Arguments
/// * `strength_bonus` - Flat bonus carried by the move
/// * `boost` - Conditional multiplier (1.0 when no boost applies)
pub fn attack_power(attacker: &Combatant, stack: &ModifierStack, strength_bonus: i32, boost: f64) -> f64 {
    (effective_stat(attacker, StatType::Strength, stack) + strength_bonus as f64) * boost
}

/// Attack power after a critical hit
pub fn critical_attack_power(power: f64, constants: &CombatConstants) -> f64 {
    power * constants.crit_damage_multiplier
}

/// Defense against physical attacks. A shield replaces the stat entirely.
pub fn defense_power(target: &Combatant, stack: &ModifierStack) -> f64 {
    match target.shield() {
        Some(shield) => shield.defense as f64,
        None => effective_stat(target, StatType::Defense, stack),
    }
}

/// Damage dealt by one physical hit
pub fn physical_damage(attack: f64, defense: f64) -> i32 {
    (attack - defense).max(0.0).round() as i32
}

/// Probability that an attack connects
pub fn hit_chance(
    accuracy: i32,
    target: &Combatant,
    target_stack: &ModifierStack,
    blinded: bool,
    constants: &CombatConstants,
) -> f64 {
    let evade = effective_stat(target, StatType::Evade, target_stack);
    let mut chance = (accuracy as f64 - evade) / 100.0;
    if blinded {
        chance /= constants.blind_accuracy_divisor;
    }
    chance.clamp(0.0, 1.0)
}

/// Probability of a critical hit
///
/// `base_override` replaces the configured base crit chance for moves that
/// carry their own.
pub fn crit_chance(
    attacker: &Combatant,
    stack: &ModifierStack,
    base_override: Option<f64>,
    constants: &CombatConstants,
) -> f64 {
    let base = base_override.unwrap_or(constants.base_crit_chance);
    let luck = effective_stat(attacker, StatType::Luck, stack);
    ((base + luck) / 100.0 * stack.crit_multiplier()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Shield;
    use crate::events::EventBus;
    use crate::status::Modifier;
    use crate::types::ShieldId;
    use proptest::prelude::*;

    fn knight() -> Combatant {
        Combatant::new("Knight", 30, 0).with_stats(10, 4, 5, 20, 5)
    }

    #[test]
    fn test_attack_power_with_modifiers() {
        let stack: ModifierStack = vec![Modifier::Stat { stat: StatType::Strength, multiplier: 1.5 }]
            .into_iter()
            .collect();
        let power = attack_power(&knight(), &stack, 2, 2.0);
        assert!((power - 34.0).abs() < 1e-9);
        let crit = critical_attack_power(power, &CombatConstants::default());
        assert!((crit - 68.0).abs() < 1e-9);
    }

    #[test]
    fn test_shield_replaces_defense() {
        let mut bus = EventBus::new();
        let mut target = knight();
        let stack = ModifierStack::new();
        assert!((defense_power(&target, &stack) - 4.0).abs() < 1e-9);

        target.set_shield(&Shield::new("Wall", 5).with_defense(1), ShieldId(0), &mut bus);
        assert!((defense_power(&target, &stack) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_damage_never_negative() {
        assert_eq!(physical_damage(3.0, 10.0), 0);
        assert_eq!(physical_damage(5.0, 0.0), 5);
    }

    #[test]
    fn test_hit_chance_blind() {
        let constants = CombatConstants::default();
        let stack = ModifierStack::new();
        let target = knight();
        let normal = hit_chance(100, &target, &stack, false, &constants);
        let blind = hit_chance(100, &target, &stack, true, &constants);
        assert!((normal - 0.8).abs() < 1e-9);
        assert!((blind - 0.8 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_crit_chance() {
        let constants = CombatConstants::default();
        let stack: ModifierStack = vec![Modifier::CritChance { multiplier: 2.0 }].into_iter().collect();
        let chance = crit_chance(&knight(), &stack, None, &constants);
        assert!((chance - 0.2).abs() < 1e-9);
        let fixed = crit_chance(&knight(), &ModifierStack::new(), Some(0.0), &constants);
        assert!((fixed - 0.05).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_damage_non_negative_and_monotonic(
            attack in 0.0f64..500.0,
            extra in 0.0f64..100.0,
            defense in 0.0f64..500.0,
        ) {
            let base = physical_damage(attack, defense);
            prop_assert!(base >= 0);
            prop_assert!(physical_damage(attack + extra, defense) >= base);
            prop_assert!(physical_damage(attack, defense + extra) <= base);
        }
    }
}
