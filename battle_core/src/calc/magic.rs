//! Spell math
//!
//! Formula:
//! - power = (spell power + magic strength + element bonus) × magic multipliers
//! - resistance = shield resistance if shielded, else
//!   (magic resistance + element bonus) × resistance multipliers
//! - damage = max(0, power − resistance)
//! - cost = spell cost × spell cost multipliers, rounded

use crate::combatant::Combatant;
use crate::moves::Spell;
use crate::status::ModifierStack;
use crate::types::Element;

/// Raw power of `spell` cast by `caster`
pub fn magic_power(caster: &Combatant, stack: &ModifierStack, spell: &Spell) -> f64 {
    let base = spell.power + caster.magic.strength + caster.magic.strength_bonus(spell.element);
    base as f64 * stack.magic_multiplier(spell.element)
}

/// Resistance of `target` against `element`
pub fn magic_resistance(target: &Combatant, stack: &ModifierStack, element: Element) -> f64 {
    match target.shield() {
        Some(shield) => shield.magic_resistance as f64,
        None => {
            let base = target.magic.resistance + target.magic.resistance_bonus(element);
            base as f64 * stack.resistance_multiplier(element)
        }
    }
}

pub fn magical_damage(power: f64, resistance: f64) -> i32 {
    (power - resistance).max(0.0).round() as i32
}

/// Mana actually charged for `spell`
pub fn spell_cost(spell: &Spell, stack: &ModifierStack) -> i32 {
    (spell.cost as f64 * stack.spell_cost_multiplier()).round().max(0.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::MagicStats;
    use crate::status::Modifier;

    fn mage() -> Combatant {
        let mut magic = MagicStats::new(4, 2);
        magic.strength_bonus.insert(Element::Fire, 3);
        magic.resistance_bonus.insert(Element::Water, 5);
        Combatant::new("Mage", 20, 30).with_magic(magic)
    }

    #[test]
    fn test_power_uses_element_bonus() {
        let fireball = Spell::new("Fireball", Element::Fire, 10, 4);
        let stack: ModifierStack = vec![Modifier::Magic { element: Some(Element::Fire), multiplier: 2.0 }]
            .into_iter()
            .collect();
        assert!((magic_power(&mage(), &stack, &fireball) - 34.0).abs() < 1e-9);

        let frost = Spell::new("Frost", Element::Water, 10, 4);
        assert!((magic_power(&mage(), &stack, &frost) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_resistance_with_bonus() {
        let stack = ModifierStack::new();
        assert!((magic_resistance(&mage(), &stack, Element::Water) - 7.0).abs() < 1e-9);
        assert!((magic_resistance(&mage(), &stack, Element::Fire) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_spell_cost_modifier() {
        let spell = Spell::new("Fireball", Element::Fire, 10, 5);
        let stack: ModifierStack = vec![Modifier::SpellCost { multiplier: 0.5 }].into_iter().collect();
        assert_eq!(spell_cost(&spell, &stack), 3);
        assert_eq!(spell_cost(&spell, &ModifierStack::new()), 5);
        assert_eq!(magical_damage(5.0, 9.0), 0);
    }
}
