//! Calculators - effective numbers under stacked modifiers
//!
//! Every calculator takes a [`ModifierStack`] built by [`modifier_stack`]:
//! the combatant's own status modifiers plus the lasting field modifiers of
//! its side. Multipliers of the same kind stack multiplicatively.

pub mod magic;
pub mod physical;

use crate::combatant::Combatant;
use crate::effect::EffectTracker;
use crate::status::ModifierStack;
use crate::types::{Side, StatType};

/// Collect every modifier that applies to `combatant`
pub fn modifier_stack(combatant: &Combatant, side: Option<Side>, effects: &EffectTracker) -> ModifierStack {
    let mut stack: ModifierStack = combatant.status_modifiers().collect();
    if let Some(side) = side {
        for modifier in effects.modifiers_for(side) {
            stack.push(modifier);
        }
    }
    tracing::trace!(combatant = %combatant.display_name(), modifiers = stack.len(), "modifier stack");
    stack
}

/// Base stat scaled by every multiplier for that stat
pub fn effective_stat(combatant: &Combatant, stat: StatType, stack: &ModifierStack) -> f64 {
    combatant.stat(stat) as f64 * stack.stat_multiplier(stat)
}

/// Speed used for queue ordering
pub fn effective_speed(combatant: &Combatant, stack: &ModifierStack) -> f64 {
    effective_stat(combatant, StatType::Speed, stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::status::{Modifier, Status};
    use crate::types::CombatantId;

    #[test]
    fn test_speed_combines_status_and_side_modifiers() {
        let mut bus = EventBus::new();
        let mut hero = Combatant::new("Hero", 10, 0).with_stats(0, 0, 10, 0, 0);
        hero.add_status(
            Status::modifier(Modifier::Stat { stat: StatType::Speed, multiplier: 2.0 }, 3),
            &mut bus,
        );
        let mut effects = EffectTracker::new();
        effects.register_field(
            "Tailwind",
            Modifier::Stat { stat: StatType::Speed, multiplier: 1.5 },
            Side::Human,
            CombatantId(9),
            3,
        );

        let with_side = modifier_stack(&hero, Some(Side::Human), &effects);
        assert!((effective_speed(&hero, &with_side) - 30.0).abs() < 1e-9);

        let other_side = modifier_stack(&hero, Some(Side::Enemy), &effects);
        assert!((effective_speed(&hero, &other_side) - 20.0).abs() < 1e-9);
    }
}
