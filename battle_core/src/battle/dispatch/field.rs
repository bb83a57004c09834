//! Field effects
//!
//! Immediate kinds hit every living member of each affected side at once.
//! The lasting kind registers one counter per affected side; a field effect
//! aimed at both sides therefore gets two independent counters.

use super::super::Battle;
use crate::calc::{magic, modifier_stack};
use crate::effect::{FieldEffect, FieldEffectKind};
use crate::error::BattleError;
use crate::events::{BattleEvent, EventSource};
use crate::moves::Spell;
use crate::types::{CombatantId, Side};

impl Battle<'_> {
    pub(crate) fn apply_field_effect(&mut self, user: CombatantId, effect: &FieldEffect) -> Result<(), BattleError> {
        effect.validate()?;
        let user_side = self.side_of(user)?;
        for side in effect.target.sides(user_side) {
            tracing::debug!(effect = %effect.name, %side, "field effect");
            match &effect.kind {
                FieldEffectKind::Lasting { modifier } => {
                    let turns = effect
                        .duration
                        .ok_or_else(|| BattleError::contract("lasting field effect without duration"))?;
                    self.effects
                        .register_field(&effect.name, *modifier, side, user, turns);
                    if self.config.narration.show_status_messages {
                        let line = format!("{} settles over the {} side!", effect.name, side);
                        self.narrator.write_line(&line);
                    }
                }
                FieldEffectKind::UndoDebuffs => {
                    for member in self.side_members(side)? {
                        let (combatant, bus) = self.roster.split_mut(member)?;
                        combatant.remove_debuffs(bus);
                    }
                }
                FieldEffectKind::MagicDamage { element, power } => {
                    let spell = Spell::new(effect.name.clone(), *element, *power, 0);
                    for member in self.side_members(side)? {
                        self.field_damage(user, user_side, member, &spell)?;
                    }
                }
                FieldEffectKind::GrantShield { shield } => {
                    for member in self.side_members(side)? {
                        self.grant_shield(member, shield)?;
                    }
                }
                FieldEffectKind::RestoreHealth { percent } => {
                    for member in self.side_members(side)? {
                        let (combatant, bus) = self.roster.split_mut(member)?;
                        let amount = combatant.max_health() * percent / 100;
                        combatant.heal(amount.max(0), bus)?;
                    }
                }
                FieldEffectKind::RestoreMana { percent } => {
                    for member in self.side_members(side)? {
                        let (combatant, bus) = self.roster.split_mut(member)?;
                        let amount = combatant.max_mana() * percent / 100;
                        combatant.restore_mana(amount.max(0), bus)?;
                    }
                }
            }
            self.pump()?;
        }
        Ok(())
    }

    fn side_members(&self, side: Side) -> Result<Vec<CombatantId>, BattleError> {
        self.roster.living_members(self.group_for(side))
    }

    fn field_damage(
        &mut self,
        user: CombatantId,
        user_side: Side,
        victim: CombatantId,
        spell: &Spell,
    ) -> Result<(), BattleError> {
        if !self.roster.is_alive(victim) {
            return Ok(());
        }
        let damage = {
            let u = self.roster.combatant(user)?;
            let v = self.roster.combatant(victim)?;
            let power = magic::magic_power(u, &modifier_stack(u, Some(user_side), &self.effects), spell);
            let resistance = magic::magic_resistance(
                v,
                &modifier_stack(v, self.roster.side_of(victim), &self.effects),
                spell.element,
            );
            magic::magical_damage(power, resistance)
        };
        {
            let (v, bus) = self.roster.split_mut(victim)?;
            v.take_magical_damage(damage, spell.element, bus)?;
        }
        if victim != user && !self.roster.is_alive(victim) {
            self.roster
                .bus_mut()
                .publish(EventSource::combatant(user), BattleEvent::EnemyKilled { enemy: victim });
        }
        self.pump()
    }
}
