//! Spells and reflection

use super::super::Battle;
use crate::calc::{magic, modifier_stack};
use crate::error::BattleError;
use crate::events::{BattleEvent, EventSource, MoveFailureReason};
use crate::moves::Spell;
use crate::types::CombatantId;

impl Battle<'_> {
    /// Deduct the cost of one cast. Returns false, after publishing the
    /// failure, when the caster cannot afford it.
    pub(super) fn pay_for_spell(
        &mut self,
        caster: CombatantId,
        move_name: &str,
        spell: &Spell,
    ) -> Result<bool, BattleError> {
        let cost = {
            let c = self.roster.combatant(caster)?;
            magic::spell_cost(spell, &modifier_stack(c, self.roster.side_of(caster), &self.effects))
        };
        if cost > self.roster.combatant(caster)?.current_mana() {
            self.fail(caster, move_name, MoveFailureReason::NotEnoughMana)?;
            return Ok(false);
        }
        let (c, bus) = self.roster.split_mut(caster)?;
        c.spend_mana(cost, bus)?;
        self.pump()?;
        Ok(true)
    }

    /// Cast an already paid `spell` from `caster` at `target`
    ///
    /// A reflect status on the target bounces the spell at the caster,
    /// scaled by the reflect multiplier; if the caster reflects as well, the
    /// spell fizzles without any damage.
    pub(super) fn resolve_spell(
        &mut self,
        caster: CombatantId,
        target: CombatantId,
        spell: &Spell,
    ) -> Result<(), BattleError> {
        if !self.roster.is_alive(caster) || !self.roster.is_alive(target) {
            return Ok(());
        }
        let caster_side = self.roster.side_of(caster);

        if self.config.narration.show_spell_messages {
            let line = format!("{} casts {} at {}!", self.name_of(caster), spell.name, self.name_of(target));
            self.narrator.write_line(&line);
        }

        let target_reflect = self.roster.combatant(target)?.reflect_multiplier();
        let caster_reflect = self.roster.combatant(caster)?.reflect_multiplier();
        let (victim, multiplier) = match (target_reflect, caster_reflect) {
            (Some(_), Some(_)) => {
                tracing::debug!(spell = %spell.name, "spell reflected back and forth");
                if self.config.narration.show_spell_messages {
                    self.narrator
                        .write_line(&format!("{} bounced back and forth and faded away!", spell.name));
                }
                return Ok(());
            }
            (Some(multiplier), None) => {
                if self.config.narration.show_spell_messages {
                    let line = format!("{} reflected {}!", self.name_of(target), spell.name);
                    self.narrator.write_line(&line);
                }
                (caster, multiplier)
            }
            (None, _) => (target, 1.0),
        };

        let damage = {
            let c = self.roster.combatant(caster)?;
            let v = self.roster.combatant(victim)?;
            let power = magic::magic_power(c, &modifier_stack(c, caster_side, &self.effects), spell) * multiplier;
            let resistance = magic::magic_resistance(
                v,
                &modifier_stack(v, self.roster.side_of(victim), &self.effects),
                spell.element,
            );
            magic::magical_damage(power, resistance)
        };
        tracing::debug!(caster = %self.name_of(caster), victim = %self.name_of(victim), damage, "spell landed");

        {
            let (v, bus) = self.roster.split_mut(victim)?;
            v.take_magical_damage(damage, spell.element, bus)?;
        }
        let source = EventSource::combatant(caster);
        self.roster.bus_mut().publish(
            source,
            BattleEvent::SpellSuccessful {
                target: victim,
                spell: spell.name.clone(),
                damage_dealt: damage,
            },
        );
        if victim != caster && !self.roster.is_alive(victim) {
            self.roster
                .bus_mut()
                .publish(source, BattleEvent::EnemyKilled { enemy: victim });
        }
        self.pump()
    }
}
