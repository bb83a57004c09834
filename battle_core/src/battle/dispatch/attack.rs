//! Physical attacks
//!
//! Order of resolution:
//! 1. auto-evade (unless the attack cannot be evaded), possibly countering
//! 2. hit roll (skipped for never-miss attacks)
//! 3. crit roll, attack power against defense power
//! 4. damage and kill events, then on-hit effects
//! 5. one counter-attack if the target holds a counter status

use super::super::Battle;
use crate::calc::{modifier_stack, physical};
use crate::error::BattleError;
use crate::events::{BattleEvent, EventSource};
use crate::moves::{AttackEffect, AttackMove};
use crate::types::CombatantId;

impl Battle<'_> {
    pub(super) fn resolve_attack(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        attack: &AttackMove,
        is_counter: bool,
    ) -> Result<(), BattleError> {
        if !self.roster.is_alive(attacker) || !self.roster.is_alive(target) {
            return Ok(());
        }
        let source = EventSource::combatant(attacker);

        if !is_counter && self.config.narration.show_attack_messages {
            let line = format!("{} attacks {}!", self.name_of(attacker), self.name_of(target));
            self.narrator.write_line(&line);
        }

        if let Some(counters) = self.roster.combatant(target)?.auto_evade() {
            if !attack.cannot_be_evaded() {
                self.roster
                    .bus_mut()
                    .publish(source, BattleEvent::AttackMissed { target, evaded: true });
                self.pump()?;
                if counters && !is_counter {
                    self.counter_attack(target, attacker)?;
                }
                return Ok(());
            }
        }

        let attacker_side = self.roster.side_of(attacker);
        let target_side = self.roster.side_of(target);
        let (hit_chance, crit_chance, base_power, defense) = {
            let a = self.roster.combatant(attacker)?;
            let t = self.roster.combatant(target)?;
            let a_stack = modifier_stack(a, attacker_side, &self.effects);
            let t_stack = modifier_stack(t, target_side, &self.effects);

            let boost = attack
                .effects
                .iter()
                .filter_map(|effect| match effect {
                    AttackEffect::DanceBoost { dance, multiplier } => attacker_side
                        .filter(|side| self.effects.has_dance(*side, *dance))
                        .map(|_| *multiplier),
                    _ => None,
                })
                .product::<f64>();

            (
                physical::hit_chance(attack.accuracy, t, &t_stack, a.is_blind(), &self.config.constants),
                physical::crit_chance(a, &a_stack, attack.crit_chance, &self.config.constants),
                physical::attack_power(a, &a_stack, attack.strength_bonus, boost),
                physical::defense_power(t, &t_stack),
            )
        };

        if !attack.never_misses() && !self.oracle.event_occurs(hit_chance) {
            self.roster
                .bus_mut()
                .publish(source, BattleEvent::AttackMissed { target, evaded: false });
            return self.pump();
        }

        let mut power = base_power;
        if self.oracle.event_occurs(crit_chance) {
            power = physical::critical_attack_power(power, &self.config.constants);
            self.roster
                .bus_mut()
                .publish(source, BattleEvent::CriticalHit { target });
        }
        let damage = physical::physical_damage(power, defense);
        tracing::debug!(attacker = %self.name_of(attacker), target = %self.name_of(target), power, defense, damage, "attack hit");

        let lost = {
            let (victim, bus) = self.roster.split_mut(target)?;
            victim.take_physical_damage(damage, bus)?
        };
        let bus = self.roster.bus_mut();
        bus.publish(
            source,
            BattleEvent::AttackSuccessful {
                target,
                damage_dealt: damage,
            },
        );
        if !self.roster.is_alive(target) {
            self.roster
                .bus_mut()
                .publish(source, BattleEvent::EnemyKilled { enemy: target });
        }
        self.pump()?;

        self.apply_on_hit(attacker, target, attack, lost)?;

        if !is_counter
            && self.roster.is_alive(target)
            && self.roster.is_alive(attacker)
            && self.roster.combatant(target)?.has_counter_attack()
        {
            self.counter_attack(target, attacker)?;
        }
        Ok(())
    }

    fn apply_on_hit(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        attack: &AttackMove,
        health_lost: i32,
    ) -> Result<(), BattleError> {
        for effect in &attack.effects {
            match effect {
                AttackEffect::Drain { percent } => {
                    let amount = health_lost * percent / 100;
                    if amount > 0 {
                        let (combatant, bus) = self.roster.split_mut(attacker)?;
                        combatant.heal(amount, bus)?;
                    }
                }
                AttackEffect::ManaBurn { amount } => {
                    let (victim, bus) = self.roster.split_mut(target)?;
                    victim.drain_mana(*amount, bus);
                }
                AttackEffect::NeverMiss
                | AttackEffect::CannotBeEvaded
                | AttackEffect::DanceBoost { .. } => {}
            }
        }
        self.pump()
    }

    /// `by` strikes back at `against` with a basic attack that cannot chain
    fn counter_attack(&mut self, by: CombatantId, against: CombatantId) -> Result<(), BattleError> {
        self.roster.bus_mut().publish(
            EventSource::combatant(by),
            BattleEvent::CounterAttack { target: against },
        );
        self.pump()?;
        let basic = AttackMove {
            accuracy: self.config.constants.default_attack_accuracy,
            crit_chance: None,
            strength_bonus: 0,
            effects: Vec::new(),
        };
        self.resolve_attack(by, against, &basic, true)
    }
}
