//! Event routing: subscription wiring, bookkeeping and narration
//!
//! Bookkeeping subscriptions always run. Narration subscriptions check their
//! flag when the event is delivered, so a flag flipped mid-battle applies to
//! the very next event.

use super::Battle;
use crate::error::BattleError;
use crate::events::{BattleEvent, EventEnvelope, EventKind, EventSource, SubscriberRole};
use crate::types::{CombatantId, DamageKind, GroupId, Side};

const FIGHTER_BOOKKEEPING: &[EventKind] = &[
    EventKind::Killed,
    EventKind::Revived,
    EventKind::ShieldAdded,
    EventKind::TurnEnded,
];

const FIGHTER_NARRATION: &[EventKind] = &[
    EventKind::DamageTaken,
    EventKind::Healed,
    EventKind::AttackMissed,
    EventKind::CriticalHit,
    EventKind::CounterAttack,
    EventKind::StatusAdded,
    EventKind::StatusRemoved,
    EventKind::ShieldAdded,
    EventKind::Killed,
    EventKind::Revived,
    EventKind::ManaLost,
    EventKind::ManaRestored,
    EventKind::ExpGained,
    EventKind::LeveledUp,
    EventKind::SpellLearned,
    EventKind::MoveLearned,
    EventKind::MoveFailed,
    EventKind::TurnEnded,
];

const SHIELD_BOOKKEEPING: &[EventKind] = &[EventKind::ShieldDestroyed];

const SHIELD_NARRATION: &[EventKind] = &[
    EventKind::DamageTaken,
    EventKind::ShieldFortified,
    EventKind::ShieldDestroyed,
];

const GROUP_BOOKKEEPING: &[EventKind] = &[
    EventKind::TeamDefeated,
    EventKind::TeamRan,
    EventKind::FighterAdded,
];

const GROUP_NARRATION: &[EventKind] = &[
    EventKind::TeamDefeated,
    EventKind::TeamRan,
    EventKind::FighterAdded,
    EventKind::RoundEnded,
];

impl Battle<'_> {
    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    fn wire(&mut self, source: EventSource, bookkeeping: &[EventKind], narration: &[EventKind]) {
        if !self.wired.insert(source) {
            return;
        }
        let bus = self.roster.bus_mut();
        for kind in bookkeeping {
            let id = bus.subscribe(source, *kind, SubscriberRole::Bookkeeping);
            self.subscriptions.push(id);
        }
        for kind in narration {
            let id = bus.subscribe(source, *kind, SubscriberRole::Narration);
            self.subscriptions.push(id);
        }
    }

    pub(super) fn wire_group(&mut self, group: GroupId) -> Result<(), BattleError> {
        self.roster.group(group)?;
        self.wire(EventSource::group(group), GROUP_BOOKKEEPING, GROUP_NARRATION);
        Ok(())
    }

    /// Subscribe to a combatant and to its shield, if it has one
    pub(super) fn wire_fighter(&mut self, id: CombatantId) -> Result<(), BattleError> {
        let shield = self.roster.combatant(id)?.shield_source();
        self.wire(EventSource::combatant(id), FIGHTER_BOOKKEEPING, FIGHTER_NARRATION);
        if let Some(shield) = shield {
            self.wire_shield(shield);
        }
        Ok(())
    }

    pub(super) fn wire_shield(&mut self, shield: EventSource) {
        self.wire(shield, SHIELD_BOOKKEEPING, SHIELD_NARRATION);
    }

    /// Drop every subscription on a shield that is gone
    pub(super) fn unwire(&mut self, source: EventSource) {
        if self.wired.remove(&source) {
            let removed = self.roster.bus_mut().unsubscribe_source(&source);
            tracing::trace!(?source, removed, "unwired");
        }
    }

    // ------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------

    /// Deliver pending events until the queue is empty
    pub(crate) fn pump(&mut self) -> Result<(), BattleError> {
        while let Some(envelope) = self.roster.bus_mut().next_pending() {
            if let Err(e) = envelope.validate() {
                tracing::error!(error = %e, "misrouted event");
                return Err(e);
            }
            let subscribers = self.roster.bus().subscribers_for(&envelope);
            for subscription in subscribers {
                match subscription.role {
                    SubscriberRole::Bookkeeping => self.bookkeep(&envelope)?,
                    SubscriberRole::Narration => self.narrate(&envelope),
                }
            }
        }
        Ok(())
    }

    fn bookkeep(&mut self, envelope: &EventEnvelope) -> Result<(), BattleError> {
        match (&envelope.event, envelope.source) {
            (BattleEvent::Killed, EventSource::Combatant { id }) => self.on_killed(id),
            (BattleEvent::Revived { .. }, EventSource::Combatant { id }) => {
                if let Some(group) = self.roster.combatant(id)?.group() {
                    self.roster.update_defeat(group)?;
                }
                Ok(())
            }
            (BattleEvent::ShieldAdded { shield }, EventSource::Combatant { id }) => {
                self.wire_shield(EventSource::Shield {
                    id: *shield,
                    owner: id,
                });
                Ok(())
            }
            (BattleEvent::ShieldDestroyed, source @ EventSource::Shield { .. }) => {
                self.unwire(source);
                Ok(())
            }
            (BattleEvent::TurnEnded, EventSource::Combatant { id }) => {
                let (combatant, bus) = self.roster.split_mut(id)?;
                combatant.tick_statuses(bus);
                Ok(())
            }
            (BattleEvent::FighterAdded { fighter }, EventSource::Group { .. }) => {
                self.wire_fighter(*fighter)
            }
            (BattleEvent::TeamDefeated, _) | (BattleEvent::TeamRan, _) => {
                self.decided = true;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn on_killed(&mut self, id: CombatantId) -> Result<(), BattleError> {
        let (reward, group) = {
            let combatant = self.roster.combatant(id)?;
            (combatant.exp_reward, combatant.group())
        };
        if self.roster.side_of(id) == Some(Side::Enemy) {
            self.exp_pool = self.exp_pool.saturating_add(reward);
            tracing::debug!(enemy = %self.name_of(id), reward, pool = self.exp_pool, "experience accrued");
        }
        for orphaned in self.effects.remove_owner(id) {
            tracing::debug!(effect = %orphaned.name, side = %orphaned.side, "effect lost its owners");
        }
        self.roster.combatant_mut(id)?.reset_battle_state();
        if let Some(group) = group {
            self.roster.update_defeat(group)?;
        }
        Ok(())
    }

    fn narrate(&mut self, envelope: &EventEnvelope) {
        let flags = &self.config.narration;
        let line = match (envelope.source, &envelope.event) {
            // Shield events
            (EventSource::Shield { owner, .. }, BattleEvent::DamageTaken { amount, .. }) => flags
                .show_shield_messages
                .then(|| format!("{}'s shield absorbed {} damage!", self.name_of(owner), amount)),
            (EventSource::Shield { owner, .. }, BattleEvent::ShieldFortified { defense_gained, health_gained }) => {
                flags.show_shield_messages.then(|| {
                    format!(
                        "{}'s shield was fortified (+{} defense, +{} health)!",
                        self.name_of(owner),
                        defense_gained,
                        health_gained
                    )
                })
            }
            (EventSource::Shield { owner, .. }, BattleEvent::ShieldDestroyed) => flags
                .show_shield_messages
                .then(|| format!("{}'s shield was destroyed!", self.name_of(owner))),

            // Group events
            (EventSource::Group { id }, BattleEvent::TeamDefeated) => flags
                .show_death_messages
                .then(|| format!("{} has been defeated!", self.group_name(id))),
            (EventSource::Group { id }, BattleEvent::TeamRan) => flags
                .show_intro_messages
                .then(|| format!("{} ran away!", self.group_name(id))),
            (EventSource::Group { id }, BattleEvent::FighterAdded { fighter }) => flags
                .show_intro_messages
                .then(|| format!("{} joined {}!", self.name_of(*fighter), self.group_name(id))),
            (EventSource::Group { id }, BattleEvent::RoundEnded { round }) => flags
                .show_turn_messages
                .then(|| format!("Round {} is over for {}.", round, self.group_name(id))),

            // Combatant events
            (EventSource::Combatant { id }, event) => self.fighter_line(id, event),
            _ => None,
        };
        if let Some(line) = line {
            self.narrator.write_line(&line);
        }
    }

    fn fighter_line(&self, id: CombatantId, event: &BattleEvent) -> Option<String> {
        let flags = &self.config.narration;
        let name = self.name_of(id);
        match event {
            BattleEvent::DamageTaken { amount, kind } => {
                let show = match kind {
                    DamageKind::Physical => flags.show_physical_damage_messages,
                    DamageKind::Magical(_) => flags.show_magical_damage_messages,
                };
                show.then(|| format!("{} took {} damage!", name, amount))
            }
            BattleEvent::Healed { amount } => flags
                .show_heal_messages
                .then(|| format!("{} recovered {} health!", name, amount)),
            BattleEvent::AttackMissed { target, evaded: true } => flags
                .show_attack_messages
                .then(|| format!("{} evaded the attack!", self.name_of(*target))),
            BattleEvent::AttackMissed { evaded: false, .. } => flags
                .show_attack_messages
                .then(|| format!("{}'s attack missed!", name)),
            // Critical hits are only narrated alongside attack messages
            BattleEvent::CriticalHit { .. } => flags
                .show_attack_messages
                .then(|| "Critical hit!".to_string()),
            BattleEvent::CounterAttack { target } => flags
                .show_attack_messages
                .then(|| format!("{} counter-attacks {}!", name, self.name_of(*target))),
            BattleEvent::StatusAdded { status, turns } => flags
                .show_status_messages
                .then(|| format!("{} is affected by {} for {} turns!", name, status, turns)),
            BattleEvent::StatusRemoved { status } => flags
                .show_status_messages
                .then(|| format!("{} is no longer affected by {}.", name, status)),
            BattleEvent::ShieldAdded { .. } => flags
                .show_shield_messages
                .then(|| format!("{} is protected by a shield!", name)),
            BattleEvent::Killed => flags
                .show_death_messages
                .then(|| format!("{} has been defeated!", name)),
            BattleEvent::Revived { health } => flags
                .show_heal_messages
                .then(|| format!("{} was revived with {} health!", name, health)),
            BattleEvent::ManaLost { amount } => flags
                .show_mana_messages
                .then(|| format!("{} lost {} mana.", name, amount)),
            BattleEvent::ManaRestored { amount } => flags
                .show_mana_messages
                .then(|| format!("{} restored {} mana.", name, amount)),
            BattleEvent::ExpGained { amount } => flags
                .show_exp_messages
                .then(|| format!("{} gained {} experience!", name, amount)),
            BattleEvent::LeveledUp { level } => flags
                .show_exp_messages
                .then(|| format!("{} reached level {}!", name, level)),
            BattleEvent::SpellLearned { spell } => flags
                .show_exp_messages
                .then(|| format!("{} learned {}!", name, spell)),
            BattleEvent::MoveLearned { name: move_name } => flags
                .show_exp_messages
                .then(|| format!("{} learned {}!", name, move_name)),
            BattleEvent::MoveFailed { move_name, reason } => flags
                .show_failure_messages
                .then(|| format!("{}'s {} failed: {}.", name, move_name, reason)),
            BattleEvent::TurnEnded => flags
                .show_turn_messages
                .then(|| format!("{}'s turn is over.", name)),
            _ => None,
        }
    }
}
