//! A single battle participant
//!
//! Every mutator that changes observable state publishes the matching event
//! to the [`EventBus`] it is handed, with the combatant (or its shield) as
//! the source. The combatant never routes events itself.

mod behavior;
mod shield;

pub use behavior::{CombatantBehavior, SpecialContext};
pub use shield::Shield;

use crate::error::BattleError;
use crate::events::{BattleEvent, EventBus, EventSource};
use crate::moves::{Move, Spell};
use crate::progression::{LevelStats, Progression};
use crate::status::{Modifier, Status, StatusKind};
use crate::types::{CombatantId, DamageKind, Element, GroupId, ShieldId, StatType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Magic power and resistance, with per-element bonus tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicStats {
    pub strength: i32,
    pub resistance: i32,
    pub strength_bonus: BTreeMap<Element, i32>,
    pub resistance_bonus: BTreeMap<Element, i32>,
}

impl MagicStats {
    pub fn new(strength: i32, resistance: i32) -> Self {
        MagicStats {
            strength,
            resistance,
            ..Default::default()
        }
    }

    pub fn strength_bonus(&self, element: Element) -> i32 {
        self.strength_bonus.get(&element).copied().unwrap_or(0)
    }

    pub fn resistance_bonus(&self, element: Element) -> i32 {
        self.resistance_bonus.get(&element).copied().unwrap_or(0)
    }
}

/// Progress through a multi-turn move, kept across rounds
#[derive(Debug, Clone, PartialEq)]
pub struct MultiTurnProgress {
    pub mv: Move,
    pub target: Option<CombatantId>,
    /// Index of the sub-move to run on the next activation
    pub next_index: usize,
}

/// One participant's mutable battle state
#[derive(Debug, Clone)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    /// Disambiguating suffix assigned by the group ("A", "B", ...)
    pub suffix: Option<String>,
    /// Monster or class kind; members sharing archetype and element get suffixes
    pub archetype: String,
    pub element: Option<Element>,
    pub level: u32,
    pub exp: u32,
    /// Experience granted to the opposing side when this combatant is killed
    pub exp_reward: u32,
    current_health: i32,
    max_health: i32,
    current_mana: i32,
    max_mana: i32,
    pub strength: i32,
    pub defense: i32,
    pub speed: i32,
    pub evade: i32,
    pub luck: i32,
    pub magic: MagicStats,
    statuses: Vec<Status>,
    shield: Option<Shield>,
    pub(crate) group: Option<GroupId>,
    pub moves: Vec<Move>,
    spells: Vec<Spell>,
    pub(crate) multi_turn: Option<MultiTurnProgress>,
    behavior: Option<Arc<dyn CombatantBehavior>>,
}

impl Combatant {
    /// Create a combatant at full health and mana. The id is replaced when
    /// the combatant is added to a roster.
    pub fn new(name: impl Into<String>, max_health: i32, max_mana: i32) -> Self {
        let name = name.into();
        let max_health = max_health.max(1);
        let max_mana = max_mana.max(0);
        Combatant {
            id: CombatantId(0),
            archetype: name.clone(),
            name,
            suffix: None,
            element: None,
            level: 1,
            exp: 0,
            exp_reward: 0,
            current_health: max_health,
            max_health,
            current_mana: max_mana,
            max_mana,
            strength: 0,
            defense: 0,
            speed: 0,
            evade: 0,
            luck: 0,
            magic: MagicStats::default(),
            statuses: Vec::new(),
            shield: None,
            group: None,
            moves: Vec::new(),
            spells: Vec::new(),
            multi_turn: None,
            behavior: None,
        }
    }

    // ------------------------------------------------------------------
    // Builder
    // ------------------------------------------------------------------

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = archetype.into();
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_exp_reward(mut self, exp: u32) -> Self {
        self.exp_reward = exp;
        self
    }

    pub fn with_stats(mut self, strength: i32, defense: i32, speed: i32, evade: i32, luck: i32) -> Self {
        self.strength = strength;
        self.defense = defense;
        self.speed = speed;
        self.evade = evade;
        self.luck = luck;
        self
    }

    pub fn with_magic(mut self, magic: MagicStats) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_move(mut self, mv: Move) -> Self {
        self.moves.push(mv);
        self
    }

    pub fn with_spell(mut self, spell: Spell) -> Self {
        self.spells.push(spell);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_behavior(mut self, behavior: Arc<dyn CombatantBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Start the battle with `health` instead of full health
    pub fn with_health(mut self, health: i32) -> Self {
        self.current_health = health.clamp(0, self.max_health);
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Name plus suffix, e.g. "Goblin B"
    pub fn display_name(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{} {}", self.name, suffix),
            None => self.name.clone(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_mana(&self) -> i32 {
        self.current_mana
    }

    pub fn max_mana(&self) -> i32 {
        self.max_mana
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn stat(&self, stat: StatType) -> i32 {
        match stat {
            StatType::Strength => self.strength,
            StatType::Defense => self.defense,
            StatType::Speed => self.speed,
            StatType::Evade => self.evade,
            StatType::Luck => self.luck,
        }
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    /// Modifiers contributed by this combatant's own statuses
    pub fn status_modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.statuses.iter().filter_map(|s| s.kind.modifier().copied())
    }

    pub fn has_status(&self, predicate: impl Fn(&StatusKind) -> bool) -> bool {
        self.statuses.iter().any(|s| predicate(&s.kind))
    }

    pub fn is_blind(&self) -> bool {
        self.has_status(|k| matches!(k, StatusKind::Blind))
    }

    pub fn is_magic_sealed(&self) -> bool {
        self.has_status(|k| matches!(k, StatusKind::MagicSeal))
    }

    pub fn is_disabled(&self) -> bool {
        self.has_status(|k| matches!(k, StatusKind::Disabled))
    }

    pub fn has_counter_attack(&self) -> bool {
        self.has_status(|k| matches!(k, StatusKind::CounterAttack))
    }

    /// Reflect multiplier, if a reflect status is active
    pub fn reflect_multiplier(&self) -> Option<f64> {
        self.statuses.iter().find_map(|s| match s.kind {
            StatusKind::Reflect { multiplier } => Some(multiplier),
            _ => None,
        })
    }

    /// Whether auto-evade is active, and whether it counters
    pub fn auto_evade(&self) -> Option<bool> {
        self.statuses.iter().find_map(|s| match s.kind {
            StatusKind::AutoEvade { counter_attack } => Some(counter_attack),
            _ => None,
        })
    }

    pub fn shield(&self) -> Option<&Shield> {
        self.shield.as_ref()
    }

    /// Event source of the equipped shield
    pub fn shield_source(&self) -> Option<EventSource> {
        let id = self.shield.as_ref()?.id?;
        Some(EventSource::Shield { id, owner: self.id })
    }

    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    pub fn knows_spell(&self, name: &str) -> bool {
        self.spells.iter().any(|s| s.name == name)
    }

    pub fn behavior(&self) -> Option<Arc<dyn CombatantBehavior>> {
        self.behavior.clone()
    }

    pub fn multi_turn(&self) -> Option<&MultiTurnProgress> {
        self.multi_turn.as_ref()
    }

    /// The plain attack every combatant has
    pub fn basic_attack(&self, accuracy: i32) -> Move {
        Move::attack("attack", accuracy)
    }

    fn source(&self) -> EventSource {
        EventSource::combatant(self.id)
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Apply physical damage. Returns the health actually lost.
    pub fn take_physical_damage(&mut self, amount: i32, bus: &mut EventBus) -> Result<i32, BattleError> {
        self.take_damage(amount, DamageKind::Physical, bus)
    }

    /// Apply magical damage. Returns the health actually lost.
    pub fn take_magical_damage(
        &mut self,
        amount: i32,
        element: Element,
        bus: &mut EventBus,
    ) -> Result<i32, BattleError> {
        self.take_damage(amount, DamageKind::Magical(element), bus)
    }

    /// A shield absorbs the hit first; damage beyond the shield's health is
    /// lost, never carried over to the owner.
    fn take_damage(&mut self, amount: i32, kind: DamageKind, bus: &mut EventBus) -> Result<i32, BattleError> {
        if amount < 0 {
            return Err(BattleError::invalid(format!(
                "negative damage {} dealt to {}",
                amount,
                self.display_name()
            )));
        }
        if !self.is_alive() {
            return Ok(0);
        }

        if let Some(source) = self.shield_source() {
            if let Some(shield) = self.shield.as_mut() {
                let absorbed = shield.absorb(amount);
                bus.publish(source, BattleEvent::DamageTaken { amount: absorbed, kind });
                if shield.is_broken() {
                    bus.publish(source, BattleEvent::ShieldDestroyed);
                    self.shield = None;
                }
                return Ok(0);
            }
        }

        let lost = amount.min(self.current_health);
        self.current_health -= lost;
        bus.publish(self.source(), BattleEvent::DamageTaken { amount: lost, kind });
        if self.current_health == 0 {
            bus.publish(self.source(), BattleEvent::Killed);
        }
        Ok(lost)
    }

    /// Restore health up to the maximum. Dead combatants cannot be healed.
    pub fn heal(&mut self, amount: i32, bus: &mut EventBus) -> Result<i32, BattleError> {
        if amount < 0 {
            return Err(BattleError::invalid(format!("negative heal {}", amount)));
        }
        if !self.is_alive() {
            return Ok(0);
        }
        let healed = amount.min(self.max_health - self.current_health);
        self.current_health += healed;
        bus.publish(self.source(), BattleEvent::Healed { amount: healed });
        Ok(healed)
    }

    /// Bring a dead combatant back with `health` (at least 1)
    pub fn revive(&mut self, health: i32, bus: &mut EventBus) -> Result<(), BattleError> {
        if health < 0 {
            return Err(BattleError::invalid(format!("negative revive health {}", health)));
        }
        if self.is_alive() {
            return Ok(());
        }
        self.current_health = health.clamp(1, self.max_health);
        bus.publish(
            self.source(),
            BattleEvent::Revived {
                health: self.current_health,
            },
        );
        Ok(())
    }

    /// Drop health straight to zero, bypassing any shield
    pub fn kill(&mut self, bus: &mut EventBus) {
        if !self.is_alive() {
            return;
        }
        self.current_health = 0;
        bus.publish(self.source(), BattleEvent::Killed);
    }

    pub(crate) fn raise_max_health(&mut self, amount: i32) {
        self.max_health += amount.max(0);
        self.current_health += amount.max(0);
    }

    // ------------------------------------------------------------------
    // Mana
    // ------------------------------------------------------------------

    /// Spend exactly `amount` mana or fail without spending any
    pub fn spend_mana(&mut self, amount: i32, bus: &mut EventBus) -> Result<(), BattleError> {
        if amount < 0 {
            return Err(BattleError::invalid(format!("negative mana cost {}", amount)));
        }
        if amount > self.current_mana {
            return Err(BattleError::InsufficientMana {
                needed: amount,
                available: self.current_mana,
            });
        }
        self.current_mana -= amount;
        if amount > 0 {
            bus.publish(self.source(), BattleEvent::ManaLost { amount });
        }
        Ok(())
    }

    /// Take up to `amount` mana, returning how much was actually drained
    pub fn drain_mana(&mut self, amount: i32, bus: &mut EventBus) -> i32 {
        let drained = amount.clamp(0, self.current_mana);
        self.current_mana -= drained;
        if drained > 0 {
            bus.publish(self.source(), BattleEvent::ManaLost { amount: drained });
        }
        drained
    }

    pub fn restore_mana(&mut self, amount: i32, bus: &mut EventBus) -> Result<i32, BattleError> {
        if amount < 0 {
            return Err(BattleError::invalid(format!("negative mana restore {}", amount)));
        }
        let restored = amount.min(self.max_mana - self.current_mana);
        self.current_mana += restored;
        bus.publish(self.source(), BattleEvent::ManaRestored { amount: restored });
        Ok(restored)
    }

    // ------------------------------------------------------------------
    // Statuses
    // ------------------------------------------------------------------

    /// Attach a status, refreshing an existing one in the same slot
    pub fn add_status(&mut self, status: Status, bus: &mut EventBus) {
        if matches!(status.kind, StatusKind::UndoDebuffs) {
            self.remove_debuffs(bus);
            return;
        }
        let event = BattleEvent::StatusAdded {
            status: status.kind,
            turns: status.turns_remaining,
        };
        match self.statuses.iter_mut().find(|s| s.kind.same_slot(&status.kind)) {
            Some(existing) => *existing = status,
            None => self.statuses.push(status),
        }
        bus.publish(self.source(), event);
    }

    /// Remove every debuff, returning how many were removed
    pub fn remove_debuffs(&mut self, bus: &mut EventBus) -> usize {
        let (debuffs, kept): (Vec<Status>, Vec<Status>) =
            self.statuses.drain(..).partition(|s| s.is_debuff());
        self.statuses = kept;
        for debuff in &debuffs {
            bus.publish(self.source(), BattleEvent::StatusRemoved { status: debuff.kind });
        }
        debuffs.len()
    }

    /// Count every status down one turn and drop the expired ones
    pub fn tick_statuses(&mut self, bus: &mut EventBus) {
        let mut expired = Vec::new();
        self.statuses.retain_mut(|s| {
            if s.tick() {
                expired.push(s.kind);
                false
            } else {
                true
            }
        });
        for status in expired {
            bus.publish(self.source(), BattleEvent::StatusRemoved { status });
        }
    }

    pub fn clear_statuses(&mut self) {
        self.statuses.clear();
    }

    /// Announce the end of this combatant's turn
    pub fn end_turn(&mut self, bus: &mut EventBus) {
        bus.publish(self.source(), BattleEvent::TurnEnded);
    }

    // ------------------------------------------------------------------
    // Shield
    // ------------------------------------------------------------------

    /// Replace any equipped shield with a fresh copy of `template`.
    /// Returns the id of the discarded shield.
    pub fn set_shield(&mut self, template: &Shield, id: ShieldId, bus: &mut EventBus) -> Option<ShieldId> {
        let previous = self.shield.as_ref().and_then(|s| s.id);
        self.shield = Some(template.instantiate(id));
        bus.publish(self.source(), BattleEvent::ShieldAdded { shield: id });
        previous
    }

    /// Unequip the shield without any event
    pub fn remove_shield(&mut self) -> Option<Shield> {
        self.shield.take()
    }

    /// Raise the shield's defense and/or health. Returns false without a shield.
    pub fn fortify_shield(&mut self, defense: i32, health: i32, bus: &mut EventBus) -> bool {
        let Some(source) = self.shield_source() else {
            return false;
        };
        let Some(shield) = self.shield.as_mut() else {
            return false;
        };
        let defense_gained = shield.fortify_defense(defense.max(0));
        let health_gained = shield.fortify_health(health.max(0));
        bus.publish(
            source,
            BattleEvent::ShieldFortified {
                defense_gained,
                health_gained,
            },
        );
        true
    }

    /// Destroy the equipped shield outright
    pub fn destroy_shield(&mut self, bus: &mut EventBus) -> bool {
        let Some(source) = self.shield_source() else {
            return false;
        };
        self.shield = None;
        bus.publish(source, BattleEvent::ShieldDestroyed);
        true
    }

    // ------------------------------------------------------------------
    // Growth
    // ------------------------------------------------------------------

    /// Permanently raise a base stat
    pub fn raise_stat(&mut self, stat: StatType, amount: i32) -> Result<(), BattleError> {
        if amount < 0 {
            return Err(BattleError::invalid(format!(
                "negative {} raise {}",
                stat, amount
            )));
        }
        match stat {
            StatType::Strength => self.strength += amount,
            StatType::Defense => self.defense += amount,
            StatType::Speed => self.speed += amount,
            StatType::Evade => self.evade += amount,
            StatType::Luck => self.luck += amount,
        }
        Ok(())
    }

    fn apply_level_stats(&mut self, gains: &LevelStats) -> Result<(), BattleError> {
        self.raise_stat(StatType::Strength, gains.strength)?;
        self.raise_stat(StatType::Defense, gains.defense)?;
        self.raise_stat(StatType::Speed, gains.speed)?;
        self.raise_stat(StatType::Evade, gains.evade)?;
        self.raise_stat(StatType::Luck, gains.luck)?;
        if gains.max_health < 0 || gains.max_mana < 0 {
            return Err(BattleError::invalid("negative level gain"));
        }
        self.raise_max_health(gains.max_health);
        self.max_mana += gains.max_mana;
        self.current_mana += gains.max_mana;
        self.magic.strength += gains.magic_strength.max(0);
        self.magic.resistance += gains.magic_resistance.max(0);
        Ok(())
    }

    /// Add experience, levelling up as many times as the progression allows
    pub fn gain_exp(
        &mut self,
        amount: u32,
        progression: Option<&dyn Progression>,
        bus: &mut EventBus,
    ) -> Result<(), BattleError> {
        self.exp = self.exp.saturating_add(amount);
        bus.publish(self.source(), BattleEvent::ExpGained { amount });

        let Some(progression) = progression else {
            return Ok(());
        };
        while let Some(needed) = progression.exp_for_level(self.level + 1) {
            if self.exp < needed {
                break;
            }
            self.level += 1;
            tracing::debug!(combatant = %self.display_name(), level = self.level, "leveled up");
            bus.publish(self.source(), BattleEvent::LeveledUp { level: self.level });
            if let Some(gains) = progression.stat_gains_for_level(self.level) {
                self.apply_level_stats(&gains)?;
            }
            for spell in progression.spells_for_level(self.level) {
                self.learn_spell(spell, bus);
            }
        }
        Ok(())
    }

    /// Learn a spell. Returns false if it was already known.
    pub fn learn_spell(&mut self, spell: Spell, bus: &mut EventBus) -> bool {
        if self.knows_spell(&spell.name) {
            return false;
        }
        let name = spell.name.clone();
        self.spells.push(spell);
        bus.publish(self.source(), BattleEvent::SpellLearned { spell: name });
        true
    }

    /// Add a move to the catalog. Returns false if one with the same name exists.
    pub fn learn_move(&mut self, mv: Move, bus: &mut EventBus) -> bool {
        if self.moves.iter().any(|m| m.name == mv.name) {
            return false;
        }
        let name = mv.name.clone();
        self.moves.push(mv);
        bus.publish(self.source(), BattleEvent::MoveLearned { name });
        true
    }

    /// Hand over half of max health and strength, then fall
    pub(crate) fn surrender_essence(&mut self, bus: &mut EventBus) -> (i32, i32) {
        let health = self.max_health / 2;
        let strength = self.strength / 2;
        self.kill(bus);
        (health, strength)
    }

    /// Reset per-battle state that must not leak into the next encounter
    pub(crate) fn reset_battle_state(&mut self) {
        self.multi_turn = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::types::StatType;
    use proptest::prelude::*;

    fn goblin() -> Combatant {
        Combatant::new("Goblin", 20, 10).with_stats(5, 2, 4, 0, 0)
    }

    fn events(bus: &EventBus) -> Vec<BattleEvent> {
        bus.history().iter().map(|e| e.event.clone()).collect()
    }

    #[test]
    fn test_damage_clamps_at_zero_and_kills() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();

        let lost = goblin.take_physical_damage(50, &mut bus).unwrap();
        assert_eq!(lost, 20);
        assert_eq!(goblin.current_health(), 0);
        assert!(!goblin.is_alive());
        assert_eq!(
            events(&bus),
            vec![
                BattleEvent::DamageTaken { amount: 20, kind: DamageKind::Physical },
                BattleEvent::Killed,
            ]
        );
    }

    #[test]
    fn test_damage_to_dead_is_noop() {
        let mut bus = EventBus::new();
        let mut goblin = goblin().with_health(0);
        assert_eq!(goblin.take_physical_damage(3, &mut bus).unwrap(), 0);
        assert!(bus.history().is_empty());
    }

    #[test]
    fn test_negative_damage_rejected() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();
        let result = goblin.take_physical_damage(-1, &mut bus);
        assert!(matches!(result, Err(BattleError::InvalidInput(_))));
        assert_eq!(goblin.current_health(), 20);
    }

    #[test]
    fn test_shield_absorbs_without_overflow() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();
        goblin.set_shield(&Shield::new("Buckler", 10), ShieldId(7), &mut bus);
        let source = goblin.shield_source().unwrap();

        let lost = goblin.take_physical_damage(12, &mut bus).unwrap();
        assert_eq!(lost, 0);
        assert_eq!(goblin.current_health(), 20);
        assert!(goblin.shield().is_none());
        assert_eq!(
            bus.history_of(source, EventKind::DamageTaken),
            vec![&BattleEvent::DamageTaken { amount: 10, kind: DamageKind::Physical }]
        );
        assert_eq!(bus.history_of(source, EventKind::ShieldDestroyed).len(), 1);
    }

    #[test]
    fn test_new_shield_replaces_old() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();
        let first = goblin.set_shield(&Shield::new("Buckler", 10), ShieldId(1), &mut bus);
        assert!(first.is_none());
        let previous = goblin.set_shield(&Shield::new("Tower", 30), ShieldId(2), &mut bus);
        assert_eq!(previous, Some(ShieldId(1)));
        assert_eq!(goblin.shield().unwrap().name, "Tower");
        assert_eq!(goblin.shield().unwrap().id, Some(ShieldId(2)));
    }

    #[test]
    fn test_heal_caps_at_max_and_skips_dead() {
        let mut bus = EventBus::new();
        let mut goblin = goblin().with_health(15);
        assert_eq!(goblin.heal(10, &mut bus).unwrap(), 5);
        assert_eq!(goblin.current_health(), 20);

        let mut dead = Combatant::new("Ghost", 10, 0).with_health(0);
        assert_eq!(dead.heal(5, &mut bus).unwrap(), 0);
        assert!(!dead.is_alive());
    }

    #[test]
    fn test_revive() {
        let mut bus = EventBus::new();
        let mut goblin = goblin().with_health(0);
        goblin.revive(0, &mut bus).unwrap();
        assert_eq!(goblin.current_health(), 1);
        assert_eq!(events(&bus), vec![BattleEvent::Revived { health: 1 }]);
    }

    #[test]
    fn test_strict_and_soft_mana() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();

        let err = goblin.spend_mana(11, &mut bus).unwrap_err();
        assert!(matches!(err, BattleError::InsufficientMana { needed: 11, available: 10 }));
        assert_eq!(goblin.current_mana(), 10);

        assert_eq!(goblin.drain_mana(25, &mut bus), 10);
        assert_eq!(goblin.current_mana(), 0);
    }

    #[test]
    fn test_status_refresh_and_tick() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();
        goblin.add_status(Status::new(StatusKind::Blind, 1), &mut bus);
        goblin.add_status(Status::new(StatusKind::Blind, 2), &mut bus);
        assert_eq!(goblin.statuses().len(), 1);
        assert_eq!(goblin.statuses()[0].turns_remaining, 2);

        goblin.tick_statuses(&mut bus);
        assert!(goblin.is_blind());
        goblin.tick_statuses(&mut bus);
        assert!(!goblin.is_blind());
        assert_eq!(
            bus.history().last().map(|e| e.event.clone()),
            Some(BattleEvent::StatusRemoved { status: StatusKind::Blind })
        );
    }

    #[test]
    fn test_undo_debuffs_keeps_buffs() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();
        goblin.add_status(Status::new(StatusKind::Blind, 3), &mut bus);
        goblin.add_status(Status::new(StatusKind::CounterAttack, 3), &mut bus);
        goblin.add_status(
            Status::modifier(Modifier::Stat { stat: StatType::Speed, multiplier: 0.5 }, 3),
            &mut bus,
        );

        goblin.add_status(Status::new(StatusKind::UndoDebuffs, 1), &mut bus);
        assert_eq!(goblin.statuses().len(), 1);
        assert!(goblin.has_counter_attack());
    }

    #[test]
    fn test_raise_stat_rejects_negative() {
        let mut goblin = goblin();
        assert!(goblin.raise_stat(StatType::Luck, -2).is_err());
        goblin.raise_stat(StatType::Luck, 2).unwrap();
        assert_eq!(goblin.luck, 2);
    }

    #[test]
    fn test_fortify_without_shield() {
        let mut bus = EventBus::new();
        let mut goblin = goblin();
        assert!(!goblin.fortify_shield(3, 0, &mut bus));
        assert!(!goblin.destroy_shield(&mut bus));
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(ops in prop::collection::vec((any::<bool>(), 0i32..40), 0..40)) {
            let mut bus = EventBus::new();
            let mut fighter = Combatant::new("Dummy", 30, 0);
            for (is_heal, amount) in ops {
                if is_heal {
                    fighter.heal(amount, &mut bus).unwrap();
                } else if amount % 2 == 0 {
                    fighter.take_physical_damage(amount, &mut bus).unwrap();
                } else {
                    fighter.take_magical_damage(amount, Element::Fire, &mut bus).unwrap();
                }
                prop_assert!(fighter.current_health() >= 0);
                prop_assert!(fighter.current_health() <= fighter.max_health());
            }
        }
    }
}
