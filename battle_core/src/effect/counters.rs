//! Side-scoped duration counters

use super::dance::{combine, DanceType};
use crate::error::BattleError;
use crate::status::Modifier;
use crate::types::{CombatantId, Side};
use std::collections::BTreeSet;

/// A lasting field modifier on one side
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEffectCounter {
    pub name: String,
    pub modifier: Modifier,
    pub side: Side,
    pub turns_remaining: u32,
    owners: BTreeSet<CombatantId>,
}

impl FieldEffectCounter {
    pub fn new(
        name: impl Into<String>,
        modifier: Modifier,
        side: Side,
        owner: CombatantId,
        turns: u32,
    ) -> Self {
        FieldEffectCounter {
            name: name.into(),
            modifier,
            side,
            turns_remaining: turns,
            owners: BTreeSet::from([owner]),
        }
    }

    /// Build a counter with several owners; the owner set must not be empty
    pub fn with_owners(
        name: impl Into<String>,
        modifier: Modifier,
        side: Side,
        owners: BTreeSet<CombatantId>,
        turns: u32,
    ) -> Result<Self, BattleError> {
        if owners.is_empty() {
            return Err(BattleError::contract("field effect counter without owner"));
        }
        Ok(FieldEffectCounter {
            name: name.into(),
            modifier,
            side,
            turns_remaining: turns,
            owners,
        })
    }

    pub fn owners(&self) -> &BTreeSet<CombatantId> {
        &self.owners
    }
}

/// An active dance on one side
#[derive(Debug, Clone, PartialEq)]
pub struct DanceEffectCounter {
    pub dance: DanceType,
    pub side: Side,
    pub turns_remaining: u32,
    owners: BTreeSet<CombatantId>,
}

impl DanceEffectCounter {
    pub fn new(dance: DanceType, side: Side, owner: CombatantId, turns: u32) -> Self {
        DanceEffectCounter {
            dance,
            side,
            turns_remaining: turns,
            owners: BTreeSet::from([owner]),
        }
    }

    pub fn owners(&self) -> &BTreeSet<CombatantId> {
        &self.owners
    }
}

/// What registering a dance did
#[derive(Debug, Clone, PartialEq)]
pub enum DanceOutcome {
    Started,
    Refreshed,
    /// The dance merged with `partner` into the named field effect
    Combined { partner: DanceType, compound: String },
}

/// A counter that ran out (or lost its last owner)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredEffect {
    pub name: String,
    pub side: Side,
}

/// All field and dance counters of one battle
#[derive(Debug, Clone, Default)]
pub struct EffectTracker {
    field: Vec<FieldEffectCounter>,
    dances: Vec<DanceEffectCounter>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_counters(&self) -> &[FieldEffectCounter] {
        &self.field
    }

    pub fn dance_counters(&self) -> &[DanceEffectCounter] {
        &self.dances
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty() && self.dances.is_empty()
    }

    /// Register a lasting modifier for `side`
    ///
    /// Registering the same named effect again on the same side joins the
    /// owner to the existing counter and refreshes its duration.
    pub fn register_field(
        &mut self,
        name: &str,
        modifier: Modifier,
        side: Side,
        owner: CombatantId,
        turns: u32,
    ) {
        if let Some(existing) = self
            .field
            .iter_mut()
            .find(|c| c.side == side && c.name == name)
        {
            existing.owners.insert(owner);
            existing.modifier = modifier;
            existing.turns_remaining = existing.turns_remaining.max(turns);
            return;
        }
        self.field
            .push(FieldEffectCounter::new(name, modifier, side, owner, turns));
    }

    /// Register a dance for `side`, combining it with a partner dance if the
    /// combination table has an entry for the pair
    pub fn register_dance(
        &mut self,
        dance: DanceType,
        side: Side,
        owner: CombatantId,
        turns: u32,
    ) -> Result<DanceOutcome, BattleError> {
        if let Some(existing) = self
            .dances
            .iter_mut()
            .find(|d| d.side == side && d.dance == dance)
        {
            existing.owners.insert(owner);
            existing.turns_remaining = existing.turns_remaining.max(turns);
            return Ok(DanceOutcome::Refreshed);
        }

        let partner = self.dances.iter().position(|d| {
            d.side == side && combine(d.dance, dance).is_some()
        });

        if let Some(index) = partner {
            let partner = self.dances.remove(index);
            let compound = combine(partner.dance, dance)
                .ok_or_else(|| BattleError::contract("dance partner without combination"))?;
            let mut owners = partner.owners.clone();
            owners.insert(owner);
            let turns = partner.turns_remaining.max(turns);
            self.field.retain(|c| !(c.side == side && c.name == compound.name));
            self.field.push(FieldEffectCounter::with_owners(
                compound.name,
                compound.modifier,
                side,
                owners,
                turns,
            )?);
            return Ok(DanceOutcome::Combined {
                partner: partner.dance,
                compound: compound.name.to_string(),
            });
        }

        self.dances
            .push(DanceEffectCounter::new(dance, side, owner, turns));
        Ok(DanceOutcome::Started)
    }

    /// Whether `side` has an active dance (of the given type, or any type)
    pub fn has_dance(&self, side: Side, dance: Option<DanceType>) -> bool {
        self.dances
            .iter()
            .any(|d| d.side == side && dance.map_or(true, |t| t == d.dance))
    }

    /// Lasting modifiers that apply to members of `side`
    pub fn modifiers_for(&self, side: Side) -> impl Iterator<Item = Modifier> + '_ {
        self.field
            .iter()
            .filter(move |c| c.side == side)
            .map(|c| c.modifier)
    }

    /// Count every counter down once and remove the expired ones
    pub fn tick(&mut self) -> Vec<ExpiredEffect> {
        let mut expired = Vec::new();
        for counter in &mut self.field {
            counter.turns_remaining = counter.turns_remaining.saturating_sub(1);
        }
        for counter in &mut self.dances {
            counter.turns_remaining = counter.turns_remaining.saturating_sub(1);
        }
        self.field.retain(|c| {
            if c.turns_remaining == 0 {
                expired.push(ExpiredEffect {
                    name: c.name.clone(),
                    side: c.side,
                });
                false
            } else {
                true
            }
        });
        self.dances.retain(|d| {
            if d.turns_remaining == 0 {
                expired.push(ExpiredEffect {
                    name: d.dance.to_string(),
                    side: d.side,
                });
                false
            } else {
                true
            }
        });
        expired
    }

    /// Detach a combatant from every counter it owns. Counters left without
    /// any owner are removed and reported.
    pub fn remove_owner(&mut self, owner: CombatantId) -> Vec<ExpiredEffect> {
        let mut removed = Vec::new();
        for counter in &mut self.field {
            counter.owners.remove(&owner);
        }
        for counter in &mut self.dances {
            counter.owners.remove(&owner);
        }
        self.field.retain(|c| {
            if c.owners.is_empty() {
                removed.push(ExpiredEffect {
                    name: c.name.clone(),
                    side: c.side,
                });
                false
            } else {
                true
            }
        });
        self.dances.retain(|d| {
            if d.owners.is_empty() {
                removed.push(ExpiredEffect {
                    name: d.dance.to_string(),
                    side: d.side,
                });
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn clear(&mut self) {
        self.field.clear();
        self.dances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatType;

    fn haste() -> Modifier {
        Modifier::Stat {
            stat: StatType::Speed,
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_counter_requires_owner() {
        let result = FieldEffectCounter::with_owners("Haste", haste(), Side::Human, BTreeSet::new(), 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_register_field_merges_same_name() {
        let mut tracker = EffectTracker::new();
        tracker.register_field("Haste", haste(), Side::Human, CombatantId(0), 2);
        tracker.register_field("Haste", haste(), Side::Human, CombatantId(1), 3);
        tracker.register_field("Haste", haste(), Side::Enemy, CombatantId(5), 3);

        assert_eq!(tracker.field_counters().len(), 2);
        let human = &tracker.field_counters()[0];
        assert_eq!(human.owners().len(), 2);
        assert_eq!(human.turns_remaining, 3);
    }

    #[test]
    fn test_modifiers_scoped_to_side() {
        let mut tracker = EffectTracker::new();
        tracker.register_field("Haste", haste(), Side::Human, CombatantId(0), 2);

        assert_eq!(tracker.modifiers_for(Side::Human).count(), 1);
        assert_eq!(tracker.modifiers_for(Side::Enemy).count(), 0);
    }

    #[test]
    fn test_tick_removes_expired() {
        let mut tracker = EffectTracker::new();
        tracker.register_field("Haste", haste(), Side::Human, CombatantId(0), 1);
        tracker.register_field("Long Haste", haste(), Side::Human, CombatantId(0), 2);

        let expired = tracker.tick();
        assert_eq!(
            expired,
            vec![ExpiredEffect {
                name: "Haste".to_string(),
                side: Side::Human
            }]
        );
        assert_eq!(tracker.field_counters().len(), 1);
    }

    #[test]
    fn test_remove_owner_drops_orphaned_counters() {
        let mut tracker = EffectTracker::new();
        tracker.register_field("Haste", haste(), Side::Human, CombatantId(0), 5);
        tracker.register_field("Haste", haste(), Side::Human, CombatantId(1), 5);
        tracker.register_field("Solo", haste(), Side::Human, CombatantId(0), 5);

        let removed = tracker.remove_owner(CombatantId(0));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Solo");
        assert_eq!(tracker.field_counters().len(), 1);
    }

    #[test]
    fn test_dance_refresh_then_combine() {
        let mut tracker = EffectTracker::new();
        let first = tracker
            .register_dance(DanceType::Fire, Side::Enemy, CombatantId(4), 3)
            .unwrap();
        assert_eq!(first, DanceOutcome::Started);

        let again = tracker
            .register_dance(DanceType::Fire, Side::Enemy, CombatantId(4), 3)
            .unwrap();
        assert_eq!(again, DanceOutcome::Refreshed);
        assert!(tracker.has_dance(Side::Enemy, Some(DanceType::Fire)));

        let combined = tracker
            .register_dance(DanceType::Wind, Side::Enemy, CombatantId(5), 2)
            .unwrap();
        assert_eq!(
            combined,
            DanceOutcome::Combined {
                partner: DanceType::Fire,
                compound: "Firestorm".to_string()
            }
        );
        assert!(!tracker.has_dance(Side::Enemy, None));
        let compound = &tracker.field_counters()[0];
        assert_eq!(compound.owners().len(), 2);
        assert_eq!(compound.turns_remaining, 3);
    }

    #[test]
    fn test_dances_on_other_side_do_not_combine() {
        let mut tracker = EffectTracker::new();
        tracker
            .register_dance(DanceType::Fire, Side::Enemy, CombatantId(4), 3)
            .unwrap();
        let outcome = tracker
            .register_dance(DanceType::Wind, Side::Human, CombatantId(0), 3)
            .unwrap();
        assert_eq!(outcome, DanceOutcome::Started);
        assert_eq!(tracker.dance_counters().len(), 2);
    }
}
