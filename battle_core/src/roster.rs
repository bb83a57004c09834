//! Arena of combatants and groups
//!
//! Groups refer to their members by [`CombatantId`] and combatants refer back
//! to their group by [`GroupId`]; the [`Roster`] owns both plus the event bus
//! their mutators publish to.

use crate::combatant::{Combatant, Shield};
use crate::error::BattleError;
use crate::events::{BattleEvent, EventBus, EventSource};
use crate::types::{CombatantId, Element, GroupId, ShieldId, Side};
use std::collections::BTreeMap;

/// An ordered team of combatants fighting for one side
#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub side: Side,
    members: Vec<CombatantId>,
    defeated: bool,
    fled: bool,
}

impl Group {
    pub fn members(&self) -> &[CombatantId] {
        &self.members
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.members.contains(&id)
    }

    /// Whether the defeat event has fired since the last revive
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn has_fled(&self) -> bool {
        self.fled
    }

    fn source(&self) -> EventSource {
        EventSource::group(self.id)
    }
}

/// Suffix for the `index`th member of a look-alike set: A..Z, AA, AB, ...
pub fn suffix_for(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Owner of every combatant and group, plus the event bus
#[derive(Debug, Default)]
pub struct Roster {
    combatants: Vec<Combatant>,
    groups: Vec<Group>,
    bus: EventBus,
    next_shield: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    /// Store a combatant and return its handle
    pub fn add_combatant(&mut self, mut combatant: Combatant) -> CombatantId {
        let id = CombatantId(self.combatants.len());
        combatant.id = id;
        combatant.group = None;
        self.combatants.push(combatant);
        id
    }

    pub fn add_group(&mut self, name: impl Into<String>, side: Side) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(Group {
            id,
            name: name.into(),
            side,
            members: Vec::new(),
            defeated: false,
            fled: false,
        });
        id
    }

    pub fn combatant(&self, id: CombatantId) -> Result<&Combatant, BattleError> {
        self.combatants
            .get(id.0)
            .ok_or(BattleError::UnknownCombatant(id))
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Result<&mut Combatant, BattleError> {
        self.combatants
            .get_mut(id.0)
            .ok_or(BattleError::UnknownCombatant(id))
    }

    /// A combatant together with the bus its mutators publish to
    pub fn split_mut(&mut self, id: CombatantId) -> Result<(&mut Combatant, &mut EventBus), BattleError> {
        let combatant = self
            .combatants
            .get_mut(id.0)
            .ok_or(BattleError::UnknownCombatant(id))?;
        Ok((combatant, &mut self.bus))
    }

    pub fn group(&self, id: GroupId) -> Result<&Group, BattleError> {
        self.groups.get(id.0).ok_or(BattleError::UnknownGroup(id))
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut Group, BattleError> {
        self.groups.get_mut(id.0).ok_or(BattleError::UnknownGroup(id))
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn is_alive(&self, id: CombatantId) -> bool {
        self.combatant(id).map(|c| c.is_alive()).unwrap_or(false)
    }

    /// Side of the group a combatant belongs to
    pub fn side_of(&self, id: CombatantId) -> Option<Side> {
        let group = self.combatant(id).ok()?.group?;
        self.group(group).ok().map(|g| g.side)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Move a combatant into `group` (leaving any previous group)
    pub fn add_to_group(&mut self, group: GroupId, id: CombatantId) -> Result<(), BattleError> {
        self.group(group)?;
        if let Some(previous) = self.combatant(id)?.group {
            self.remove_from_group(previous, id)?;
        }
        self.group_mut(group)?.members.push(id);
        self.combatant_mut(id)?.group = Some(group);
        self.assign_suffixes(group)?;
        tracing::debug!(%group, fighter = %id, "fighter added");
        let source = self.group(group)?.source();
        self.bus.publish(source, BattleEvent::FighterAdded { fighter: id });
        Ok(())
    }

    /// Store a new combatant directly into `group`
    pub fn spawn_into(&mut self, group: GroupId, combatant: Combatant) -> Result<CombatantId, BattleError> {
        self.group(group)?;
        let id = self.add_combatant(combatant);
        self.add_to_group(group, id)?;
        Ok(id)
    }

    /// Take a combatant out of `group`. Returns false if it was not a member.
    pub fn remove_from_group(&mut self, group: GroupId, id: CombatantId) -> Result<bool, BattleError> {
        let entry = self.group_mut(group)?;
        let before = entry.members.len();
        entry.members.retain(|m| *m != id);
        if entry.members.len() == before {
            return Ok(false);
        }
        let combatant = self.combatant_mut(id)?;
        combatant.group = None;
        combatant.suffix = None;
        self.assign_suffixes(group)?;
        Ok(true)
    }

    /// Give look-alike members letter suffixes in group order
    fn assign_suffixes(&mut self, group: GroupId) -> Result<(), BattleError> {
        let members = self.group(group)?.members.clone();
        let mut signatures: BTreeMap<(String, Option<Element>), Vec<CombatantId>> =
            BTreeMap::new();
        for id in &members {
            let c = self.combatant(*id)?;
            signatures
                .entry((c.archetype.clone(), c.element))
                .or_default()
                .push(*id);
        }
        for ids in signatures.values() {
            let shared = ids.len() >= 2;
            for (index, id) in ids.iter().enumerate() {
                self.combatant_mut(*id)?.suffix = shared.then(|| suffix_for(index));
            }
        }
        Ok(())
    }

    pub fn members(&self, group: GroupId) -> Result<Vec<CombatantId>, BattleError> {
        Ok(self.group(group)?.members.clone())
    }

    /// Living members in group order
    pub fn living_members(&self, group: GroupId) -> Result<Vec<CombatantId>, BattleError> {
        Ok(self
            .group(group)?
            .members
            .iter()
            .copied()
            .filter(|id| self.is_alive(*id))
            .collect())
    }

    /// True when no member is alive
    pub fn all_dead(&self, group: GroupId) -> Result<bool, BattleError> {
        Ok(self.living_members(group)?.is_empty())
    }

    /// Re-evaluate the defeat latch of `group`
    ///
    /// Publishes `TeamDefeated` on the transition into the defeated state
    /// only. A group with a living member again is re-armed.
    pub fn update_defeat(&mut self, group: GroupId) -> Result<bool, BattleError> {
        let dead = self.all_dead(group)?;
        let entry = self
            .groups
            .get_mut(group.0)
            .ok_or(BattleError::UnknownGroup(group))?;
        if dead && !entry.defeated {
            entry.defeated = true;
            tracing::debug!(%group, "group defeated");
            let source = entry.source();
            self.bus.publish(source, BattleEvent::TeamDefeated);
            return Ok(true);
        }
        if !dead {
            entry.defeated = false;
        }
        Ok(false)
    }

    /// Mark `group` as fled and announce it
    pub fn flee(&mut self, group: GroupId) -> Result<(), BattleError> {
        let entry = self
            .groups
            .get_mut(group.0)
            .ok_or(BattleError::UnknownGroup(group))?;
        entry.fled = true;
        let source = entry.source();
        self.bus.publish(source, BattleEvent::TeamRan);
        Ok(())
    }

    pub(crate) fn reset_fled(&mut self, group: GroupId) -> Result<(), BattleError> {
        self.group_mut(group)?.fled = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shields
    // ------------------------------------------------------------------

    fn next_shield_id(&mut self) -> ShieldId {
        let id = ShieldId(self.next_shield);
        self.next_shield += 1;
        id
    }

    /// Equip a fresh copy of `template` on `target`. Returns the new shield's
    /// id and the id of the shield it replaced.
    pub fn grant_shield(
        &mut self,
        target: CombatantId,
        template: &Shield,
    ) -> Result<(ShieldId, Option<ShieldId>), BattleError> {
        let id = self.next_shield_id();
        let (combatant, bus) = self.split_mut(target)?;
        let previous = combatant.set_shield(template, id, bus);
        Ok((id, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::types::Element;

    #[test]
    fn test_suffix_sequence() {
        assert_eq!(suffix_for(0), "A");
        assert_eq!(suffix_for(25), "Z");
        assert_eq!(suffix_for(26), "AA");
        assert_eq!(suffix_for(27), "AB");
        assert_eq!(suffix_for(51), "AZ");
        assert_eq!(suffix_for(52), "BA");
    }

    #[test]
    fn test_suffixes_only_for_look_alikes() {
        let mut roster = Roster::new();
        let group = roster.add_group("Monsters", Side::Enemy);
        let a = roster.spawn_into(group, Combatant::new("Goblin", 10, 0)).unwrap();
        let b = roster.spawn_into(group, Combatant::new("Goblin", 10, 0)).unwrap();
        let fire = roster
            .spawn_into(group, Combatant::new("Goblin", 10, 0).with_element(Element::Fire))
            .unwrap();

        assert_eq!(roster.combatant(a).unwrap().display_name(), "Goblin A");
        assert_eq!(roster.combatant(b).unwrap().display_name(), "Goblin B");
        assert_eq!(roster.combatant(fire).unwrap().display_name(), "Goblin");

        roster.remove_from_group(group, a).unwrap();
        assert_eq!(roster.combatant(b).unwrap().display_name(), "Goblin");
        assert_eq!(roster.combatant(a).unwrap().group(), None);
    }

    #[test]
    fn test_add_to_group_publishes_fighter_added() {
        let mut roster = Roster::new();
        let group = roster.add_group("Heroes", Side::Human);
        let hero = roster.spawn_into(group, Combatant::new("Hero", 10, 0)).unwrap();

        let added = roster
            .bus()
            .history_of(EventSource::group(group), EventKind::FighterAdded);
        assert_eq!(added, vec![&BattleEvent::FighterAdded { fighter: hero }]);
        assert_eq!(roster.side_of(hero), Some(Side::Human));
    }

    #[test]
    fn test_defeat_fires_once_per_transition() {
        let mut roster = Roster::new();
        let group = roster.add_group("Monsters", Side::Enemy);
        let goblin = roster.spawn_into(group, Combatant::new("Goblin", 10, 0)).unwrap();

        {
            let (c, bus) = roster.split_mut(goblin).unwrap();
            c.kill(bus);
        }
        assert!(roster.update_defeat(group).unwrap());
        assert!(!roster.update_defeat(group).unwrap());

        {
            let (c, bus) = roster.split_mut(goblin).unwrap();
            c.revive(5, bus).unwrap();
        }
        assert!(!roster.update_defeat(group).unwrap());
        assert!(!roster.group(group).unwrap().is_defeated());

        {
            let (c, bus) = roster.split_mut(goblin).unwrap();
            c.kill(bus);
        }
        assert!(roster.update_defeat(group).unwrap());
        let defeats = roster
            .bus()
            .history_of(EventSource::group(group), EventKind::TeamDefeated);
        assert_eq!(defeats.len(), 2);
    }

    #[test]
    fn test_grant_shield_uses_fresh_ids() {
        let mut roster = Roster::new();
        let hero = roster.add_combatant(Combatant::new("Hero", 10, 0));
        let template = Shield::new("Barrier", 5);

        let (first, none) = roster.grant_shield(hero, &template).unwrap();
        let (second, replaced) = roster.grant_shield(hero, &template).unwrap();
        assert!(none.is_none());
        assert_eq!(replaced, Some(first));
        assert_ne!(first, second);
    }

    #[test]
    fn test_unknown_ids() {
        let roster = Roster::new();
        assert!(matches!(
            roster.combatant(CombatantId(3)),
            Err(BattleError::UnknownCombatant(CombatantId(3)))
        ));
        assert!(matches!(
            roster.group(GroupId(1)),
            Err(BattleError::UnknownGroup(GroupId(1)))
        ));
    }
}
