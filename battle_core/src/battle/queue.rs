//! Move queue with re-sorting on every pop

use crate::calc::{effective_speed, modifier_stack};
use crate::effect::EffectTracker;
use crate::error::BattleError;
use crate::moves::MoveWithTarget;
use crate::roster::Roster;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct QueuedMove {
    action: MoveWithTarget,
    /// Declaration order, the final tie breaker
    order: usize,
}

/// Moves declared for one round
///
/// Order is priority (descending), effective speed (descending), then
/// declaration order. Speed is re-read before every pop so a buff applied by
/// an earlier mover reorders everyone who has not acted yet.
#[derive(Debug, Clone, Default)]
pub struct MoveQueue {
    entries: Vec<QueuedMove>,
}

impl MoveQueue {
    /// Queue the declared actions, dropping empty slots and dead actors
    pub fn build(
        actions: impl IntoIterator<Item = Option<MoveWithTarget>>,
        roster: &Roster,
    ) -> Self {
        let entries = actions
            .into_iter()
            .flatten()
            .filter(|action| roster.is_alive(action.owner))
            .enumerate()
            .map(|(order, action)| QueuedMove { action, order })
            .collect();
        MoveQueue { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn speed_of(action: &MoveWithTarget, roster: &Roster, effects: &EffectTracker) -> Result<f64, BattleError> {
        let actor = roster.combatant(action.owner)?;
        let stack = modifier_stack(actor, roster.side_of(action.owner), effects);
        Ok(effective_speed(actor, &stack))
    }

    /// Index of the entry that moves next
    fn front(&self, roster: &Roster, effects: &EffectTracker) -> Result<Option<usize>, BattleError> {
        let mut best: Option<(usize, i32, f64, usize)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            let priority = entry.action.mv.priority;
            let speed = Self::speed_of(&entry.action, roster, effects)?;
            let better = match best {
                None => true,
                Some((_, best_priority, best_speed, best_order)) => {
                    match priority
                        .cmp(&best_priority)
                        .then(speed.total_cmp(&best_speed))
                    {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => entry.order < best_order,
                    }
                }
            };
            if better {
                best = Some((index, priority, speed, entry.order));
            }
        }
        Ok(best.map(|(index, ..)| index))
    }

    /// Re-sort and take the next move
    pub fn pop(&mut self, roster: &Roster, effects: &EffectTracker) -> Result<Option<MoveWithTarget>, BattleError> {
        Ok(self
            .front(roster, effects)?
            .map(|index| self.entries.remove(index).action))
    }

    /// The order moves would run in if nothing changed from now on
    pub fn preview(&self, roster: &Roster, effects: &EffectTracker) -> Result<Vec<MoveWithTarget>, BattleError> {
        let mut copy = self.clone();
        let mut order = Vec::with_capacity(copy.len());
        while let Some(action) = copy.pop(roster, effects)? {
            order.push(action);
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::moves::Move;
    use crate::status::{Modifier, Status};
    use crate::types::{CombatantId, Side, StatType};
    use proptest::prelude::*;

    fn roster_with_speeds(speeds: &[i32]) -> (Roster, Vec<CombatantId>) {
        let mut roster = Roster::new();
        let group = roster.add_group("Heroes", Side::Human);
        let ids = speeds
            .iter()
            .enumerate()
            .map(|(i, speed)| {
                roster
                    .spawn_into(
                        group,
                        Combatant::new(format!("Hero{}", i), 10, 0).with_stats(1, 0, *speed, 0, 0),
                    )
                    .unwrap()
            })
            .collect();
        (roster, ids)
    }

    fn attack(owner: CombatantId) -> Option<MoveWithTarget> {
        Some(MoveWithTarget::new(Move::attack("attack", 100), owner, None))
    }

    #[test]
    fn test_priority_then_speed_then_declaration() {
        let (roster, ids) = roster_with_speeds(&[5, 9, 5, 1]);
        let effects = EffectTracker::new();
        let quick = MoveWithTarget::new(Move::attack("jab", 100).with_priority(1), ids[3], None);
        let queue = MoveQueue::build(
            vec![attack(ids[0]), attack(ids[1]), None, attack(ids[2]), Some(quick)],
            &roster,
        );
        assert_eq!(queue.len(), 4);

        let order: Vec<CombatantId> = queue
            .preview(&roster, &effects)
            .unwrap()
            .into_iter()
            .map(|a| a.owner)
            .collect();
        assert_eq!(order, vec![ids[3], ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn test_dead_actors_are_dropped() {
        let (mut roster, ids) = roster_with_speeds(&[5, 5]);
        {
            let (c, bus) = roster.split_mut(ids[0]).unwrap();
            c.kill(bus);
        }
        let queue = MoveQueue::build(vec![attack(ids[0]), attack(ids[1])], &roster);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_resorts_between_pops() {
        let (mut roster, ids) = roster_with_speeds(&[5, 5, 5]);
        let effects = EffectTracker::new();
        let mut queue = MoveQueue::build(vec![attack(ids[0]), attack(ids[1]), attack(ids[2])], &roster);

        assert_eq!(queue.pop(&roster, &effects).unwrap().unwrap().owner, ids[0]);
        {
            let (c, bus) = roster.split_mut(ids[2]).unwrap();
            c.add_status(
                Status::modifier(Modifier::Stat { stat: StatType::Speed, multiplier: 2.0 }, 3),
                bus,
            );
        }
        assert_eq!(queue.pop(&roster, &effects).unwrap().unwrap().owner, ids[2]);
        assert_eq!(queue.pop(&roster, &effects).unwrap().unwrap().owner, ids[1]);
        assert!(queue.pop(&roster, &effects).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_pop_order_is_sorted(specs in prop::collection::vec((0i32..3, 0i32..20), 1..12)) {
            let speeds: Vec<i32> = specs.iter().map(|(_, s)| *s).collect();
            let (roster, ids) = roster_with_speeds(&speeds);
            let effects = EffectTracker::new();
            let actions = specs.iter().zip(&ids).map(|((priority, _), id)| {
                Some(MoveWithTarget::new(Move::attack("attack", 100).with_priority(*priority), *id, None))
            });
            let order = MoveQueue::build(actions, &roster).preview(&roster, &effects).unwrap();
            prop_assert_eq!(order.len(), ids.len());

            for pair in order.windows(2) {
                let a = &pair[0];
                let b = &pair[1];
                let speed_a = roster.combatant(a.owner).unwrap().speed;
                let speed_b = roster.combatant(b.owner).unwrap().speed;
                let key_a = (a.mv.priority, speed_a, std::cmp::Reverse(a.owner.0));
                let key_b = (b.mv.priority, speed_b, std::cmp::Reverse(b.owner.0));
                prop_assert!(key_a > key_b);
            }
        }
    }
}
