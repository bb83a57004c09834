//! Round and battle controller
//!
//! ```text
//! Setup -> { BuildQueue -> ExecuteQueue -> EndOfRound }* -> Teardown
//! ```
//!
//! A [`Battle`] borrows the [`Roster`] for the length of one encounter.
//! Combatants and groups outlive the battle, so every subscription wired in
//! setup is removed again in teardown, whether the battle ended normally or
//! with an error.

mod dispatch;
mod input;
mod queue;
mod router;

pub use input::{ActionSource, AttackFirstLiving, Declaration, DeclarationContext};
pub use queue::MoveQueue;

use crate::config::BattleConfig;
use crate::effect::EffectTracker;
use crate::error::BattleError;
use crate::events::{BattleEvent, EventSource, MoveFailureReason, SubscriptionId};
use crate::moves::{replacement_target, MoveKind, MoveWithTarget};
use crate::narration::Narrator;
use crate::oracle::ChanceOracle;
use crate::progression::Progression;
use crate::roster::Roster;
use crate::calc::{magic::spell_cost, modifier_stack};
use crate::types::{CombatantId, GroupId, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How an encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Ran,
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    Setup,
    BuildQueue,
    ExecuteQueue,
    EndOfRound,
    Teardown,
    Finished,
}

/// One encounter between a human group and an enemy group
pub struct Battle<'a> {
    pub(crate) roster: &'a mut Roster,
    pub(crate) humans: GroupId,
    pub(crate) enemies: GroupId,
    pub(crate) config: BattleConfig,
    pub(crate) oracle: &'a mut dyn ChanceOracle,
    pub(crate) narrator: &'a mut dyn Narrator,
    pub(crate) progression: Option<&'a dyn Progression>,
    pub(crate) effects: EffectTracker,
    subscriptions: Vec<SubscriptionId>,
    wired: BTreeSet<EventSource>,
    exp_pool: u32,
    round: u32,
    phase: BattlePhase,
    /// Set once a side is defeated or has fled
    decided: bool,
    outcome: Option<BattleOutcome>,
}

impl<'a> Battle<'a> {
    pub fn new(
        roster: &'a mut Roster,
        humans: GroupId,
        enemies: GroupId,
        config: BattleConfig,
        oracle: &'a mut dyn ChanceOracle,
        narrator: &'a mut dyn Narrator,
    ) -> Result<Self, BattleError> {
        if roster.group(humans)?.side != Side::Human {
            return Err(BattleError::invalid(format!("{} is not a human group", humans)));
        }
        if roster.group(enemies)?.side != Side::Enemy {
            return Err(BattleError::invalid(format!("{} is not an enemy group", enemies)));
        }
        Ok(Battle {
            roster,
            humans,
            enemies,
            config,
            oracle,
            narrator,
            progression: None,
            effects: EffectTracker::new(),
            subscriptions: Vec::new(),
            wired: BTreeSet::new(),
            exp_pool: 0,
            round: 0,
            phase: BattlePhase::Setup,
            decided: false,
            outcome: None,
        })
    }

    /// Level thresholds used when experience is granted
    pub fn with_progression(mut self, progression: &'a dyn Progression) -> Self {
        self.progression = Some(progression);
        self
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Set once teardown has decided how the battle ended
    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// Experience earned so far from fallen enemies
    pub fn exp_pool(&self) -> u32 {
        self.exp_pool
    }

    pub fn effects(&self) -> &EffectTracker {
        &self.effects
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        self.roster
    }

    fn enter(&mut self, phase: BattlePhase) {
        tracing::info!(round = self.round, from = ?self.phase, to = ?phase, "battle phase");
        self.phase = phase;
    }

    /// Fight until one side is defeated or flees
    pub fn run(
        &mut self,
        human_source: &mut dyn ActionSource,
        enemy_source: &mut dyn ActionSource,
    ) -> Result<BattleOutcome, BattleError> {
        let result = self
            .setup()
            .and_then(|()| self.round_loop(human_source, enemy_source));
        let outcome = self.teardown(result.is_ok());
        match (result, outcome) {
            (Err(e), _) => {
                tracing::error!(error = %e, "battle aborted");
                Err(e)
            }
            (Ok(()), outcome) => outcome,
        }
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    fn setup(&mut self) -> Result<(), BattleError> {
        self.enter(BattlePhase::Setup);
        // Events from before the battle are history, not work
        self.roster.bus_mut().discard_pending();

        self.wire_group(self.humans)?;
        self.wire_group(self.enemies)?;
        for member in self.all_members()? {
            self.wire_fighter(member)?;
        }
        // Revives between battles never reached a router; re-arm the latches
        for group in [self.humans, self.enemies] {
            self.roster.update_defeat(group)?;
        }

        if self.config.narration.show_intro_messages {
            let names = self
                .roster
                .living_members(self.enemies)?
                .into_iter()
                .map(|id| self.name_of(id))
                .collect::<Vec<_>>()
                .join(", ");
            self.narrator.write_line(&format!("{} appeared!", names));
        }

        for member in self.all_members()? {
            let Some(behavior) = self.roster.combatant(member)?.behavior() else {
                continue;
            };
            if let Some(action) = behavior.pre_battle_move(member, self.roster) {
                tracing::debug!(actor = %self.name_of(member), mv = %action.mv.name, "pre-battle move");
                self.execute_move(&action, true)?;
            }
        }
        self.pump()?;
        self.check_decided()?;
        Ok(())
    }

    fn all_members(&self) -> Result<Vec<CombatantId>, BattleError> {
        let mut members = self.roster.members(self.humans)?;
        members.extend(self.roster.members(self.enemies)?);
        Ok(members)
    }

    // ------------------------------------------------------------------
    // Rounds
    // ------------------------------------------------------------------

    fn round_loop(
        &mut self,
        human_source: &mut dyn ActionSource,
        enemy_source: &mut dyn ActionSource,
    ) -> Result<(), BattleError> {
        while !self.decided {
            self.round += 1;
            self.enter(BattlePhase::BuildQueue);

            let Some(human_actions) = self.collect(Side::Human, human_source)? else {
                return self.retreat(self.humans);
            };
            let Some(enemy_actions) = self.collect(Side::Enemy, enemy_source)? else {
                return self.retreat(self.enemies);
            };
            let actions = human_actions
                .into_iter()
                .chain(enemy_actions)
                .map(|slot| slot.map(|action| self.lock_in(action)))
                .collect::<Vec<_>>();
            let mut queue = MoveQueue::build(actions, self.roster);

            self.enter(BattlePhase::ExecuteQueue);
            while let Some(action) = queue.pop(self.roster, &self.effects)? {
                self.execute_action(action)?;
                if self.decided {
                    break;
                }
            }
            if self.decided {
                break;
            }

            self.enter(BattlePhase::EndOfRound);
            self.end_round()?;
        }
        Ok(())
    }

    /// Ask one side for its moves. `None` means the side retreats.
    fn collect(
        &mut self,
        side: Side,
        source: &mut dyn ActionSource,
    ) -> Result<Option<Vec<Option<MoveWithTarget>>>, BattleError> {
        let (group, opposing) = match side {
            Side::Human => (self.humans, self.enemies),
            Side::Enemy => (self.enemies, self.humans),
        };
        let mut ctx = DeclarationContext {
            roster: self.roster,
            side,
            group,
            opposing,
            round: self.round,
            config: &mut self.config,
        };
        let actions = match source.declare(&mut ctx) {
            Declaration::Retreat => return Ok(None),
            Declaration::Actions(actions) => actions,
        };
        for action in actions.iter().flatten() {
            if !self.roster.group(group)?.contains(action.owner) {
                return Err(BattleError::invalid(format!(
                    "{} declared a move for {} outside its group",
                    side,
                    self.name_of(action.owner)
                )));
            }
            action.mv.validate()?;
        }
        Ok(Some(actions))
    }

    /// An actor in the middle of a multi-turn move continues it
    fn lock_in(&self, action: MoveWithTarget) -> MoveWithTarget {
        match self
            .roster
            .combatant(action.owner)
            .ok()
            .and_then(|c| c.multi_turn())
        {
            Some(progress) => MoveWithTarget::new(progress.mv.clone(), action.owner, progress.target),
            None => action,
        }
    }

    fn retreat(&mut self, group: GroupId) -> Result<(), BattleError> {
        tracing::info!(group = %group, "retreat declared");
        self.roster.flee(group)?;
        self.pump()?;
        self.decided = true;
        Ok(())
    }

    /// Run one popped move with its checks, pause and turn end
    fn execute_action(&mut self, mut action: MoveWithTarget) -> Result<(), BattleError> {
        let actor = action.owner;
        if !self.roster.is_alive(actor) {
            tracing::debug!(actor = %self.name_of(actor), "skipping dead actor");
            return Ok(());
        }

        if let Some(reason) = self.blocked_reason(&action)? {
            tracing::debug!(actor = %self.name_of(actor), mv = %action.mv.name, %reason, "move blocked");
            self.fail(actor, &action.mv.name, reason)?;
            self.narrator.wait_for_acknowledgment();
            self.end_turn(actor)?;
            return Ok(());
        }

        if !self.retarget(&mut action)? {
            tracing::debug!(actor = %self.name_of(actor), mv = %action.mv.name, "no target left");
            self.end_turn(actor)?;
            return Ok(());
        }

        tracing::debug!(actor = %self.name_of(actor), mv = %action.mv.name, target = ?action.target, "executing");
        self.execute_move(&action, false)?;
        self.check_decided()?;

        if !action.mv.is_silent() {
            self.narrator.wait_for_acknowledgment();
        }
        self.end_turn(actor)?;
        Ok(())
    }

    /// Why an actor cannot perform this move, if it cannot
    fn blocked_reason(&self, action: &MoveWithTarget) -> Result<Option<MoveFailureReason>, BattleError> {
        let actor = self.roster.combatant(action.owner)?;
        if actor.is_disabled() && !matches!(action.mv.kind, MoveKind::DoNothing { .. }) {
            return Ok(Some(MoveFailureReason::Disabled));
        }
        if let Some(spell) = action.mv.spell_data() {
            if !actor.knows_spell(&spell.name) {
                return Ok(Some(MoveFailureReason::SpellNotKnown));
            }
            if actor.is_magic_sealed() {
                return Ok(Some(MoveFailureReason::MagicSealed));
            }
            let stack = modifier_stack(actor, self.roster.side_of(action.owner), &self.effects);
            if spell_cost(spell, &stack) > actor.current_mana() {
                return Ok(Some(MoveFailureReason::NotEnoughMana));
            }
        }
        Ok(None)
    }

    /// Point a single-target move at a living target. Returns false if no
    /// candidate is left.
    fn retarget(&mut self, action: &mut MoveWithTarget) -> Result<bool, BattleError> {
        let target_type = action.mv.target_type;
        if !target_type.is_single() {
            return Ok(true);
        }
        if let Some(target) = action.target {
            if self.roster.is_alive(target) {
                return Ok(true);
            }
        }
        let (own, opposing) = self.groups_of(action.owner)?;
        let replacement = replacement_target(self.roster, action.owner, own, opposing, target_type)?;
        tracing::debug!(from = ?action.target, to = ?replacement, "retargeting");
        action.target = replacement;
        Ok(replacement.is_some())
    }

    fn end_turn(&mut self, actor: CombatantId) -> Result<(), BattleError> {
        if self.roster.is_alive(actor) {
            let (combatant, bus) = self.roster.split_mut(actor)?;
            combatant.end_turn(bus);
            self.pump()?;
        }
        Ok(())
    }

    fn end_round(&mut self) -> Result<(), BattleError> {
        for expired in self.effects.tick() {
            tracing::debug!(effect = %expired.name, side = %expired.side, "field effect expired");
            if self.config.narration.show_status_messages {
                self.narrator
                    .write_line(&format!("{} wore off for the {} side.", expired.name, expired.side));
            }
        }
        let round = self.round;
        for group in [self.humans, self.enemies] {
            self.roster
                .bus_mut()
                .publish(EventSource::group(group), BattleEvent::RoundEnded { round });
            for member in self.roster.living_members(group)? {
                self.roster
                    .bus_mut()
                    .publish(EventSource::combatant(member), BattleEvent::RoundEnded { round });
            }
        }
        self.pump()
    }

    /// Latch the end of the battle once a side is out
    fn check_decided(&mut self) -> Result<(), BattleError> {
        let humans = self.roster.group(self.humans)?;
        let enemies = self.roster.group(self.enemies)?;
        if humans.has_fled()
            || enemies.has_fled()
            || self.roster.all_dead(self.humans)?
            || self.roster.all_dead(self.enemies)?
        {
            self.decided = true;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    fn decide_outcome(&self) -> Result<Option<BattleOutcome>, BattleError> {
        let outcome = if self.roster.all_dead(self.enemies)? {
            Some(BattleOutcome::Victory)
        } else if self.roster.all_dead(self.humans)? {
            Some(BattleOutcome::Defeat)
        } else if self.roster.group(self.enemies)?.has_fled() {
            Some(BattleOutcome::Victory)
        } else if self.roster.group(self.humans)?.has_fled() {
            Some(BattleOutcome::Ran)
        } else {
            None
        };
        Ok(outcome)
    }

    /// Decide the outcome, hand out experience and unhook everything.
    /// Safe to call more than once.
    fn teardown(&mut self, completed: bool) -> Result<BattleOutcome, BattleError> {
        if self.phase == BattlePhase::Finished {
            return self
                .outcome
                .ok_or_else(|| BattleError::contract("battle finished without an outcome"));
        }
        self.enter(BattlePhase::Teardown);
        let result = self.settle(completed);
        self.outcome = result.as_ref().ok().copied();

        let removed = self
            .subscriptions
            .drain(..)
            .filter(|id| self.roster.bus_mut().unsubscribe(*id))
            .count();
        self.wired.clear();
        self.roster.bus_mut().discard_pending();
        self.effects.clear();
        self.exp_pool = 0;
        for group in [self.humans, self.enemies] {
            self.roster.reset_fled(group)?;
            for member in self.roster.members(group)? {
                self.roster.combatant_mut(member)?.reset_battle_state();
            }
        }
        tracing::info!(subscriptions = removed, "battle torn down");
        self.enter(BattlePhase::Finished);
        result
    }

    fn settle(&mut self, completed: bool) -> Result<BattleOutcome, BattleError> {
        let outcome = self
            .decide_outcome()?
            .ok_or_else(|| BattleError::contract("battle ended without a decided side"));
        if !completed {
            return outcome;
        }
        let outcome = outcome?;

        if outcome == BattleOutcome::Victory && self.exp_pool > 0 {
            let pool = self.exp_pool;
            for member in self.roster.living_members(self.humans)? {
                let progression = self.progression;
                let (combatant, bus) = self.roster.split_mut(member)?;
                combatant.gain_exp(pool, progression, bus)?;
            }
        }
        self.pump()?;

        if self.config.narration.show_intro_messages {
            let line = match outcome {
                BattleOutcome::Victory => "Victory!",
                BattleOutcome::Defeat => "Your party has fallen...",
                BattleOutcome::Ran => "Got away safely.",
            };
            self.narrator.write_line(line);
        }
        tracing::info!(?outcome, rounds = self.round, "battle finished");
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    pub(crate) fn name_of(&self, id: CombatantId) -> String {
        self.roster
            .combatant(id)
            .map(|c| c.display_name())
            .unwrap_or_else(|_| id.to_string())
    }

    pub(crate) fn group_name(&self, id: GroupId) -> String {
        self.roster
            .group(id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    pub(crate) fn group_for(&self, side: Side) -> GroupId {
        match side {
            Side::Human => self.humans,
            Side::Enemy => self.enemies,
        }
    }

    /// The actor's group and the group it fights
    pub(crate) fn groups_of(&self, actor: CombatantId) -> Result<(GroupId, GroupId), BattleError> {
        let side = self.side_of(actor)?;
        Ok((self.group_for(side), self.group_for(side.opponent())))
    }

    pub(crate) fn side_of(&self, actor: CombatantId) -> Result<Side, BattleError> {
        self.roster
            .side_of(actor)
            .ok_or_else(|| BattleError::invalid(format!("{} is not in a group", self.name_of(actor))))
    }

    /// Publish a move failure from `actor`
    pub(crate) fn fail(&mut self, actor: CombatantId, move_name: &str, reason: MoveFailureReason) -> Result<(), BattleError> {
        self.roster.bus_mut().publish(
            EventSource::combatant(actor),
            BattleEvent::MoveFailed {
                move_name: move_name.to_string(),
                reason,
            },
        );
        self.pump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::narration::BufferNarrator;
    use crate::oracle::ScriptedOracle;

    fn idle(_ctx: &mut DeclarationContext<'_>) -> Declaration {
        Declaration::Actions(Vec::new())
    }

    #[test]
    fn test_teardown_twice_changes_nothing() {
        let mut roster = Roster::new();
        let heroes = roster.add_group("Heroes", Side::Human);
        let monsters = roster.add_group("Monsters", Side::Enemy);
        let hero = roster
            .spawn_into(heroes, Combatant::new("Hero", 20, 0).with_stats(10, 0, 10, 0, 0))
            .unwrap();
        roster
            .spawn_into(monsters, Combatant::new("Slime", 5, 0).with_exp_reward(4))
            .unwrap();

        let mut oracle = ScriptedOracle::always(true);
        let mut narrator = BufferNarrator::new();
        {
            let mut battle = Battle::new(
                &mut roster,
                heroes,
                monsters,
                BattleConfig::default(),
                &mut oracle,
                &mut narrator,
            )
            .unwrap();
            assert_eq!(battle.outcome(), None);

            let outcome = battle.run(&mut AttackFirstLiving, &mut idle).unwrap();
            assert_eq!(outcome, BattleOutcome::Victory);
            assert_eq!(battle.phase(), BattlePhase::Finished);

            let again = battle.teardown(true).unwrap();
            assert_eq!(again, BattleOutcome::Victory);
            assert_eq!(battle.outcome(), Some(BattleOutcome::Victory));
            assert_eq!(battle.roster().combatant(hero).unwrap().exp, 4);
            assert_eq!(battle.roster().bus().subscription_count(), 0);
        }
        let victories = narrator.lines().iter().filter(|line| *line == "Victory!").count();
        assert_eq!(victories, 1);
    }
}
