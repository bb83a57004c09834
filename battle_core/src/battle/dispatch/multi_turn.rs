//! Multi-turn moves and dances

use super::super::Battle;
use crate::combatant::MultiTurnProgress;
use crate::effect::DanceOutcome;
use crate::error::BattleError;
use crate::moves::{replacement_target, DanceStep, Move, MoveWithTarget};
use crate::types::CombatantId;

impl Battle<'_> {
    /// Run the next sub-move of a multi-turn move
    ///
    /// Progress lives on the actor, so the following rounds continue where
    /// this one stopped. A dance step is registered for the actor's side on
    /// every activation.
    pub(super) fn resolve_multi_turn(
        &mut self,
        action: &MoveWithTarget,
        moves: &[Move],
        dance: Option<DanceStep>,
    ) -> Result<(), BattleError> {
        let actor = action.owner;
        let index = self
            .roster
            .combatant(actor)?
            .multi_turn()
            .filter(|progress| progress.mv.name == action.mv.name)
            .map_or(0, |progress| progress.next_index);
        let sub = moves.get(index).cloned().ok_or_else(|| {
            BattleError::contract(format!(
                "multi-turn move '{}' has no step {}",
                action.mv.name, index
            ))
        })?;

        if let Some(step) = dance {
            self.register_dance(actor, step)?;
        }

        let next_index = index + 1;
        self.roster.combatant_mut(actor)?.multi_turn = (next_index < moves.len()).then(|| MultiTurnProgress {
            mv: action.mv.clone(),
            target: action.target,
            next_index,
        });
        tracing::debug!(actor = %self.name_of(actor), step = index, sub = %sub.name, "multi-turn step");

        let mut sub_action = MoveWithTarget::new(sub, actor, action.target);
        if sub_action.mv.target_type.is_single() && !sub_action.target.map_or(false, |t| self.roster.is_alive(t)) {
            let (own, opposing) = self.groups_of(actor)?;
            sub_action.target = replacement_target(
                self.roster,
                actor,
                own,
                opposing,
                sub_action.mv.target_type,
            )?;
            if sub_action.target.is_none() {
                return Ok(());
            }
        }
        self.execute_move(&sub_action, false)
    }

    fn register_dance(&mut self, actor: CombatantId, step: DanceStep) -> Result<(), BattleError> {
        let side = self.side_of(actor)?;
        let outcome = self
            .effects
            .register_dance(step.dance, side, actor, step.duration)?;
        if !self.config.narration.show_status_messages {
            return Ok(());
        }
        let line = match outcome {
            DanceOutcome::Started => Some(format!("{} begins a {}!", self.name_of(actor), step.dance)),
            DanceOutcome::Refreshed => None,
            DanceOutcome::Combined { partner, compound } => Some(format!(
                "The {} and the {} combine into {}!",
                partner, step.dance, compound
            )),
        };
        if let Some(line) = line {
            self.narrator.write_line(&line);
        }
        Ok(())
    }
}
