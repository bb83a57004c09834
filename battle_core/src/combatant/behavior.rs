//! Per-combatant override hook for bosses and unique monsters

use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::moves::MoveWithTarget;
use crate::narration::Narrator;
use crate::oracle::ChanceOracle;
use crate::roster::Roster;
use crate::types::CombatantId;
use std::fmt;

/// Everything a special move may touch while it resolves
pub struct SpecialContext<'a> {
    pub actor: CombatantId,
    pub target: Option<CombatantId>,
    pub roster: &'a mut Roster,
    pub oracle: &'a mut dyn ChanceOracle,
    pub narrator: &'a mut dyn Narrator,
    pub config: &'a BattleConfig,
}

impl SpecialContext<'_> {
    /// Write a line unless `show` is off
    pub fn say(&mut self, show: bool, line: &str) {
        if show {
            self.narrator.write_line(line);
        }
    }
}

/// Custom behaviour attached to a combatant
///
/// A combatant with a `Special` move in its catalog must carry a behaviour;
/// dispatching a special move on a combatant without one is a contract
/// violation.
pub trait CombatantBehavior: fmt::Debug {
    /// A free move resolved once before the first round
    fn pre_battle_move(&self, _me: CombatantId, _roster: &Roster) -> Option<MoveWithTarget> {
        None
    }

    /// Resolve the special move `id`
    fn special_move(&self, id: &str, ctx: &mut SpecialContext<'_>) -> Result<(), BattleError>;
}
