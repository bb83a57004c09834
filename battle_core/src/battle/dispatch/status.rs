//! Status-inflicting moves

use super::super::Battle;
use crate::error::BattleError;
use crate::events::MoveFailureReason;
use crate::status::{Status, StatusKind};
use crate::types::CombatantId;

impl Battle<'_> {
    /// Roll the move's accuracy once per target, then attach (or refresh)
    /// the status. Undo-debuffs clears instead of attaching.
    pub(super) fn resolve_status(
        &mut self,
        actor: CombatantId,
        move_name: &str,
        targets: &[CombatantId],
        kind: StatusKind,
        duration: u32,
        accuracy: i32,
    ) -> Result<(), BattleError> {
        let chance = (accuracy as f64 / 100.0).clamp(0.0, 1.0);
        for target in targets {
            if !self.roster.is_alive(*target) {
                continue;
            }
            if !self.oracle.event_occurs(chance) {
                self.fail(actor, move_name, MoveFailureReason::Resisted)?;
                continue;
            }
            let (combatant, bus) = self.roster.split_mut(*target)?;
            combatant.add_status(Status::new(kind, duration), bus);
            self.pump()?;
        }
        Ok(())
    }
}
