//! Shield grant, fortify and bust

use super::super::Battle;
use crate::combatant::Shield;
use crate::error::BattleError;
use crate::events::{EventSource, MoveFailureReason};
use crate::types::CombatantId;

impl Battle<'_> {
    /// Equip a fresh copy of `template`, dropping the subscriptions of the
    /// shield it replaces
    pub(super) fn grant_shield(&mut self, target: CombatantId, template: &Shield) -> Result<(), BattleError> {
        if !self.roster.is_alive(target) {
            return Ok(());
        }
        let (_, previous) = self.roster.grant_shield(target, template)?;
        if let Some(old) = previous {
            self.unwire(EventSource::Shield {
                id: old,
                owner: target,
            });
        }
        self.pump()
    }

    pub(super) fn fortify_shield(
        &mut self,
        actor: CombatantId,
        move_name: &str,
        target: CombatantId,
        defense: i32,
        health: i32,
    ) -> Result<(), BattleError> {
        let fortified = {
            let (combatant, bus) = self.roster.split_mut(target)?;
            combatant.fortify_shield(defense, health, bus)
        };
        if !fortified {
            return self.fail(actor, move_name, MoveFailureReason::NoShield);
        }
        self.pump()
    }

    pub(super) fn bust_shield(
        &mut self,
        actor: CombatantId,
        move_name: &str,
        target: CombatantId,
        power: i32,
    ) -> Result<(), BattleError> {
        let resistance = match self.roster.combatant(target)?.shield() {
            None => return self.fail(actor, move_name, MoveFailureReason::NoShield),
            Some(shield) => shield.bust_resistance,
        };
        if resistance > power {
            return self.fail(actor, move_name, MoveFailureReason::ShieldTooStrong);
        }
        let (combatant, bus) = self.roster.split_mut(target)?;
        combatant.destroy_shield(bus);
        self.pump()
    }
}
