//! Behaviour hooks and narrative moves

use super::super::Battle;
use crate::combatant::SpecialContext;
use crate::error::BattleError;
use crate::events::MoveFailureReason;
use crate::moves::BellType;
use crate::status::{Status, StatusKind};
use crate::types::CombatantId;

impl Battle<'_> {
    /// Hand a special move to the actor's behaviour hook
    pub(super) fn resolve_special(
        &mut self,
        actor: CombatantId,
        target: Option<CombatantId>,
        id: &str,
    ) -> Result<(), BattleError> {
        let behavior = self.roster.combatant(actor)?.behavior().ok_or_else(|| {
            BattleError::contract(format!(
                "special move '{}' on {} without a behaviour",
                id,
                self.name_of(actor)
            ))
        })?;
        let mut ctx = SpecialContext {
            actor,
            target,
            roster: &mut *self.roster,
            oracle: &mut *self.oracle,
            narrator: &mut *self.narrator,
            config: &self.config,
        };
        behavior.special_move(id, &mut ctx)
    }

    /// Seal: heal the ringer by `power` percent and disable the target.
    /// Silence: magic-seal the target.
    pub(super) fn resolve_bell(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        bell: BellType,
        power: i32,
        duration: u32,
    ) -> Result<(), BattleError> {
        if self.config.narration.show_status_messages {
            let line = format!("{} rings the bell!", self.name_of(actor));
            self.narrator.write_line(&line);
        }
        let status = match bell {
            BellType::Seal => {
                let (ringer, bus) = self.roster.split_mut(actor)?;
                let amount = ringer.max_health() * power / 100;
                ringer.heal(amount.max(0), bus)?;
                StatusKind::Disabled
            }
            BellType::Silence => StatusKind::MagicSeal,
        };
        if self.roster.is_alive(target) {
            let (victim, bus) = self.roster.split_mut(target)?;
            victim.add_status(Status::new(status, duration), bus);
        }
        self.pump()
    }

    /// Absorb a same-archetype ally: the actor takes half of the ally's max
    /// health and strength, the ally falls
    pub(super) fn resolve_shade_absorb(
        &mut self,
        actor: CombatantId,
        move_name: &str,
        target: CombatantId,
    ) -> Result<(), BattleError> {
        let compatible = {
            let a = self.roster.combatant(actor)?;
            let t = self.roster.combatant(target)?;
            target != actor && t.is_alive() && t.archetype == a.archetype && t.group() == a.group()
        };
        if !compatible {
            return self.fail(actor, move_name, MoveFailureReason::IncompatibleTarget);
        }
        if self.config.narration.show_spell_messages {
            let line = format!("{} absorbs {}!", self.name_of(actor), self.name_of(target));
            self.narrator.write_line(&line);
        }
        let (health, strength) = {
            let (absorbed, bus) = self.roster.split_mut(target)?;
            absorbed.surrender_essence(bus)
        };
        let absorber = self.roster.combatant_mut(actor)?;
        absorber.raise_max_health(health);
        absorber.strength += strength;
        self.pump()
    }
}
