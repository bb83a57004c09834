//! Move dispatcher
//!
//! One entry point, [`Battle::execute_move`], switching over [`MoveKind`].
//! Each variant's algorithm lives in its own file. Expected failures publish
//! `MoveFailed` and return `Ok`; only contract violations and illegal input
//! leave the dispatcher as errors.

mod attack;
mod field;
mod multi_turn;
mod shield;
mod special;
mod spell;
mod status;

use super::Battle;
use crate::error::BattleError;
use crate::moves::{resolve_targets, MoveKind, MoveWithTarget};
use crate::types::CombatantId;

impl Battle<'_> {
    /// Resolve one move, then its field-effect payload
    ///
    /// `free` skips mana costs (pre-battle moves).
    pub(crate) fn execute_move(&mut self, action: &MoveWithTarget, free: bool) -> Result<(), BattleError> {
        let mv = &action.mv;
        mv.validate()?;
        let actor = action.owner;
        if !self.roster.is_alive(actor) {
            return Ok(());
        }

        match &mv.kind {
            MoveKind::Attack(attack) => {
                for target in self.targets_of(action)? {
                    self.resolve_attack(actor, target, attack, false)?;
                }
            }
            MoveKind::Spell { spell } => {
                let targets = self.targets_of(action)?;
                // One payment per cast, however many targets it reaches
                if !targets.is_empty() && (free || self.pay_for_spell(actor, &mv.name, spell)?) {
                    for target in targets {
                        self.resolve_spell(actor, target, spell)?;
                    }
                }
            }
            MoveKind::Status {
                status,
                duration,
                accuracy,
            } => {
                let targets = self.targets_of(action)?;
                self.resolve_status(actor, &mv.name, &targets, *status, *duration, *accuracy)?;
            }
            MoveKind::ShieldGrant { shield } => {
                for target in self.targets_of(action)? {
                    self.grant_shield(target, shield)?;
                }
            }
            MoveKind::ShieldFortify { defense, health } => {
                for target in self.targets_of(action)? {
                    self.fortify_shield(actor, &mv.name, target, *defense, *health)?;
                }
            }
            MoveKind::ShieldBust { power } => {
                for target in self.targets_of(action)? {
                    self.bust_shield(actor, &mv.name, target, *power)?;
                }
            }
            MoveKind::DoNothing { message } => {
                if let Some(message) = message {
                    if self.config.narration.show_attack_messages {
                        self.narrator.write_line(message);
                    }
                }
            }
            MoveKind::Runaway => {
                let (own, _) = self.groups_of(actor)?;
                if self.config.narration.show_attack_messages {
                    let line = format!("{} tries to run away!", self.name_of(actor));
                    self.narrator.write_line(&line);
                }
                self.roster.flee(own)?;
            }
            MoveKind::MultiTurn { moves, dance } => {
                self.resolve_multi_turn(action, moves, *dance)?;
            }
            MoveKind::Special { id } => {
                self.resolve_special(actor, action.target, id)?;
            }
            MoveKind::Field => {}
            MoveKind::Bell {
                bell,
                power,
                duration,
            } => {
                if let Some(target) = action.target {
                    self.resolve_bell(actor, target, *bell, *power, *duration)?;
                }
            }
            MoveKind::ShadeAbsorb => {
                if let Some(target) = action.target {
                    self.resolve_shade_absorb(actor, &mv.name, target)?;
                }
            }
        }
        self.pump()?;

        if let Some(effect) = &mv.field_effect {
            if self.roster.is_alive(actor) {
                self.apply_field_effect(actor, effect)?;
                self.pump()?;
            }
        }
        Ok(())
    }

    fn targets_of(&self, action: &MoveWithTarget) -> Result<Vec<CombatantId>, BattleError> {
        let (own, opposing) = self.groups_of(action.owner)?;
        resolve_targets(
            self.roster,
            action.owner,
            action.target,
            own,
            opposing,
            action.mv.target_type,
        )
    }
}
