//! Statuses attached to a single combatant
//!
//! A status lives on exactly one combatant, counts down once per turn of that
//! combatant and is removed when its counter reaches zero.

mod modifier;

pub use modifier::{Modifier, ModifierStack};

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a status does while it is active
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StatusKind {
    /// A multiplier on one calculator input
    Modifier { modifier: Modifier },
    /// Bounces incoming spells back at their caster, scaled by `multiplier`
    Reflect { multiplier: f64 },
    /// Dodges every evadable attack, optionally striking back
    AutoEvade { counter_attack: bool },
    /// Strikes back once after being hit by an attack
    CounterAttack,
    /// Divides the holder's hit chance
    Blind,
    /// Prevents the holder from casting spells
    MagicSeal,
    /// Prevents the holder from acting at all
    Disabled,
    /// Clears debuffs when applied; never stays attached
    UndoDebuffs,
}

impl StatusKind {
    pub fn modifier(&self) -> Option<&Modifier> {
        match self {
            StatusKind::Modifier { modifier } => Some(modifier),
            _ => None,
        }
    }

    /// Whether `UndoDebuffs` removes this status
    pub fn is_debuff(&self) -> bool {
        match self {
            StatusKind::Modifier { modifier } => modifier.is_debuff(),
            StatusKind::Blind | StatusKind::MagicSeal | StatusKind::Disabled => true,
            StatusKind::Reflect { .. }
            | StatusKind::AutoEvade { .. }
            | StatusKind::CounterAttack
            | StatusKind::UndoDebuffs => false,
        }
    }

    /// Whether two kinds occupy the same slot on a combatant
    pub fn same_slot(&self, other: &StatusKind) -> bool {
        match (self, other) {
            (StatusKind::Modifier { modifier: a }, StatusKind::Modifier { modifier: b }) => {
                a.same_slot(b)
            }
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Modifier { modifier } => write!(f, "{}", modifier.describe()),
            StatusKind::Reflect { .. } => write!(f, "reflect"),
            StatusKind::AutoEvade { counter_attack: true } => write!(f, "auto-evade (counter)"),
            StatusKind::AutoEvade { counter_attack: false } => write!(f, "auto-evade"),
            StatusKind::CounterAttack => write!(f, "counter attack"),
            StatusKind::Blind => write!(f, "blind"),
            StatusKind::MagicSeal => write!(f, "magic seal"),
            StatusKind::Disabled => write!(f, "disabled"),
            StatusKind::UndoDebuffs => write!(f, "undo debuffs"),
        }
    }
}

/// One active status instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub kind: StatusKind,
    /// Turns of the holder left before the status falls off
    pub turns_remaining: u32,
}

impl Status {
    pub fn new(kind: StatusKind, turns: u32) -> Self {
        Status {
            kind,
            turns_remaining: turns,
        }
    }

    pub fn modifier(modifier: Modifier, turns: u32) -> Self {
        Status::new(StatusKind::Modifier { modifier }, turns)
    }

    pub fn is_debuff(&self) -> bool {
        self.kind.is_debuff()
    }

    /// Count down one turn. Returns true once the status has expired.
    pub fn tick(&mut self) -> bool {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        self.turns_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatType;

    #[test]
    fn test_tick_expires_at_zero() {
        let mut status = Status::new(StatusKind::Blind, 2);
        assert!(!status.tick());
        assert!(status.tick());
        assert_eq!(status.turns_remaining, 0);
    }

    #[test]
    fn test_debuff_classification() {
        assert!(StatusKind::Blind.is_debuff());
        assert!(StatusKind::MagicSeal.is_debuff());
        assert!(!StatusKind::CounterAttack.is_debuff());
        assert!(!StatusKind::Reflect { multiplier: 1.0 }.is_debuff());

        let slow = Status::modifier(
            Modifier::Stat { stat: StatType::Speed, multiplier: 0.5 },
            3,
        );
        assert!(slow.is_debuff());
    }

    #[test]
    fn test_same_slot_for_non_modifiers_uses_variant() {
        let a = StatusKind::AutoEvade { counter_attack: true };
        let b = StatusKind::AutoEvade { counter_attack: false };
        assert!(a.same_slot(&b));
        assert!(!a.same_slot(&StatusKind::Blind));
    }
}
