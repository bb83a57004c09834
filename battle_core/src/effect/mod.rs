//! Side-scoped effects
//!
//! A [`FieldEffect`] is content carried by a move. Immediate kinds resolve at
//! once against every member of the affected sides; the lasting kind becomes
//! a [`FieldEffectCounter`] tracked per side by the [`EffectTracker`].

mod counters;
mod dance;

pub use counters::{
    DanceEffectCounter, DanceOutcome, EffectTracker, ExpiredEffect, FieldEffectCounter,
};
pub use dance::{combine, CompoundEffect, DanceType};

use crate::combatant::Shield;
use crate::error::BattleError;
use crate::status::Modifier;
use crate::types::{Element, Side};
use serde::{Deserialize, Serialize};

/// Which side(s) a field effect lands on, relative to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTarget {
    Own,
    Enemy,
    /// Both sides, each with an independent counter
    Both,
}

impl FieldTarget {
    pub fn sides(self, user_side: Side) -> Vec<Side> {
        match self {
            FieldTarget::Own => vec![user_side],
            FieldTarget::Enemy => vec![user_side.opponent()],
            FieldTarget::Both => vec![user_side, user_side.opponent()],
        }
    }
}

/// What a field effect does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldEffectKind {
    UndoDebuffs,
    MagicDamage { element: Element, power: i32 },
    GrantShield { shield: Shield },
    /// Restore a percentage of max health
    RestoreHealth { percent: i32 },
    /// Restore a percentage of max mana
    RestoreMana { percent: i32 },
    /// A modifier on every member of the side while the counter runs
    Lasting { modifier: Modifier },
}

/// A field effect payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEffect {
    pub name: String,
    pub target: FieldTarget,
    pub kind: FieldEffectKind,
    /// Rounds a lasting effect stays up; immediate effects have none
    #[serde(default)]
    pub duration: Option<u32>,
}

impl FieldEffect {
    pub fn immediate(name: impl Into<String>, target: FieldTarget, kind: FieldEffectKind) -> Self {
        FieldEffect {
            name: name.into(),
            target,
            kind,
            duration: None,
        }
    }

    pub fn lasting(name: impl Into<String>, target: FieldTarget, modifier: Modifier, duration: u32) -> Self {
        FieldEffect {
            name: name.into(),
            target,
            kind: FieldEffectKind::Lasting { modifier },
            duration: Some(duration),
        }
    }

    pub fn is_immediate(&self) -> bool {
        !matches!(self.kind, FieldEffectKind::Lasting { .. })
    }

    /// Lasting effects need a positive duration; immediate ones must not
    /// carry one.
    pub fn validate(&self) -> Result<(), BattleError> {
        match (&self.kind, self.duration) {
            (FieldEffectKind::Lasting { .. }, Some(turns)) if turns > 0 => Ok(()),
            (FieldEffectKind::Lasting { .. }, _) => Err(BattleError::contract(format!(
                "lasting field effect '{}' without duration",
                self.name
            ))),
            (_, None) => Ok(()),
            (_, Some(_)) => Err(BattleError::contract(format!(
                "immediate field effect '{}' with a duration",
                self.name
            ))),
        }
    }
}
