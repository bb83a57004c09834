//! Battle errors
//!
//! Only defects and illegal calls are errors. Expected move failures (no
//! shield to fortify, not enough mana, ...) are reported through
//! `BattleEvent::MoveFailed` instead and never escape the dispatcher.

use crate::types::{CombatantId, GroupId};
use thiserror::Error;

/// Error terminating the current battle resolution
#[derive(Debug, Error)]
pub enum BattleError {
    /// Move, status or effect data that does not satisfy its own contract
    #[error("Contract violation: {0}")]
    ContractViolation(String),
    /// A call that breaks a game rule at its boundary (negative damage, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Strict mana spend that exceeds the available mana
    #[error("Insufficient mana: needs {needed}, has {available}")]
    InsufficientMana { needed: i32, available: i32 },
    #[error("Unknown combatant: {0}")]
    UnknownCombatant(CombatantId),
    #[error("Unknown group: {0}")]
    UnknownGroup(GroupId),
}

impl BattleError {
    pub(crate) fn contract(message: impl Into<String>) -> Self {
        BattleError::ContractViolation(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BattleError::InvalidInput(message.into())
    }

    /// Whether this error comes from broken content rather than a bad call
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, BattleError::ContractViolation(_))
    }
}
