//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Core types
pub use crate::combatant::{Combatant, CombatantBehavior, MagicStats, Shield, SpecialContext};
pub use crate::roster::{Group, Roster};
pub use crate::types::{CombatantId, DamageKind, Element, GroupId, Side, StatType};

// Moves
pub use crate::moves::{AttackEffect, AttackMove, BellType, DanceStep, Move, MoveKind, MoveWithTarget, Spell, TargetType};
pub use crate::status::{Modifier, Status, StatusKind};
pub use crate::effect::{DanceType, FieldEffect, FieldEffectKind, FieldTarget};

// Battle
pub use crate::battle::{ActionSource, AttackFirstLiving, Battle, BattleOutcome, Declaration, DeclarationContext};
pub use crate::error::BattleError;
pub use crate::events::{BattleEvent, EventKind, EventSource, MoveFailureReason};

// Config
pub use crate::config::{BattleConfig, NarrationFlags};

// Collaborators
pub use crate::narration::{BufferNarrator, Narrator, SilentNarrator};
pub use crate::oracle::{ChanceOracle, RngOracle, ScriptedOracle};
pub use crate::progression::{LevelStats, Progression};
