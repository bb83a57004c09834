//! battle_core - Turn-based combat resolution engine
//!
//! This library provides:
//! - Combatant / Roster: fighters, their groups and the arena owning both
//! - Move: the closed catalog of actions a fighter may declare
//! - Battle: the round controller (setup, queue, execution, teardown)
//! - EventBus: typed events routed to bookkeeping and narration subscribers
//! - EffectTracker: side-scoped field effects and dances
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use battle_core::prelude::*;
//!
//! let mut roster = Roster::new();
//! let party = roster.add_group("Party", Side::Human);
//! let monsters = roster.add_group("Slimes", Side::Enemy);
//! roster.spawn_into(
//!     party,
//!     Combatant::new("Hero", 30, 10)
//!         .with_stats(8, 3, 5, 0, 0)
//!         .with_move(Move::attack("Slash", 95)),
//! )?;
//! roster.spawn_into(monsters, Combatant::new("Slime", 12, 0).with_exp_reward(4))?;
//!
//! let mut oracle = RngOracle::seeded(7);
//! let mut narrator = BufferNarrator::new();
//! let mut battle = Battle::new(
//!     &mut roster,
//!     party,
//!     monsters,
//!     BattleConfig::default(),
//!     &mut oracle,
//!     &mut narrator,
//! )?;
//! let outcome = battle.run(&mut AttackFirstLiving, &mut AttackFirstLiving)?;
//! println!("{:?}", outcome);
//! ```

pub mod battle;
pub mod calc;
pub mod combatant;
pub mod config;
pub mod effect;
pub mod error;
pub mod events;
pub mod moves;
pub mod narration;
pub mod oracle;
pub mod prelude;
pub mod progression;
pub mod roster;
pub mod status;
pub mod types;

// Core API - what most users need
pub use battle::{ActionSource, Battle, BattleOutcome, BattlePhase, Declaration, DeclarationContext};
pub use combatant::{Combatant, CombatantBehavior, Shield, SpecialContext};
pub use error::BattleError;
pub use moves::{Move, MoveKind, MoveWithTarget, Spell, TargetType};
pub use roster::{Group, Roster};
pub use types::{CombatantId, DamageKind, Element, GroupId, ShieldId, Side, StatType};

// Configuration
pub use config::{BattleConfig, CombatConstants, ConfigError, NarrationFlags};

// Events
pub use events::{BattleEvent, EventBus, EventEnvelope, EventKind, EventSource};

// Collaborators supplied by the host
pub use narration::{BufferNarrator, Narrator, SilentNarrator};
pub use oracle::{ChanceOracle, RngOracle, ScriptedOracle};
pub use progression::{LevelStats, Progression};
