//! Move content
//!
//! A [`Move`] is immutable content: a name, a priority tier, a targeting
//! policy, one [`MoveKind`] and an optional field-effect payload that is
//! applied after the primary resolution. Moves deserialize from TOML so
//! monster and class catalogs can live in data files.

mod target;

pub use target::{replacement_target, resolve_targets};

use crate::combatant::Shield;
use crate::effect::{DanceType, FieldEffect};
use crate::error::BattleError;
use crate::status::StatusKind;
use crate::types::{CombatantId, Element};
use serde::{Deserialize, Serialize};

/// Who a move may be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    SelfTarget,
    SingleEnemy,
    SingleAlly,
    SingleAllyOrSelf,
    OwnTeam,
    EnemyTeam,
    Field,
}

impl TargetType {
    /// Whether the move is aimed at one combatant chosen at declaration
    pub fn is_single(self) -> bool {
        matches!(
            self,
            TargetType::SelfTarget
                | TargetType::SingleEnemy
                | TargetType::SingleAlly
                | TargetType::SingleAllyOrSelf
        )
    }
}

/// A learnable spell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub element: Element,
    pub power: i32,
    pub cost: i32,
}

impl Spell {
    pub fn new(name: impl Into<String>, element: Element, power: i32, cost: i32) -> Self {
        Spell {
            name: name.into(),
            element,
            power,
            cost,
        }
    }
}

/// Conditional effects carried by an attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AttackEffect {
    /// Skip the hit roll
    NeverMiss,
    /// Ignore auto-evade
    CannotBeEvaded,
    /// Heal the attacker by a percentage of the damage dealt
    Drain { percent: i32 },
    /// Drain mana from the target on hit
    ManaBurn { amount: i32 },
    /// Multiply attack power while a dance is active on the attacker's side
    DanceBoost {
        #[serde(default)]
        dance: Option<DanceType>,
        multiplier: f64,
    },
}

/// Parameters of a physical attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackMove {
    pub accuracy: i32,
    /// Replaces the configured base crit chance when set
    #[serde(default)]
    pub crit_chance: Option<f64>,
    #[serde(default)]
    pub strength_bonus: i32,
    #[serde(default)]
    pub effects: Vec<AttackEffect>,
}

impl AttackMove {
    pub fn has(&self, predicate: impl Fn(&AttackEffect) -> bool) -> bool {
        self.effects.iter().any(predicate)
    }

    pub fn never_misses(&self) -> bool {
        self.has(|e| matches!(e, AttackEffect::NeverMiss))
    }

    pub fn cannot_be_evaded(&self) -> bool {
        self.has(|e| matches!(e, AttackEffect::CannotBeEvaded))
    }
}

/// Narrative bell moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BellType {
    /// Heal the ringer and disable the target
    Seal,
    /// Magic-seal the target
    Silence,
}

/// The dance registered by a multi-turn dance move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanceStep {
    pub dance: DanceType,
    pub duration: u32,
}

/// The resolution algorithm of a move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MoveKind {
    Attack(AttackMove),
    Spell { spell: Spell },
    Status {
        status: StatusKind,
        duration: u32,
        accuracy: i32,
    },
    ShieldGrant { shield: Shield },
    ShieldFortify {
        #[serde(default)]
        defense: i32,
        #[serde(default)]
        health: i32,
    },
    ShieldBust { power: i32 },
    DoNothing {
        #[serde(default)]
        message: Option<String>,
    },
    Runaway,
    /// Runs one sub-move per activation
    MultiTurn {
        moves: Vec<Move>,
        #[serde(default)]
        dance: Option<DanceStep>,
    },
    /// Resolved by the actor's behaviour hook
    Special { id: String },
    /// Only the field-effect payload does anything
    Field,
    Bell {
        bell: BellType,
        /// Percent of max health healed on a seal
        #[serde(default)]
        power: i32,
        duration: u32,
    },
    ShadeAbsorb,
}

impl MoveKind {
    pub fn label(&self) -> &'static str {
        match self {
            MoveKind::Attack(_) => "attack",
            MoveKind::Spell { .. } => "spell",
            MoveKind::Status { .. } => "status",
            MoveKind::ShieldGrant { .. } => "shield_grant",
            MoveKind::ShieldFortify { .. } => "shield_fortify",
            MoveKind::ShieldBust { .. } => "shield_bust",
            MoveKind::DoNothing { .. } => "do_nothing",
            MoveKind::Runaway => "runaway",
            MoveKind::MultiTurn { .. } => "multi_turn",
            MoveKind::Special { .. } => "special",
            MoveKind::Field => "field",
            MoveKind::Bell { .. } => "bell",
            MoveKind::ShadeAbsorb => "shade_absorb",
        }
    }
}

/// An immutable move definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    pub target_type: TargetType,
    pub kind: MoveKind,
    #[serde(default)]
    pub field_effect: Option<FieldEffect>,
}

impl Move {
    pub fn new(name: impl Into<String>, target_type: TargetType, kind: MoveKind) -> Self {
        Move {
            name: name.into(),
            priority: 0,
            target_type,
            kind,
            field_effect: None,
        }
    }

    pub fn attack(name: impl Into<String>, accuracy: i32) -> Self {
        Move::new(
            name,
            TargetType::SingleEnemy,
            MoveKind::Attack(AttackMove {
                accuracy,
                crit_chance: None,
                strength_bonus: 0,
                effects: Vec::new(),
            }),
        )
    }

    pub fn spell(spell: Spell) -> Self {
        Move::new(spell.name.clone(), TargetType::SingleEnemy, MoveKind::Spell { spell })
    }

    pub fn status(
        name: impl Into<String>,
        target_type: TargetType,
        status: StatusKind,
        duration: u32,
        accuracy: i32,
    ) -> Self {
        Move::new(
            name,
            target_type,
            MoveKind::Status {
                status,
                duration,
                accuracy,
            },
        )
    }

    pub fn do_nothing(message: Option<&str>) -> Self {
        Move::new(
            "do nothing",
            TargetType::SelfTarget,
            MoveKind::DoNothing {
                message: message.map(str::to_string),
            },
        )
    }

    pub fn runaway() -> Self {
        Move::new("run away", TargetType::Field, MoveKind::Runaway)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn with_field_effect(mut self, effect: FieldEffect) -> Self {
        self.field_effect = Some(effect);
        self
    }

    /// Add a conditional effect to an attack; other kinds are left unchanged
    pub fn with_attack_effect(mut self, effect: AttackEffect) -> Self {
        if let MoveKind::Attack(attack) = &mut self.kind {
            attack.effects.push(effect);
        }
        self
    }

    pub fn spell_data(&self) -> Option<&Spell> {
        match &self.kind {
            MoveKind::Spell { spell } => Some(spell),
            _ => None,
        }
    }

    /// A do-nothing move without flavor text resolves without a pause
    pub fn is_silent(&self) -> bool {
        matches!(self.kind, MoveKind::DoNothing { message: None })
    }

    /// Check that the move's content matches its kind
    pub fn validate(&self) -> Result<(), BattleError> {
        if let Some(effect) = &self.field_effect {
            effect.validate()?;
        }
        match &self.kind {
            MoveKind::MultiTurn { moves, .. } => {
                if moves.is_empty() {
                    return Err(BattleError::contract(format!(
                        "multi-turn move '{}' has no sub-moves",
                        self.name
                    )));
                }
                for sub in moves {
                    if matches!(sub.kind, MoveKind::MultiTurn { .. }) {
                        return Err(BattleError::contract(format!(
                            "multi-turn move '{}' nests another multi-turn move",
                            self.name
                        )));
                    }
                    sub.validate()?;
                }
            }
            MoveKind::Field if self.field_effect.is_none() => {
                return Err(BattleError::contract(format!(
                    "field move '{}' has no field effect",
                    self.name
                )));
            }
            MoveKind::Status {
                status: StatusKind::UndoDebuffs,
                ..
            } => {}
            MoveKind::Status { duration: 0, .. } => {
                return Err(BattleError::contract(format!(
                    "status move '{}' has zero duration",
                    self.name
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A declared action: a move, who performs it and who it is aimed at
#[derive(Debug, Clone, PartialEq)]
pub struct MoveWithTarget {
    pub mv: Move,
    pub owner: CombatantId,
    /// Re-assigned if the declared target dies before the move resolves
    pub target: Option<CombatantId>,
}

impl MoveWithTarget {
    pub fn new(mv: Move, owner: CombatantId, target: Option<CombatantId>) -> Self {
        MoveWithTarget { mv, owner, target }
    }

    /// Aim a single-target move
    pub fn at(mv: Move, owner: CombatantId, target: CombatantId) -> Self {
        MoveWithTarget::new(mv, owner, Some(target))
    }
}
