//! Typed battle events
//!
//! Every observable occurrence is an immutable [`BattleEvent`] published by
//! the entity it happened to (a combatant, a shield or a group). The
//! [`EventBus`] routes published events to the subscriptions registered for
//! that source and kind.

mod bus;

pub use bus::{EventBus, SubscriberRole, Subscription, SubscriptionId, DEFAULT_HISTORY_LIMIT};

use crate::error::BattleError;
use crate::status::StatusKind;
use crate::types::{CombatantId, DamageKind, GroupId, ShieldId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity an event was published by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EventSource {
    Combatant { id: CombatantId },
    Shield { id: ShieldId, owner: CombatantId },
    Group { id: GroupId },
}

impl EventSource {
    pub fn combatant(id: CombatantId) -> Self {
        EventSource::Combatant { id }
    }

    pub fn group(id: GroupId) -> Self {
        EventSource::Group { id }
    }

    pub fn as_combatant(&self) -> Option<CombatantId> {
        match self {
            EventSource::Combatant { id } => Some(*id),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            EventSource::Group { id } => Some(*id),
            _ => None,
        }
    }
}

/// Why a move did not have its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFailureReason {
    NotEnoughMana,
    SpellNotKnown,
    MagicSealed,
    Disabled,
    NoShield,
    ShieldTooStrong,
    Resisted,
    IncompatibleTarget,
}

impl fmt::Display for MoveFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveFailureReason::NotEnoughMana => write!(f, "not enough mana"),
            MoveFailureReason::SpellNotKnown => write!(f, "spell not known"),
            MoveFailureReason::MagicSealed => write!(f, "magic is sealed"),
            MoveFailureReason::Disabled => write!(f, "unable to act"),
            MoveFailureReason::NoShield => write!(f, "no shield"),
            MoveFailureReason::ShieldTooStrong => write!(f, "shield too strong"),
            MoveFailureReason::Resisted => write!(f, "resisted"),
            MoveFailureReason::IncompatibleTarget => write!(f, "incompatible target"),
        }
    }
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum BattleEvent {
    DamageTaken { amount: i32, kind: DamageKind },
    Healed { amount: i32 },
    AttackMissed { target: CombatantId, evaded: bool },
    AttackSuccessful { target: CombatantId, damage_dealt: i32 },
    CriticalHit { target: CombatantId },
    CounterAttack { target: CombatantId },
    StatusAdded { status: StatusKind, turns: u32 },
    StatusRemoved { status: StatusKind },
    ShieldAdded { shield: ShieldId },
    ShieldFortified { defense_gained: i32, health_gained: i32 },
    ShieldDestroyed,
    Killed,
    Revived { health: i32 },
    EnemyKilled { enemy: CombatantId },
    SpellSuccessful { target: CombatantId, spell: String, damage_dealt: i32 },
    ManaLost { amount: i32 },
    ManaRestored { amount: i32 },
    ExpGained { amount: u32 },
    LeveledUp { level: u32 },
    SpellLearned { spell: String },
    MoveLearned { name: String },
    MoveFailed { move_name: String, reason: MoveFailureReason },
    TurnEnded,
    RoundEnded { round: u32 },
    TeamDefeated,
    TeamRan,
    FighterAdded { fighter: CombatantId },
}

/// Discriminant of [`BattleEvent`], used as a subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DamageTaken,
    Healed,
    AttackMissed,
    AttackSuccessful,
    CriticalHit,
    CounterAttack,
    StatusAdded,
    StatusRemoved,
    ShieldAdded,
    ShieldFortified,
    ShieldDestroyed,
    Killed,
    Revived,
    EnemyKilled,
    SpellSuccessful,
    ManaLost,
    ManaRestored,
    ExpGained,
    LeveledUp,
    SpellLearned,
    MoveLearned,
    MoveFailed,
    TurnEnded,
    RoundEnded,
    TeamDefeated,
    TeamRan,
    FighterAdded,
}

/// Which entity kinds may publish an event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publisher {
    Combatant,
    Shield,
    Group,
    CombatantOrShield,
    CombatantOrGroup,
}

impl EventKind {
    /// Event kinds a combatant can publish
    pub const COMBATANT: &'static [EventKind] = &[
        EventKind::DamageTaken,
        EventKind::Healed,
        EventKind::AttackMissed,
        EventKind::AttackSuccessful,
        EventKind::CriticalHit,
        EventKind::CounterAttack,
        EventKind::StatusAdded,
        EventKind::StatusRemoved,
        EventKind::ShieldAdded,
        EventKind::Killed,
        EventKind::Revived,
        EventKind::EnemyKilled,
        EventKind::SpellSuccessful,
        EventKind::ManaLost,
        EventKind::ManaRestored,
        EventKind::ExpGained,
        EventKind::LeveledUp,
        EventKind::SpellLearned,
        EventKind::MoveLearned,
        EventKind::MoveFailed,
        EventKind::TurnEnded,
        EventKind::RoundEnded,
    ];

    /// Event kinds a shield can publish
    pub const SHIELD: &'static [EventKind] = &[
        EventKind::DamageTaken,
        EventKind::Healed,
        EventKind::ShieldFortified,
        EventKind::ShieldDestroyed,
    ];

    /// Event kinds a group can publish
    pub const GROUP: &'static [EventKind] = &[
        EventKind::RoundEnded,
        EventKind::TeamDefeated,
        EventKind::TeamRan,
        EventKind::FighterAdded,
    ];

    fn publisher(self) -> Publisher {
        match self {
            EventKind::DamageTaken | EventKind::Healed => Publisher::CombatantOrShield,
            EventKind::ShieldFortified | EventKind::ShieldDestroyed => Publisher::Shield,
            EventKind::RoundEnded => Publisher::CombatantOrGroup,
            EventKind::TeamDefeated | EventKind::TeamRan | EventKind::FighterAdded => {
                Publisher::Group
            }
            _ => Publisher::Combatant,
        }
    }

    /// Whether `source` is an entity kind allowed to publish this event kind
    pub fn accepts(self, source: &EventSource) -> bool {
        matches!(
            (self.publisher(), source),
            (Publisher::Combatant, EventSource::Combatant { .. })
                | (Publisher::Shield, EventSource::Shield { .. })
                | (Publisher::Group, EventSource::Group { .. })
                | (Publisher::CombatantOrShield, EventSource::Combatant { .. })
                | (Publisher::CombatantOrShield, EventSource::Shield { .. })
                | (Publisher::CombatantOrGroup, EventSource::Combatant { .. })
                | (Publisher::CombatantOrGroup, EventSource::Group { .. })
        )
    }
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BattleEvent::DamageTaken { .. } => EventKind::DamageTaken,
            BattleEvent::Healed { .. } => EventKind::Healed,
            BattleEvent::AttackMissed { .. } => EventKind::AttackMissed,
            BattleEvent::AttackSuccessful { .. } => EventKind::AttackSuccessful,
            BattleEvent::CriticalHit { .. } => EventKind::CriticalHit,
            BattleEvent::CounterAttack { .. } => EventKind::CounterAttack,
            BattleEvent::StatusAdded { .. } => EventKind::StatusAdded,
            BattleEvent::StatusRemoved { .. } => EventKind::StatusRemoved,
            BattleEvent::ShieldAdded { .. } => EventKind::ShieldAdded,
            BattleEvent::ShieldFortified { .. } => EventKind::ShieldFortified,
            BattleEvent::ShieldDestroyed => EventKind::ShieldDestroyed,
            BattleEvent::Killed => EventKind::Killed,
            BattleEvent::Revived { .. } => EventKind::Revived,
            BattleEvent::EnemyKilled { .. } => EventKind::EnemyKilled,
            BattleEvent::SpellSuccessful { .. } => EventKind::SpellSuccessful,
            BattleEvent::ManaLost { .. } => EventKind::ManaLost,
            BattleEvent::ManaRestored { .. } => EventKind::ManaRestored,
            BattleEvent::ExpGained { .. } => EventKind::ExpGained,
            BattleEvent::LeveledUp { .. } => EventKind::LeveledUp,
            BattleEvent::SpellLearned { .. } => EventKind::SpellLearned,
            BattleEvent::MoveLearned { .. } => EventKind::MoveLearned,
            BattleEvent::MoveFailed { .. } => EventKind::MoveFailed,
            BattleEvent::TurnEnded => EventKind::TurnEnded,
            BattleEvent::RoundEnded { .. } => EventKind::RoundEnded,
            BattleEvent::TeamDefeated => EventKind::TeamDefeated,
            BattleEvent::TeamRan => EventKind::TeamRan,
            BattleEvent::FighterAdded { .. } => EventKind::FighterAdded,
        }
    }
}

/// A published event together with its origin and publish order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Monotonic publish order within one bus
    pub sequence: u64,
    pub source: EventSource,
    pub event: BattleEvent,
}

impl EventEnvelope {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    /// Fail if the event was published by an entity kind that cannot own it
    pub fn validate(&self) -> Result<(), BattleError> {
        if self.kind().accepts(&self.source) {
            Ok(())
        } else {
            Err(BattleError::contract(format!(
                "{:?} event published by {:?}",
                self.kind(),
                self.source
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(BattleEvent::Killed.kind(), EventKind::Killed);
        assert_eq!(
            BattleEvent::RoundEnded { round: 3 }.kind(),
            EventKind::RoundEnded
        );
    }

    #[test]
    fn test_publisher_rules() {
        let fighter = EventSource::combatant(CombatantId(0));
        let group = EventSource::group(GroupId(0));
        let shield = EventSource::Shield {
            id: ShieldId(1),
            owner: CombatantId(0),
        };

        assert!(EventKind::Killed.accepts(&fighter));
        assert!(!EventKind::Killed.accepts(&group));
        assert!(EventKind::TeamDefeated.accepts(&group));
        assert!(!EventKind::TeamDefeated.accepts(&fighter));
        assert!(EventKind::DamageTaken.accepts(&shield));
        assert!(EventKind::ShieldDestroyed.accepts(&shield));
        assert!(!EventKind::ShieldDestroyed.accepts(&fighter));
        assert!(EventKind::RoundEnded.accepts(&group));
        assert!(EventKind::RoundEnded.accepts(&fighter));
    }

    #[test]
    fn test_publisher_tables_agree_with_rules() {
        let fighter = EventSource::combatant(CombatantId(0));
        let group = EventSource::group(GroupId(0));
        let shield = EventSource::Shield {
            id: ShieldId(1),
            owner: CombatantId(0),
        };
        assert!(EventKind::COMBATANT.iter().all(|k| k.accepts(&fighter)));
        assert!(EventKind::GROUP.iter().all(|k| k.accepts(&group)));
        assert!(EventKind::SHIELD.iter().all(|k| k.accepts(&shield)));
    }

    #[test]
    fn test_validate_rejects_wrong_source() {
        let envelope = EventEnvelope {
            sequence: 0,
            source: EventSource::combatant(CombatantId(2)),
            event: BattleEvent::TeamRan,
        };
        let err = envelope.validate().unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_events_serialize_to_json() {
        let envelope = EventEnvelope {
            sequence: 7,
            source: EventSource::combatant(CombatantId(1)),
            event: BattleEvent::AttackSuccessful {
                target: CombatantId(2),
                damage_dealt: 5,
            },
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("attack_successful"));
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}
