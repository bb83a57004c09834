//! Core identifiers and small value types shared by every battle module

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Arena handles
// ============================================================================

/// Handle to a combatant stored in a [`Roster`](crate::roster::Roster)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub usize);

/// Handle to a group stored in a [`Roster`](crate::roster::Roster)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub usize);

/// Unique id of one shield instance. A copied shield always gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShieldId(pub u64);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "combatant#{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

// ============================================================================
// Sides
// ============================================================================

/// Which side of the encounter a group fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Human,
    Enemy,
}

impl Side {
    /// The other side
    pub fn opponent(self) -> Side {
        match self {
            Side::Human => Side::Enemy,
            Side::Enemy => Side::Human,
        }
    }

    /// Both sides, human first
    pub fn both() -> [Side; 2] {
        [Side::Human, Side::Enemy]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Human => write!(f, "Human"),
            Side::Enemy => write!(f, "Enemy"),
        }
    }
}

// ============================================================================
// Elements and stats
// ============================================================================

/// Magic elements for spells, combatants and per-element bonus tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
    Light,
    Dark,
}

impl Element {
    /// Get all element variants
    pub fn all() -> &'static [Element] {
        &[
            Element::Fire,
            Element::Water,
            Element::Earth,
            Element::Wind,
            Element::Light,
            Element::Dark,
        ]
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Fire => write!(f, "fire"),
            Element::Water => write!(f, "water"),
            Element::Earth => write!(f, "earth"),
            Element::Wind => write!(f, "wind"),
            Element::Light => write!(f, "light"),
            Element::Dark => write!(f, "dark"),
        }
    }
}

/// Base stats that stat-multiplier modifiers can scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Strength,
    Defense,
    Speed,
    Evade,
    Luck,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Strength => write!(f, "strength"),
            StatType::Defense => write!(f, "defense"),
            StatType::Speed => write!(f, "speed"),
            StatType::Evade => write!(f, "evade"),
            StatType::Luck => write!(f, "luck"),
        }
    }
}

/// How a point of damage was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "element")]
pub enum DamageKind {
    Physical,
    Magical(Element),
}

impl DamageKind {
    pub fn is_physical(&self) -> bool {
        matches!(self, DamageKind::Physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Human.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Human);
    }

    #[test]
    fn test_element_display_is_lowercase() {
        assert_eq!(Element::Fire.to_string(), "fire");
        assert_eq!(Element::Dark.to_string(), "dark");
    }
}
