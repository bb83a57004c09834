//! Multiplicative modifiers shared by statuses and field effects

use crate::types::{Element, StatType};
use serde::{Deserialize, Serialize};

/// A multiplier on one calculator input
///
/// Modifiers stack multiplicatively: every active instance from statuses and
/// from the combatant's side counters is multiplied together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Modifier {
    /// Scales a base stat
    Stat { stat: StatType, multiplier: f64 },
    /// Scales critical hit chance
    CritChance { multiplier: f64 },
    /// Scales magic power; `None` applies to every element
    Magic {
        element: Option<Element>,
        multiplier: f64,
    },
    /// Scales magic resistance; `None` applies to every element
    MagicResistance {
        element: Option<Element>,
        multiplier: f64,
    },
    /// Scales the mana cost of spells
    SpellCost { multiplier: f64 },
}

impl Modifier {
    pub fn multiplier(&self) -> f64 {
        match self {
            Modifier::Stat { multiplier, .. }
            | Modifier::CritChance { multiplier }
            | Modifier::Magic { multiplier, .. }
            | Modifier::MagicResistance { multiplier, .. }
            | Modifier::SpellCost { multiplier } => *multiplier,
        }
    }

    /// Whether the modifier hurts its holder
    ///
    /// Spell cost is inverted: a higher cost is the harmful direction.
    pub fn is_debuff(&self) -> bool {
        match self {
            Modifier::SpellCost { multiplier } => *multiplier > 1.0,
            other => other.multiplier() < 1.0,
        }
    }

    /// Whether two modifiers occupy the same slot (and so refresh each other)
    pub fn same_slot(&self, other: &Modifier) -> bool {
        match (self, other) {
            (Modifier::Stat { stat: a, .. }, Modifier::Stat { stat: b, .. }) => a == b,
            (Modifier::CritChance { .. }, Modifier::CritChance { .. }) => true,
            (Modifier::Magic { element: a, .. }, Modifier::Magic { element: b, .. }) => a == b,
            (
                Modifier::MagicResistance { element: a, .. },
                Modifier::MagicResistance { element: b, .. },
            ) => a == b,
            (Modifier::SpellCost { .. }, Modifier::SpellCost { .. }) => true,
            _ => false,
        }
    }

    /// Human readable description used in narration
    pub fn describe(&self) -> String {
        let direction = if self.is_debuff() { "lowered" } else { "raised" };
        match self {
            Modifier::Stat { stat, .. } => format!("{} {}", stat, direction),
            Modifier::CritChance { .. } => format!("critical chance {}", direction),
            Modifier::Magic { element: Some(e), .. } => format!("{} magic {}", e, direction),
            Modifier::Magic { element: None, .. } => format!("magic {}", direction),
            Modifier::MagicResistance { element: Some(e), .. } => {
                format!("{} resistance {}", e, direction)
            }
            Modifier::MagicResistance { element: None, .. } => {
                format!("magic resistance {}", direction)
            }
            Modifier::SpellCost { .. } => format!("spell cost {}", direction),
        }
    }
}

/// The flattened set of modifiers active on one combatant
///
/// Built from the combatant's statuses plus the counters of its side, then
/// queried by the calculators.
#[derive(Debug, Clone, Default)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Product of every stat multiplier for `stat`
    pub fn stat_multiplier(&self, stat: StatType) -> f64 {
        self.product(|m| match m {
            Modifier::Stat { stat: s, multiplier } if *s == stat => Some(*multiplier),
            _ => None,
        })
    }

    pub fn crit_multiplier(&self) -> f64 {
        self.product(|m| match m {
            Modifier::CritChance { multiplier } => Some(*multiplier),
            _ => None,
        })
    }

    /// Product of every magic multiplier matching `element` or all elements
    pub fn magic_multiplier(&self, element: Element) -> f64 {
        self.product(|m| match m {
            Modifier::Magic { element: e, multiplier } if e.map_or(true, |e| e == element) => {
                Some(*multiplier)
            }
            _ => None,
        })
    }

    pub fn resistance_multiplier(&self, element: Element) -> f64 {
        self.product(|m| match m {
            Modifier::MagicResistance { element: e, multiplier }
                if e.map_or(true, |e| e == element) =>
            {
                Some(*multiplier)
            }
            _ => None,
        })
    }

    pub fn spell_cost_multiplier(&self) -> f64 {
        self.product(|m| match m {
            Modifier::SpellCost { multiplier } => Some(*multiplier),
            _ => None,
        })
    }

    fn product(&self, select: impl Fn(&Modifier) -> Option<f64>) -> f64 {
        self.modifiers.iter().filter_map(select).product()
    }
}

impl FromIterator<Modifier> for ModifierStack {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        ModifierStack {
            modifiers: iter.into_iter().collect(),
        }
    }
}
