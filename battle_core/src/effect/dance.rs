//! Dance effects and their combination table

use crate::status::Modifier;
use crate::types::{Element, StatType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The style of a dance move
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanceType {
    Fire,
    Water,
    Wind,
    Earth,
    Light,
    Dark,
}

impl fmt::Display for DanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DanceType::Fire => write!(f, "fire dance"),
            DanceType::Water => write!(f, "water dance"),
            DanceType::Wind => write!(f, "wind dance"),
            DanceType::Earth => write!(f, "earth dance"),
            DanceType::Light => write!(f, "light dance"),
            DanceType::Dark => write!(f, "dark dance"),
        }
    }
}

/// Field effect produced when two dances meet on the same side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundEffect {
    pub name: &'static str,
    pub modifier: Modifier,
}

/// Look up the compound effect for two different dances (order-insensitive)
pub fn combine(a: DanceType, b: DanceType) -> Option<CompoundEffect> {
    use DanceType::*;
    let pair = if a <= b { (a, b) } else { (b, a) };
    let compound = match pair {
        (Fire, Wind) => CompoundEffect {
            name: "Firestorm",
            modifier: Modifier::Magic {
                element: Some(Element::Fire),
                multiplier: 1.5,
            },
        },
        (Water, Earth) => CompoundEffect {
            name: "Tidal Wall",
            modifier: Modifier::Stat {
                stat: StatType::Defense,
                multiplier: 1.5,
            },
        },
        (Fire, Earth) => CompoundEffect {
            name: "Magma Surge",
            modifier: Modifier::Stat {
                stat: StatType::Strength,
                multiplier: 1.5,
            },
        },
        (Water, Wind) => CompoundEffect {
            name: "Gale Current",
            modifier: Modifier::Stat {
                stat: StatType::Speed,
                multiplier: 1.5,
            },
        },
        (Light, Dark) => CompoundEffect {
            name: "Twilight",
            modifier: Modifier::MagicResistance {
                element: None,
                multiplier: 1.5,
            },
        },
        _ => return None,
    };
    Some(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_is_order_insensitive() {
        let a = combine(DanceType::Fire, DanceType::Wind).unwrap();
        let b = combine(DanceType::Wind, DanceType::Fire).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "Firestorm");
    }

    #[test]
    fn test_unlisted_pairs_do_not_combine() {
        assert!(combine(DanceType::Fire, DanceType::Water).is_none());
        assert!(combine(DanceType::Fire, DanceType::Fire).is_none());
    }
}
