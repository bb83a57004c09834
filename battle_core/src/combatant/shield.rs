//! Shields absorb damage in front of their owner

use crate::types::ShieldId;
use serde::{Deserialize, Serialize};

/// A damage-absorbing shield
///
/// Shield templates live inside moves and field effects with `id: None`. A
/// shield only gets an id when it is attached to a combatant, so two copies
/// of the same template are always distinct instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ShieldId>,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub magic_resistance: i32,
    /// Minimum bust power needed to destroy the shield outright
    #[serde(default)]
    pub bust_resistance: i32,
}

impl Shield {
    pub fn new(name: impl Into<String>, health: i32) -> Self {
        Shield {
            id: None,
            name: name.into(),
            health,
            max_health: health,
            defense: 0,
            magic_resistance: 0,
            bust_resistance: 0,
        }
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_magic_resistance(mut self, resistance: i32) -> Self {
        self.magic_resistance = resistance;
        self
    }

    pub fn with_bust_resistance(mut self, resistance: i32) -> Self {
        self.bust_resistance = resistance;
        self
    }

    /// Copy of this shield as a fresh instance with `id`
    pub fn instantiate(&self, id: ShieldId) -> Shield {
        Shield {
            id: Some(id),
            ..self.clone()
        }
    }

    /// Absorb up to `amount` damage, returning how much was absorbed
    pub(crate) fn absorb(&mut self, amount: i32) -> i32 {
        let absorbed = amount.min(self.health).max(0);
        self.health -= absorbed;
        absorbed
    }

    pub fn is_broken(&self) -> bool {
        self.health <= 0
    }

    /// Raise defense, returning the gain
    pub(crate) fn fortify_defense(&mut self, amount: i32) -> i32 {
        self.defense += amount;
        amount
    }

    /// Raise health (and max health along with it), returning the gain
    pub(crate) fn fortify_health(&mut self, amount: i32) -> i32 {
        self.health += amount;
        self.max_health = self.max_health.max(self.health);
        amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_caps_at_health() {
        let mut shield = Shield::new("Iron Shield", 10);
        assert_eq!(shield.absorb(12), 10);
        assert!(shield.is_broken());
    }

    #[test]
    fn test_instantiate_assigns_new_id() {
        let template = Shield::new("Iron Shield", 10).with_defense(3);
        let a = template.instantiate(ShieldId(1));
        let b = template.instantiate(ShieldId(2));
        assert_ne!(a.id, b.id);
        assert_eq!(a.defense, 3);
        assert!(template.id.is_none());
    }

    #[test]
    fn test_fortify_health_raises_max() {
        let mut shield = Shield::new("Iron Shield", 10);
        shield.fortify_health(5);
        assert_eq!(shield.health, 15);
        assert_eq!(shield.max_health, 15);
    }
}
