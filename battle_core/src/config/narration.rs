//! Narration flags
//!
//! Flags are read when an event fires, never when a subscription is made, so
//! they can be flipped in the middle of a battle.

use serde::{Deserialize, Serialize};

/// Which categories of narration lines are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationFlags {
    #[serde(default = "enabled")]
    pub show_intro_messages: bool,
    /// "<actor> attacks <target>!" lines. Critical hit lines are only shown
    /// when this is also set.
    #[serde(default = "enabled")]
    pub show_attack_messages: bool,
    #[serde(default = "enabled")]
    pub show_physical_damage_messages: bool,
    #[serde(default = "enabled")]
    pub show_magical_damage_messages: bool,
    #[serde(default = "enabled")]
    pub show_spell_messages: bool,
    #[serde(default = "enabled")]
    pub show_status_messages: bool,
    #[serde(default = "enabled")]
    pub show_shield_messages: bool,
    #[serde(default = "enabled")]
    pub show_heal_messages: bool,
    #[serde(default = "enabled")]
    pub show_mana_messages: bool,
    #[serde(default = "enabled")]
    pub show_death_messages: bool,
    #[serde(default = "enabled")]
    pub show_exp_messages: bool,
    #[serde(default = "enabled")]
    pub show_failure_messages: bool,
    #[serde(default)]
    pub show_turn_messages: bool,
}

fn enabled() -> bool {
    true
}

impl Default for NarrationFlags {
    fn default() -> Self {
        let mut flags = Self::all_enabled();
        flags.show_turn_messages = false;
        flags
    }
}

impl NarrationFlags {
    /// Every category switched on
    pub fn all_enabled() -> Self {
        Self::uniform(true)
    }

    /// Every category switched off (bookkeeping still runs)
    pub fn all_disabled() -> Self {
        Self::uniform(false)
    }

    fn uniform(value: bool) -> Self {
        NarrationFlags {
            show_intro_messages: value,
            show_attack_messages: value,
            show_physical_damage_messages: value,
            show_magical_damage_messages: value,
            show_spell_messages: value,
            show_status_messages: value,
            show_shield_messages: value,
            show_heal_messages: value,
            show_mana_messages: value,
            show_death_messages: value,
            show_exp_messages: value,
            show_failure_messages: value,
            show_turn_messages: value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hides_turn_messages_only() {
        let flags = NarrationFlags::default();
        assert!(flags.show_attack_messages);
        assert!(flags.show_exp_messages);
        assert!(!flags.show_turn_messages);
    }

    #[test]
    fn test_all_disabled() {
        let flags = NarrationFlags::all_disabled();
        assert!(!flags.show_intro_messages);
        assert!(!flags.show_death_messages);
        assert!(!flags.show_turn_messages);
    }
}
