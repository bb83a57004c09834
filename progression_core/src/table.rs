use crate::config::LevelTableFileConfig;
use crate::TableError;
use battle_core::{LevelStats, Progression, Spell};
use std::collections::BTreeMap;

/// Experience thresholds and rewards for every level past the first
#[derive(Debug, Clone)]
pub struct LevelTable {
    pub id: String,
    /// Index 0 holds level 2
    levels: Vec<Level>,
}

#[derive(Debug, Clone)]
struct Level {
    exp: u32,
    stats: LevelStats,
    spells: Vec<Spell>,
}

const FIRST_LEVEL: u32 = 1;

impl LevelTable {
    /// Parse a level table from config
    pub fn from_config(config: LevelTableFileConfig) -> Result<Self, TableError> {
        let mut spells: BTreeMap<String, Spell> = BTreeMap::new();
        for spell in config.spells {
            if spell.power < 0 || spell.cost < 0 {
                return Err(TableError::InvalidSpell(spell.name));
            }
            if spells.contains_key(&spell.name) {
                return Err(TableError::DuplicateSpell(spell.name));
            }
            spells.insert(spell.name.clone(), spell);
        }

        let mut entries = config.levels;
        entries.sort_by_key(|entry| entry.level);

        let mut levels = Vec::with_capacity(entries.len());
        let mut previous_exp = 0;
        for (index, entry) in entries.into_iter().enumerate() {
            let expected = index as u32 + FIRST_LEVEL + 1;
            if entry.level <= FIRST_LEVEL || entry.level > expected {
                return Err(TableError::LevelGap(entry.level));
            }
            if entry.level < expected {
                return Err(TableError::DuplicateLevel(entry.level));
            }
            if entry.exp <= previous_exp {
                return Err(TableError::ExpNotIncreasing {
                    level: entry.level,
                    exp: entry.exp,
                });
            }
            if has_negative_gain(&entry.stats) {
                return Err(TableError::NegativeGain(entry.level));
            }
            let unlocked = entry
                .spells
                .iter()
                .map(|name| {
                    spells.get(name).cloned().ok_or_else(|| TableError::UnknownSpell {
                        level: entry.level,
                        spell: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            previous_exp = entry.exp;
            levels.push(Level {
                exp: entry.exp,
                stats: entry.stats,
                spells: unlocked,
            });
        }

        tracing::debug!(table = %config.table.id, levels = levels.len(), spells = spells.len(), "level table built");
        Ok(LevelTable {
            id: config.table.id,
            levels,
        })
    }

    /// Highest reachable level
    pub fn max_level(&self) -> u32 {
        FIRST_LEVEL + self.levels.len() as u32
    }

    /// Level reached with `exp` total experience
    pub fn level_for_exp(&self, exp: u32) -> u32 {
        FIRST_LEVEL + self.levels.iter().take_while(|level| level.exp <= exp).count() as u32
    }

    /// Experience still missing from `exp` to the level after `level`, or
    /// `None` at the cap
    pub fn exp_to_next(&self, level: u32, exp: u32) -> Option<u32> {
        self.exp_for_level(level + 1)
            .map(|needed| needed.saturating_sub(exp))
    }

    fn level(&self, level: u32) -> Option<&Level> {
        let index = level.checked_sub(FIRST_LEVEL + 1)?;
        self.levels.get(index as usize)
    }
}

fn has_negative_gain(stats: &LevelStats) -> bool {
    [
        stats.max_health,
        stats.max_mana,
        stats.strength,
        stats.defense,
        stats.speed,
        stats.evade,
        stats.luck,
        stats.magic_strength,
        stats.magic_resistance,
    ]
    .iter()
    .any(|gain| *gain < 0)
}

impl Progression for LevelTable {
    fn exp_for_level(&self, level: u32) -> Option<u32> {
        if level == FIRST_LEVEL {
            return Some(0);
        }
        self.level(level).map(|l| l.exp)
    }

    fn stat_gains_for_level(&self, level: u32) -> Option<LevelStats> {
        self.level(level).map(|l| l.stats.clone())
    }

    fn spells_for_level(&self, level: u32) -> Vec<Spell> {
        self.level(level).map(|l| l.spells.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{Combatant, Element, EventBus};

    fn table(content: &str) -> Result<LevelTable, TableError> {
        let config: LevelTableFileConfig = toml::from_str(content).unwrap();
        LevelTable::from_config(config)
    }

    const MAGE: &str = r#"
[table]
id = "mage"

[[spells]]
name = "Ember"
element = "fire"
power = 6
cost = 2

[[spells]]
name = "Gust"
element = "wind"
power = 4
cost = 1

[[levels]]
level = 3
exp = 30
spells = ["Gust"]

[[levels]]
level = 2
exp = 10
spells = ["Ember"]

[levels.stats]
max_mana = 4
magic_strength = 1
"#;

    #[test]
    fn test_levels_sorted_and_queryable() {
        let mage = table(MAGE).unwrap();
        assert_eq!(mage.id, "mage");
        assert_eq!(mage.max_level(), 3);
        assert_eq!(mage.exp_for_level(1), Some(0));
        assert_eq!(mage.exp_for_level(2), Some(10));
        assert_eq!(mage.exp_for_level(3), Some(30));
        assert_eq!(mage.exp_for_level(4), None);

        let gains = mage.stat_gains_for_level(2).unwrap();
        assert_eq!(gains.max_mana, 4);
        assert_eq!(gains.magic_strength, 1);
        assert_eq!(gains.strength, 0);
        assert_eq!(mage.stat_gains_for_level(1), None);

        assert_eq!(
            mage.spells_for_level(2),
            vec![Spell::new("Ember", Element::Fire, 6, 2)]
        );
        assert!(mage.spells_for_level(4).is_empty());
    }

    #[test]
    fn test_level_for_exp() {
        let mage = table(MAGE).unwrap();
        assert_eq!(mage.level_for_exp(0), 1);
        assert_eq!(mage.level_for_exp(9), 1);
        assert_eq!(mage.level_for_exp(10), 2);
        assert_eq!(mage.level_for_exp(500), 3);
        assert_eq!(mage.exp_to_next(1, 4), Some(6));
        assert_eq!(mage.exp_to_next(3, 500), None);
    }

    #[test]
    fn test_gap_rejected() {
        let result = table(
            r#"
[table]
id = "gappy"

[[levels]]
level = 2
exp = 10

[[levels]]
level = 4
exp = 40
"#,
        );
        assert_eq!(result.unwrap_err(), TableError::LevelGap(4));
    }

    #[test]
    fn test_duplicate_level_rejected() {
        let result = table(
            r#"
[table]
id = "twice"

[[levels]]
level = 2
exp = 10

[[levels]]
level = 2
exp = 20
"#,
        );
        assert_eq!(result.unwrap_err(), TableError::DuplicateLevel(2));
    }

    #[test]
    fn test_exp_must_increase() {
        let result = table(
            r#"
[table]
id = "flat"

[[levels]]
level = 2
exp = 10

[[levels]]
level = 3
exp = 10
"#,
        );
        assert_eq!(
            result.unwrap_err(),
            TableError::ExpNotIncreasing { level: 3, exp: 10 }
        );
    }

    #[test]
    fn test_unknown_spell_rejected() {
        let result = table(
            r#"
[table]
id = "typo"

[[levels]]
level = 2
exp = 10
spells = ["Fireblast"]
"#,
        );
        assert_eq!(
            result.unwrap_err(),
            TableError::UnknownSpell {
                level: 2,
                spell: "Fireblast".to_string()
            }
        );
    }

    #[test]
    fn test_negative_gain_rejected() {
        let result = table(
            r#"
[table]
id = "cursed"

[[levels]]
level = 2
exp = 10

[levels.stats]
speed = -1
"#,
        );
        assert_eq!(result.unwrap_err(), TableError::NegativeGain(2));
    }

    #[test]
    fn test_drives_combatant_level_ups() {
        let mage = table(MAGE).unwrap();
        let mut bus = EventBus::new();
        let mut apprentice = Combatant::new("Apprentice", 12, 6);
        apprentice.gain_exp(35, Some(&mage), &mut bus).unwrap();

        assert_eq!(apprentice.level, 3);
        assert_eq!(apprentice.max_mana(), 10);
        assert_eq!(apprentice.magic.strength, 1);
        assert!(apprentice.knows_spell("Ember"));
        assert!(apprentice.knows_spell("Gust"));
    }

    #[test]
    fn test_empty_table_caps_at_first_level() {
        let flat = table("[table]\nid = \"flat\"\n").unwrap();
        assert_eq!(flat.max_level(), 1);
        assert_eq!(flat.exp_for_level(2), None);
    }
}
