use crate::config::LevelTableFileConfig;
use crate::table::LevelTable;
use crate::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Registry of all level tables, loaded from TOML files.
///
/// Files are visited in path order, so when two files declare the same table
/// id the one whose path sorts last wins, whatever order the filesystem
/// lists them in.
#[derive(Debug, Default)]
pub struct LevelTableRegistry {
    tables: HashMap<String, LevelTable>,
    sources: HashMap<String, PathBuf>,
}

impl LevelTableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all level tables from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_dir(dir)?;
        tracing::info!(dir = %dir.display(), tables = registry.tables.len(), "level tables loaded");
        Ok(registry)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    /// Load a single table file. A later file with the same id replaces an
    /// earlier one.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let config: LevelTableFileConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.to_path_buf(),
        })?;

        let table = LevelTable::from_config(config).map_err(|e| ConfigError::Validation {
            message: e.to_string(),
            path: path.to_path_buf(),
        })?;

        if let Some(previous) = self.sources.insert(table.id.clone(), path.to_path_buf()) {
            tracing::warn!(
                table = %table.id,
                path = %path.display(),
                previous = %previous.display(),
                "level table replaced"
            );
        }
        self.tables.insert(table.id.clone(), table);
        Ok(())
    }

    /// File the table with this id was loaded from
    pub fn path_of(&self, id: &str) -> Option<&Path> {
        self.sources.get(id).map(|p| p.as_path())
    }

    /// Level reached with `exp` total experience on the named table
    pub fn level_for_exp(&self, id: &str, exp: u32) -> Option<u32> {
        self.get(id).map(|table| table.level_for_exp(exp))
    }

    /// Get a table by ID
    pub fn get(&self, id: &str) -> Option<&LevelTable> {
        self.tables.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// List all table IDs
    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::Progression;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_table(dir: &Path, name: &str, content: &str) {
        let path = dir.join(format!("{}.toml", name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    const WARRIOR: &str = r#"
[table]
id = "warrior"

[[levels]]
level = 2
exp = 8

[levels.stats]
max_health = 6
strength = 2
"#;

    #[test]
    fn test_load_simple_table() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "warrior", WARRIOR);

        let registry = LevelTableRegistry::load(dir.path()).unwrap();
        assert!(registry.contains("warrior"));
        assert_eq!(registry.len(), 1);
        let warrior = registry.get("warrior").unwrap();
        assert_eq!(warrior.exp_for_level(2), Some(8));
    }

    #[test]
    fn test_load_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("classes").join("melee");
        std::fs::create_dir_all(&nested).unwrap();
        create_test_table(&nested, "warrior", WARRIOR);
        std::fs::write(dir.path().join("notes.txt"), "not toml at all").unwrap();

        let registry = LevelTableRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.table_ids().collect::<Vec<_>>(), vec!["warrior"]);
    }

    #[test]
    fn test_duplicate_id_last_path_wins() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "b_override", &WARRIOR.replace("exp = 8", "exp = 12"));
        create_test_table(dir.path(), "a_base", WARRIOR);

        let registry = LevelTableRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("warrior").unwrap().exp_for_level(2), Some(12));
        assert!(registry.path_of("warrior").unwrap().ends_with("b_override.toml"));
        assert!(registry.path_of("mage").is_none());
    }

    #[test]
    fn test_level_for_exp_by_table() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "warrior", WARRIOR);

        let registry = LevelTableRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.level_for_exp("warrior", 7), Some(1));
        assert_eq!(registry.level_for_exp("warrior", 8), Some(2));
        assert_eq!(registry.level_for_exp("warrior", 500), Some(2));
        assert_eq!(registry.level_for_exp("mage", 8), None);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = LevelTableRegistry::load(&dir.path().join("absent")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        create_test_table(dir.path(), "broken", "[table\nid = ");

        let result = LevelTableRegistry::load(dir.path());
        match result {
            Err(ConfigError::Parse { path, .. }) => assert!(path.ends_with("broken.toml")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_names_file() {
        let dir = TempDir::new().unwrap();
        create_test_table(
            dir.path(),
            "gappy",
            r#"
[table]
id = "gappy"

[[levels]]
level = 3
exp = 10
"#,
        );

        let result = LevelTableRegistry::load(dir.path());
        match result {
            Err(ConfigError::Validation { message, path }) => {
                assert!(message.contains("found 3"), "message was {}", message);
                assert!(path.ends_with("gappy.toml"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
