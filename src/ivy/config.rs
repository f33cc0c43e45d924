use crate::error::{IvyError, Result};
use crate::index::TAGS_FIELD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "ivy.json";

/// Index configuration for a database, optionally stored in `<root>/ivy.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IvyConfig {
    /// Table name to the field names to index in that table.
    #[serde(default)]
    pub fields_to_index: HashMap<String, Vec<String>>,
}

/// A field name from `fields_to_index`, as far as the engine understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexField {
    /// Build a tag index over the record's `tags` string array.
    Tags,
    /// Accepted for forward compatibility; builds nothing.
    Unsupported(String),
}

impl IndexField {
    pub fn parse(name: &str) -> Self {
        if name == TAGS_FIELD {
            IndexField::Tags
        } else {
            IndexField::Unsupported(name.to_string())
        }
    }
}

impl IvyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of adding a table's indexed fields.
    pub fn with_index<S: Into<String>>(mut self, table: &str, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields_to_index
            .entry(table.to_string())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Parsed index fields configured for a table (empty if none).
    pub fn index_fields(&self, table: &str) -> Vec<IndexField> {
        self.fields_to_index
            .get(table)
            .map(|fields| fields.iter().map(|f| IndexField::parse(f)).collect())
            .unwrap_or_default()
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(IvyError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| IvyError::Config(format!("{}: {}", config_path.display(), e)))
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(IvyError::Serialization)?;
        fs::write(config_path, content).map_err(IvyError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_indexes_nothing() {
        let config = IvyConfig::default();
        assert!(config.fields_to_index.is_empty());
        assert!(config.index_fields("planes").is_empty());
    }

    #[test]
    fn test_index_field_parse() {
        assert_eq!(IndexField::parse("tags"), IndexField::Tags);
        assert_eq!(
            IndexField::parse("bar"),
            IndexField::Unsupported("bar".to_string())
        );
    }

    #[test]
    fn test_with_index_accumulates() {
        let config = IvyConfig::new()
            .with_index("foos", ["tags"])
            .with_index("foos", ["bar"]);
        assert_eq!(
            config.index_fields("foos"),
            vec![IndexField::Tags, IndexField::Unsupported("bar".to_string())]
        );
        assert!(config.index_fields("planes").is_empty());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = IvyConfig::load(dir.path()).unwrap();
        assert_eq!(config, IvyConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = IvyConfig::new().with_index("planes", ["tags"]);
        config.save(dir.path()).unwrap();

        let loaded = IvyConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_malformed_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "{ not json").unwrap();

        let err = IvyConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, IvyError::Config(_)));
    }

    #[test]
    fn test_missing_key_defaults() {
        let config: IvyConfig = serde_json::from_str("{}").unwrap();
        assert!(config.fields_to_index.is_empty());
    }
}
