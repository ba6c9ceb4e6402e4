use crate::scanner::default_image_extensions;
use crate::tags::DEFAULT_DELIMITER;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Tag delimiter inside tag files
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// First index of the rename sequence
    #[serde(default = "default_start_index")]
    pub start_index: usize,

    /// Recognized image extensions (without dots)
    #[serde(default = "default_extensions")]
    pub image_extensions: Vec<String>,

    /// Match exact deletes case-insensitively
    #[serde(default)]
    pub case_insensitive: bool,

    /// Move orphaned files into the quarantine folder during full runs
    #[serde(default = "default_true")]
    pub quarantine_orphans: bool,

    /// Apply the stylistic tag pass during full runs
    #[serde(default = "default_true")]
    pub standardize: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            start_index: default_start_index(),
            image_extensions: default_extensions(),
            case_insensitive: false,
            quarantine_orphans: true,
            standardize: true,
        }
    }
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_start_index() -> usize {
    1
}

fn default_extensions() -> Vec<String> {
    default_image_extensions()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from .tagprep/config.toml if it exists
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(".tagprep").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        // Return default config if no config file exists
        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.delimiter, ',');
        assert_eq!(config.defaults.start_index, 1);
        assert_eq!(config.defaults.image_extensions, ["jpg", "jpeg", "png", "webp"]);
        assert!(!config.defaults.case_insensitive);
        assert!(config.defaults.quarantine_orphans);
        assert!(config.defaults.standardize);
    }

    #[test]
    fn test_load_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.start_index = 0;
        config.defaults.case_insensitive = true;
        config.defaults.image_extensions = vec!["png".to_string()];

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.defaults.start_index, 0);
        assert!(loaded.defaults.case_insensitive);
        assert_eq!(loaded.defaults.image_extensions, ["png"]);
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[defaults]
start_index = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.start_index, 5);
        // Other fields should have their defaults
        assert_eq!(config.defaults.delimiter, ',');
        assert!(config.defaults.quarantine_orphans);
    }
}
