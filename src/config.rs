use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open each new directory as soon as it is created
    pub expand_new_directories: bool,
    /// Screen handed to the navigator when a document is activated
    pub viewer_screen: String,
    /// Kind pre-filled in the new-document form
    pub default_file_kind: String,
    pub indent_width: usize,
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expand_new_directories: true,
            viewer_screen: "Viewer".to_string(),
            default_file_kind: "Informe".to_string(),
            indent_width: 2,
            recent_limit: 10,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, or the defaults when no path is given.
    /// Missing keys fall back to their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                let config = serde_json::from_str(&content)?;
                log::info!("Loaded configuration from {:?}", path);
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_path() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.expand_new_directories);
        assert_eq!(config.viewer_screen, "Viewer");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "indent_width": 4, "expand_new_directories": false }"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.indent_width, 4);
        assert!(!config.expand_new_directories);
        assert_eq!(config.recent_limit, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            viewer_screen: "Preview".to_string(),
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(Some(path.as_path())).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());
    }
}
