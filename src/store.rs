//! # Config Store
//!
//! Persists the [`PrinterConfig`] snapshot in a JSON object file under the
//! key `"printer-config"`. Other keys in the file belong to someone else and
//! are preserved on save.
//!
//! Loading never fails: a missing file, an unreadable file or a corrupt
//! snapshot all fall back to defaults, and individual fields that no longer
//! deserialize are dropped while the rest are kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::PrinterConfig;
use crate::error::StoreError;

/// Key the snapshot is stored under.
pub const CONFIG_KEY: &str = "printer-config";

/// JSON file holding the persisted config.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/recibo/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recibo").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config merged over the defaults.
    pub fn load(&self) -> PrinterConfig {
        let Some(stored) = self.read_object().get(CONFIG_KEY).cloned() else {
            debug!(path = %self.path.display(), "No stored config, using defaults");
            return PrinterConfig::default();
        };
        let Value::Object(fields) = stored else {
            warn!(path = %self.path.display(), "Stored config is not an object, using defaults");
            return PrinterConfig::default();
        };
        merge_fields(fields)
    }

    /// Write the config, keeping every other key in the file.
    pub fn save(&self, config: &PrinterConfig) -> Result<(), StoreError> {
        let mut root = self.read_object();
        root.insert(CONFIG_KEY.to_string(), serde_json::to_value(config)?);
        self.write_object(&root)?;
        debug!(path = %self.path.display(), "Config saved");
        Ok(())
    }

    /// Remove the stored config. The next load yields defaults.
    pub fn reset(&self) -> Result<(), StoreError> {
        let mut root = self.read_object();
        if root.remove(CONFIG_KEY).is_some() {
            self.write_object(&root)?;
        }
        Ok(())
    }

    /// The file's top-level object, or an empty one if it is missing or
    /// unusable.
    fn read_object(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read config file, using defaults");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(root)) => root,
            Ok(_) => {
                warn!(path = %self.path.display(), "Config file is not a JSON object, ignoring it");
                Map::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupted config file, using defaults");
                Map::new()
            }
        }
    }

    /// Write through a sibling temp file and rename over the target.
    fn write_object(&self, root: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(root)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Apply stored fields one at a time over the defaults, dropping any that
/// make the config fail to deserialize.
fn merge_fields(fields: Map<String, Value>) -> PrinterConfig {
    let mut merged = match serde_json::to_value(PrinterConfig::default()) {
        Ok(Value::Object(defaults)) => defaults,
        _ => Map::new(),
    };
    for (key, value) in fields {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value);
        if serde_json::from_value::<PrinterConfig>(Value::Object(candidate.clone())).is_ok() {
            merged = candidate;
        } else {
            warn!(field = %key, "Dropping stored config field with an invalid value");
        }
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FontSize, TextAlign};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), PrinterConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let config = PrinterConfig {
            header_text: "Shop".into(),
            font_size: FontSize::Xl,
            use_bluetooth: true,
            linked_printer_name: Some("MPT-II".into()),
            ..Default::default()
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_partial_snapshot_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"printer-config": {"content": "hi", "textAlign": "center"}}"#,
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.content, "hi");
        assert_eq!(config.text_align, TextAlign::Center);
        assert_eq!(config.font_size, FontSize::Base);
    }

    #[test]
    fn test_invalid_field_is_dropped() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"printer-config": {"content": "kept", "fontSize": "huge"}}"#,
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.content, "kept");
        assert_eq!(config.font_size, FontSize::Base);
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), PrinterConfig::default());

        // Saving over a corrupt file replaces it.
        store.save(&PrinterConfig::default()).unwrap();
        assert_eq!(store.load(), PrinterConfig::default());
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"theme": "dark"}"#).unwrap();

        store.save(&PrinterConfig::default()).unwrap();
        let root: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(root["theme"], "dark");
        assert!(root[CONFIG_KEY].is_object());

        store.reset().unwrap();
        let root: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(root["theme"], "dark");
        assert!(root.get(CONFIG_KEY).is_none());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("settings.json"));
        store.save(&PrinterConfig::default()).unwrap();
        assert!(store.path().exists());
    }
}
