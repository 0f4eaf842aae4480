use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const DARK_MODE_KEY: &str = "darkMode";

/// Local device storage for small string preferences.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
}

/// Reads `"true"` / `"false"`; anything else counts as unset.
pub fn read_flag(store: &dyn PreferenceStore, key: &str) -> Result<Option<bool>, String> {
    Ok(match store.get(key)?.as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    })
}

pub fn write_flag(store: &mut dyn PreferenceStore, key: &str, value: bool) -> Result<(), String> {
    store.set(key, if value { "true" } else { "false" })
}

/// One JSON object on disk, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Map<String, Value>, String> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| format!("prefs_read_failed:{e}"))?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                log::warn!("ignoring malformed preferences at {}", self.path.display());
                Ok(Map::new())
            }
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self
            .load()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("prefs_dir_failed:{e}"))?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| format!("prefs_serialize_failed:{e}"))?;
        fs::write(&self.path, json).map_err(|e| format!("prefs_write_failed:{e}"))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes {
            return Err("prefs_write_failed:storage unavailable".into());
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let mut store = JsonFileStore::new(&path);
        assert_eq!(read_flag(&store, DARK_MODE_KEY).unwrap(), None);

        write_flag(&mut store, DARK_MODE_KEY, true).unwrap();
        let reopened = JsonFileStore::new(&path);
        assert_eq!(read_flag(&reopened, DARK_MODE_KEY).unwrap(), Some(true));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"darkMode\": \"true\""));
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get(DARK_MODE_KEY).unwrap(), None);
        write_flag(&mut store, DARK_MODE_KEY, false).unwrap();
        assert_eq!(read_flag(&store, DARK_MODE_KEY).unwrap(), Some(false));
    }

    #[test]
    fn unexpected_value_is_unset() {
        let mut store = MemoryStore::new();
        store.set(DARK_MODE_KEY, "yes").unwrap();
        assert_eq!(read_flag(&store, DARK_MODE_KEY).unwrap(), None);
    }

    #[test]
    fn failing_store_reports_code() {
        let mut store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let err = write_flag(&mut store, DARK_MODE_KEY, true).unwrap_err();
        assert!(err.starts_with("prefs_write_failed:"));
    }
}
