use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::app::error::{AppError, Result};

/// A settings mapping: string keys to arbitrarily nested JSON values.
pub type SettingsMap = Map<String, Value>;

/// The persisted key-value configuration shared across the application's
/// lifetime. Constructed empty, populated by [`SettingsStore::load`],
/// mutated through [`set`](SettingsStore::set) and
/// [`clear`](SettingsStore::clear) which persist immediately.
///
/// The store itself is not synchronized; the shell facade owns it behind
/// a mutex (see [`crate::app::api::App`]).
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: SettingsMap,
}

/// Merge `defaults` into `target`, recursively, target-wins.
///
/// Keys absent from `target` get the default value copied verbatim,
/// nested structure included. Where both sides hold an object the merge
/// recurses, so newly introduced nested defaults appear without
/// clobbering existing customizations. If `target` holds a non-object
/// where the default is an object, the existing value wins and the
/// default subtree is skipped entirely. Keys only in `target` are left
/// untouched.
pub fn merge(target: &mut SettingsMap, defaults: &SettingsMap) {
    for (key, default) in defaults {
        if !target.contains_key(key) {
            target.insert(key.clone(), default.clone());
        } else if let (Some(Value::Object(existing)), Value::Object(default)) =
            (target.get_mut(key), default)
        {
            merge(existing, default);
        }
    }
}

impl SettingsStore {
    /// A store backed by the given file path. Nothing is read until
    /// [`load`](Self::load).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: SettingsMap::new(),
        }
    }

    /// A store at the per-user config location (cross-platform).
    pub fn at_default_location() -> Self {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("stackist");
        path.push("settings.json");
        Self::at(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from disk and merge `defaults` in.
    ///
    /// No file yet: the defaults become the settings and are persisted,
    /// returning the save error if that fails. Read or decode failure:
    /// same fallback, but the result is a [`AppError::SettingsLoad`]
    /// carrying both the original failure and any save failure. Decode
    /// success: defaults are merged in and nothing is written until the
    /// next explicit mutation.
    pub fn load(&mut self, defaults: SettingsMap) -> Result<()> {
        if !self.path.exists() {
            self.values = defaults;
            return self.save();
        }

        let read_err = match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<SettingsMap>(&contents) {
                Ok(loaded) => {
                    self.values = loaded;
                    merge(&mut self.values, &defaults);
                    return Ok(());
                }
                Err(e) => AppError::SettingsDecode(e),
            },
            Err(e) => AppError::StorageRead {
                path: self.path.clone(),
                source: e,
            },
        };

        // Fall back to defaults so the app can keep running, but keep the
        // root cause inspectable alongside any save failure.
        self.values = defaults;
        Err(AppError::SettingsLoad {
            read: Box::new(read_err),
            save: self.save().err().map(Box::new),
        })
    }

    /// Serialize the whole mapping to the backing file, creating the
    /// containing directory if needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::StorageWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.values).map_err(AppError::SettingsEncode)?;
        fs::write(&self.path, json).map_err(|e| AppError::StorageWrite {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Raw, untyped access. Typed consumers (windowing) convert
    /// defensively on their side.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Assign and persist. The in-memory value is kept even when the save
    /// fails; the error is returned for the caller to log.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        self.values.insert(key.into(), value);
        self.save()
    }

    /// Remove and persist, same failure policy as [`set`](Self::set).
    pub fn clear(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn map(value: Value) -> SettingsMap {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_additive_defaulting() {
        let mut target = map(json!({"Theme": "dark"}));
        let defaults = map(json!({"Theme": "light", "Windowing": {"Width": 1280}}));
        merge(&mut target, &defaults);
        assert_eq!(target["Theme"], json!("dark"));
        assert_eq!(target["Windowing"], json!({"Width": 1280}));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut once = map(json!({"A": 1, "Nested": {"X": true}}));
        let defaults = map(json!({"A": 2, "B": 3, "Nested": {"X": false, "Y": 4}}));
        merge(&mut once, &defaults);
        let mut twice = once.clone();
        merge(&mut twice, &defaults);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_never_overwrites_existing_scalars() {
        let mut target = map(json!({"FontSize": 12}));
        let defaults = map(json!({"FontSize": 16}));
        merge(&mut target, &defaults);
        assert_eq!(target["FontSize"], json!(12));
    }

    #[test]
    fn test_merge_recurses_into_nested_objects() {
        let mut target = map(json!({"Windowing": {"Width": 800}}));
        let defaults = map(json!({"Windowing": {"Width": 1280, "Height": 720}}));
        merge(&mut target, &defaults);
        assert_eq!(target["Windowing"], json!({"Width": 800, "Height": 720}));
    }

    #[test]
    fn test_merge_skips_defaults_under_scalar_collision() {
        // A stray scalar where an object is expected wins; the default
        // subtree is dropped, not repaired.
        let mut target = map(json!({"Windowing": "corrupt"}));
        let defaults = map(json!({"Windowing": {"Width": 1280}}));
        merge(&mut target, &defaults);
        assert_eq!(target["Windowing"], json!("corrupt"));
    }

    #[test]
    fn test_merge_leaves_unknown_keys_alone() {
        let mut target = map(json!({"Custom": [1, 2, 3]}));
        merge(&mut target, &map(json!({"Other": true})));
        assert_eq!(target["Custom"], json!([1, 2, 3]));
        assert_eq!(target["Other"], json!(true));
    }

    #[test]
    fn test_load_fresh_install_seeds_and_persists_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stackist").join("settings.json");
        let defaults = map(json!({
            "Windowing": {"Width": 1280, "Height": 720, "Fullscreen": false,
                          "Maximized": false, "Minimized": false}
        }));

        let mut store = SettingsStore::at(&path);
        store.load(defaults.clone()).unwrap();
        assert_eq!(store.get("Windowing"), Some(&defaults["Windowing"]));

        // The file exists on disk and contains the seeded value.
        let on_disk: SettingsMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, defaults);
    }

    #[test]
    fn test_load_merges_defaults_into_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"Theme": "dark"}"#).unwrap();

        let mut store = SettingsStore::at(&path);
        let defaults = map(json!({"Theme": "light", "Windowing": {"Width": 1280}}));
        store.load(defaults).unwrap();

        assert_eq!(store.get("Theme"), Some(&json!("dark")));
        assert_eq!(store.get("Windowing"), Some(&json!({"Width": 1280})));
        // No implicit save: the file still holds only the user's key.
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"Theme": "dark"}"#);
    }

    #[test]
    fn test_load_corrupt_file_falls_back_and_reports_cause() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = SettingsStore::at(&path);
        let err = store.load(map(json!({"Theme": "light"}))).unwrap_err();
        let AppError::SettingsLoad { read, save } = err else {
            panic!("expected SettingsLoad");
        };
        assert!(matches!(*read, AppError::SettingsDecode(_)));
        assert!(save.is_none());

        // In-memory and on-disk state both recovered to the defaults.
        assert_eq!(store.get("Theme"), Some(&json!("light")));
        let on_disk: SettingsMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["Theme"], json!("light"));
    }

    #[test]
    fn test_set_and_clear_persist_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::at(&path);
        store.load(SettingsMap::new()).unwrap();

        store.set("Theme", json!("dark")).unwrap();
        let on_disk: SettingsMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["Theme"], json!("dark"));

        store.clear("Theme").unwrap();
        assert_eq!(store.get("Theme"), None);
        let on_disk: SettingsMap =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(!on_disk.contains_key("Theme"));
    }

    #[test]
    fn test_set_keeps_memory_value_when_save_fails() {
        // A directory at the file path makes the write fail.
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        let mut store = SettingsStore::at(&path);
        let err = store.set("Theme", json!("dark")).unwrap_err();
        assert!(matches!(err, AppError::StorageWrite { .. }));
        assert_eq!(store.get("Theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_default_location_under_config_dir() {
        let store = SettingsStore::at_default_location();
        let path = store.path().to_string_lossy().replace('\\', "/");
        assert!(path.ends_with("stackist/settings.json"));
    }
}
