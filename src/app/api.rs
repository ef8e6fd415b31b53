use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::app::domain::document::StackDocument;
use crate::app::domain::settings::{SettingsMap, SettingsStore};
use crate::app::domain::windowing::{Windowing, WINDOWING_KEY};
use crate::app::error::{AppError, Result};

/// The surface the GUI shell talks to: document open/save, raw byte round
/// trips, and the settings store.
///
/// The shell may call in from multiple invocation contexts, so the store
/// lives behind a mutex and every settings operation holds the lock for
/// its whole duration. Settings persistence failures are logged here and
/// never propagate - the in-memory state stays authoritative. The
/// document codec, by contrast, propagates every error to the caller.
pub struct App {
    settings: Mutex<SettingsStore>,
}

impl App {
    /// An app whose settings live at the per-user config location.
    pub fn new() -> Self {
        Self::with_store(SettingsStore::at_default_location())
    }

    /// An app over an explicitly constructed store (tests, portable mode).
    pub fn with_store(store: SettingsStore) -> Self {
        Self {
            settings: Mutex::new(store),
        }
    }

    fn store(&self) -> MutexGuard<'_, SettingsStore> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load settings with the given defaults and derive the startup
    /// window state. Load failures fall back to the defaults inside the
    /// store and are only reported, never fatal to startup.
    pub fn load_settings(&self, defaults: SettingsMap) -> Windowing {
        let mut store = self.store();
        if let Err(e) = store.load(defaults) {
            eprintln!("Error loading settings: {}", e);
        }
        Windowing::from_value(store.get(WINDOWING_KEY))
    }

    pub fn get_setting(&self, key: &str) -> Option<Value> {
        self.store().get(key).cloned()
    }

    pub fn set_setting(&self, key: impl Into<String>, value: Value) {
        if let Err(e) = self.store().set(key, value) {
            eprintln!("Failed to save settings: {}", e);
        }
    }

    pub fn clear_setting(&self, key: &str) {
        if let Err(e) = self.store().clear(key) {
            eprintln!("Failed to save settings: {}", e);
        }
    }

    /// Reconcile persisted window state with what the window system just
    /// reported and persist the result.
    pub fn window_geometry_changed(
        &self,
        width: i32,
        height: i32,
        fullscreen: bool,
        maximized: bool,
        minimized: bool,
    ) {
        let mut store = self.store();
        let mut windowing = Windowing::from_value(store.get(WINDOWING_KEY));
        windowing.apply_live_geometry(width, height, fullscreen, maximized, minimized);
        if let Err(e) = store.set(WINDOWING_KEY, windowing.to_value()) {
            eprintln!("Failed to persist window state: {}", e);
        }
    }

    /// Read and decode a project file. Legacy files come back upgraded to
    /// the current revision.
    pub fn open_document(&self, path: impl AsRef<Path>) -> Result<StackDocument> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| AppError::StorageRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        StackDocument::decode(&bytes)
    }

    /// Encode and write a project file, overwriting it.
    pub fn save_document(&self, path: impl AsRef<Path>, document: &StackDocument) -> Result<()> {
        let bytes = document.encode()?;
        self.write_bytes(path, &bytes)
    }

    /// Raw file read for the shell (image imports and the like).
    pub fn read_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).map_err(|e| AppError::StorageRead {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Raw file write for the shell.
    pub fn write_bytes(&self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, bytes).map_err(|e| AppError::StorageWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
