// View preferences: the only state that survives a restart.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPreferences {
    pub sidebar_open: bool,
    pub active_panel: Option<String>,
    pub visible_layers: Vec<String>,
    pub preview_rows: usize,
}

impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            active_panel: None,
            visible_layers: Vec::new(),
            preview_rows: 5,
        }
    }
}

pub trait PreferenceStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ViewPreferences>>;
    fn save(&self, prefs: &ViewPreferences) -> Result<()>;
}

pub struct JsonFilePreferences {
    path: PathBuf,
}

impl JsonFilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn load(&self) -> Result<Option<ViewPreferences>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let s = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&s)?))
    }

    fn save(&self, prefs: &ViewPreferences) -> Result<()> {
        let s = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, s)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    saved: RefCell<Option<String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self) -> Result<Option<ViewPreferences>> {
        match self.saved.borrow().as_deref() {
            Some(s) => Ok(Some(serde_json::from_str(s)?)),
            None => Ok(None),
        }
    }

    fn save(&self, prefs: &ViewPreferences) -> Result<()> {
        *self.saved.borrow_mut() = Some(serde_json::to_string(prefs)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePreferences::new(dir.path().join("prefs.json"));
        assert_eq!(store.load().unwrap(), None);

        let prefs = ViewPreferences {
            sidebar_open: false,
            active_panel: Some("analytics".into()),
            visible_layers: vec!["thermal-comfort".into()],
            preview_rows: 12,
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load().unwrap(), Some(prefs));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let store = MemoryPreferences::default();
        *store.saved.borrow_mut() = Some(r#"{"preview_rows": 3}"#.to_string());
        let prefs = store.load().unwrap().unwrap();
        assert_eq!(prefs.preview_rows, 3);
        assert!(prefs.sidebar_open);
    }
}
