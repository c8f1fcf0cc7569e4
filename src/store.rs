use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::review::{self, ReviewResult};

pub const RESULT_KEY: &str = "lastReviewResult";
pub const CODE_KEY: &str = "lastOriginalCode";
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Refusing to store invalid review: {0}")]
    Invalid(#[from] review::ReviewError),

    #[error("No usable stored review: {0}")]
    Integrity(String),
}

/// A string key/value slot that survives moving between views.
pub trait Slot: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write several keys as one unit.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;
}

/// In-process slot; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, String>>,
}

impl Slot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, new_entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// Slot persisted as one JSON object file, so the result view of a later
/// invocation can read what the input view wrote.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                warn!(path = %self.path.display(), "store file is not a JSON object; starting empty");
                Ok(Map::new())
            }
        }
    }
}

impl Slot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.read_all()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut map = self.read_all()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), Value::String(value.clone()));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&Value::Object(map))?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Holds the last submitted code and its review, plus the dark-mode
/// preference. At most one review is held; a new save replaces it.
pub struct ReviewStore {
    slot: Box<dyn Slot>,
}

impl ReviewStore {
    pub fn new(slot: impl Slot + 'static) -> Self {
        Self {
            slot: Box::new(slot),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySlot::default())
    }

    #[instrument(skip_all, fields(code_bytes = code.len()))]
    pub fn save(&self, code: &str, result: &ReviewResult) -> Result<(), StoreError> {
        review::validate(result)?;
        let encoded = serde_json::to_string(result)?;
        self.slot
            .set_many(&[(RESULT_KEY, encoded), (CODE_KEY, code.to_string())])?;
        debug!("saved review result");
        Ok(())
    }

    /// Read back the last saved code and result. Absent or unparsable data
    /// is an integrity failure; callers redirect rather than render.
    pub fn load(&self) -> Result<(String, ReviewResult), StoreError> {
        let raw = self
            .slot
            .get(RESULT_KEY)?
            .ok_or_else(|| StoreError::Integrity("no review has been saved".to_string()))?;
        let result: ReviewResult = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Integrity(format!("stored review is corrupt: {}", e)))?;
        review::validate(&result).map_err(|e| StoreError::Integrity(e.to_string()))?;
        let code = self
            .slot
            .get(CODE_KEY)?
            .ok_or_else(|| StoreError::Integrity("original code is missing".to_string()))?;
        Ok((code, result))
    }

    pub fn dark_mode(&self) -> bool {
        match self.slot.get(DARK_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(error = %e, "could not read dark mode preference");
                false
            }
        }
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StoreError> {
        self.slot
            .set_many(&[(DARK_MODE_KEY, enabled.to_string())])
    }
}
