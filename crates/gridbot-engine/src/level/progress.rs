//! Persisted progress: current level plus the completed set, stored as a
//! single JSON record under a fixed key.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::{error, warn};
use serde::{Deserialize, Serialize};

/// Fixed storage key for the progress record.
pub const PROGRESS_KEY: &str = "gridbot.progress";

/// The persisted record. Survives across sessions; mutated only by
/// level-advance and level-completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub current_level: u32,
    #[serde(default)]
    pub completed: Vec<u32>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_level: 1,
            completed: Vec::new(),
        }
    }
}

impl ProgressRecord {
    /// Insert a completed level, kept sorted with no duplicates.
    pub fn mark_completed(&mut self, level: u32) {
        if let Err(idx) = self.completed.binary_search(&level) {
            self.completed.insert(idx, level);
        }
    }

    pub fn is_completed(&self, level: u32) -> bool {
        self.completed.binary_search(&level).is_ok()
    }
}

/// Where progress records live. Implementations must not fail loudly:
/// a missing value reads as None, a failed write logs and moves on.
pub trait ProgressStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

impl<S: ProgressStore + ?Sized> ProgressStore for &mut S {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) {
        (**self).save(key, value)
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// File-backed store: one `<key>.json` file per key under a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ProgressStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            error!("cannot create progress dir {:?}: {err}", self.dir);
            return;
        }
        if let Err(err) = fs::write(self.path_for(key), value) {
            error!("cannot write progress {key:?}: {err}");
        }
    }
}

/// Read the record from a store, failing soft to the default on missing
/// or corrupt data.
pub fn load_record<S: ProgressStore>(store: &S) -> ProgressRecord {
    let Some(raw) = store.load(PROGRESS_KEY) else {
        return ProgressRecord::default();
    };
    match serde_json::from_str(&raw) {
        Ok(record) => record,
        Err(err) => {
            warn!("corrupt progress record, resetting: {err}");
            ProgressRecord::default()
        }
    }
}

/// Write the record back. Serialization of this shape cannot fail.
pub fn save_record<S: ProgressStore>(store: &mut S, record: &ProgressRecord) {
    if let Ok(json) = serde_json::to_string(record) {
        store.save(PROGRESS_KEY, &json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record() {
        let record = ProgressRecord::default();
        assert_eq!(record.current_level, 1);
        assert!(record.completed.is_empty());
    }

    #[test]
    fn mark_completed_is_idempotent_and_sorted() {
        let mut record = ProgressRecord::default();
        record.mark_completed(3);
        record.mark_completed(1);
        record.mark_completed(3);
        assert_eq!(record.completed, vec![1, 3]);
        assert!(record.is_completed(3));
        assert!(!record.is_completed(2));
    }

    #[test]
    fn missing_data_fails_soft() {
        let store = MemoryStore::new();
        assert_eq!(load_record(&store), ProgressRecord::default());
    }

    #[test]
    fn corrupt_data_fails_soft() {
        let mut store = MemoryStore::new();
        store.save(PROGRESS_KEY, "{ not json !");
        assert_eq!(load_record(&store), ProgressRecord::default());
    }

    #[test]
    fn save_and_reload() {
        let mut store = MemoryStore::new();
        let mut record = ProgressRecord::default();
        record.current_level = 4;
        record.mark_completed(2);
        save_record(&mut store, &record);
        assert_eq!(load_record(&store), record);
    }
}
