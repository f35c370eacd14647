//! Level navigation and completion tracking, persisting the progress
//! record after every mutation.

use log::warn;

use crate::api::types::ActionError;
use crate::level::config::{LevelConfig, LevelSet};
use crate::level::progress::{load_record, save_record, ProgressRecord, ProgressStore};

pub struct LevelManager<S: ProgressStore> {
    levels: LevelSet,
    record: ProgressRecord,
    store: S,
}

impl<S: ProgressStore> LevelManager<S> {
    /// Load persisted progress through the store, clamping a stale
    /// current-level to the available range.
    pub fn new(levels: LevelSet, store: S) -> Self {
        let mut record = load_record(&store);
        let max = levels.len() as u32;
        if max > 0 && (record.current_level == 0 || record.current_level > max) {
            warn!(
                "persisted level {} out of range 1..={max}, resetting to 1",
                record.current_level
            );
            record.current_level = 1;
        }
        Self {
            levels,
            record,
            store,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.record.current_level
    }

    pub fn max_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    /// The active level's configuration.
    pub fn config(&self) -> Option<&LevelConfig> {
        self.levels.get(self.record.current_level)
    }

    /// Jump to a specific level (1-based, bounds-checked).
    pub fn go_to_level(&mut self, number: u32) -> Result<(), ActionError> {
        if number == 0 || number > self.max_levels() {
            return Err(ActionError::NoSuchLevel(number));
        }
        self.record.current_level = number;
        save_record(&mut self.store, &self.record);
        Ok(())
    }

    /// Advance one level; fails at the final level without changing state.
    pub fn next_level(&mut self) -> Result<u32, ActionError> {
        if self.record.current_level >= self.max_levels() {
            return Err(ActionError::AtFinalLevel);
        }
        self.record.current_level += 1;
        save_record(&mut self.store, &self.record);
        Ok(self.record.current_level)
    }

    /// Record a completed level. Idempotent.
    pub fn complete_level(&mut self, number: u32) {
        self.record.mark_completed(number);
        save_record(&mut self.store, &self.record);
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }
}
