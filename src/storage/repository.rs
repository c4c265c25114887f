// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout persistence on top of a key-value store.
//!
//! The whole ordered collection is stored as one JSON array under
//! [`keys::WORKOUTS`]. There is no schema version.

use super::{keys, KeyValueStore};
use crate::error::{AppError, Result};
use crate::models::Workout;

/// Result of reading the saved collection.
#[derive(Debug, Default)]
pub struct LoadedWorkouts {
    pub workouts: Vec<Workout>,
    /// Records dropped because they failed to parse or validate
    pub skipped: usize,
}

/// Saves and loads the workout collection.
pub struct WorkoutRepository {
    store: Box<dyn KeyValueStore>,
}

impl WorkoutRepository {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Serialize and write the full collection, oldest first.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<()> {
        let text = serde_json::to_string(workouts)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize workouts: {}", e)))?;
        self.store.set(keys::WORKOUTS, &text)?;
        tracing::debug!(count = workouts.len(), "Saved workouts");
        Ok(())
    }

    /// Read the saved collection. See [`Self::load_with_report`].
    pub fn load(&self) -> Result<Vec<Workout>> {
        self.load_with_report().map(|loaded| loaded.workouts)
    }

    /// Read the saved collection and count the records that were dropped.
    ///
    /// Returns an empty collection when nothing was saved, and
    /// `StorageCorrupt` when the saved text is not a JSON array. Records
    /// that fail to parse or validate are skipped; the rest are restored
    /// with their derived metrics recomputed. Validation is stricter than
    /// older versions of the app (cadence must be a whole number), so
    /// records those versions wrote can be skipped here.
    pub fn load_with_report(&self) -> Result<LoadedWorkouts> {
        let Some(text) = self.store.get(keys::WORKOUTS)? else {
            return Ok(LoadedWorkouts::default());
        };

        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| AppError::StorageCorrupt(e.to_string()))?;

        let records = match value {
            serde_json::Value::Null => return Ok(LoadedWorkouts::default()),
            serde_json::Value::Array(records) => records,
            other => {
                return Err(AppError::StorageCorrupt(format!(
                    "expected an array of workouts, found {}",
                    json_kind(&other)
                )))
            }
        };

        let total = records.len();
        let workouts: Vec<Workout> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                match serde_json::from_value::<Workout>(record)
                    .map_err(|e| AppError::StorageCorrupt(e.to_string()))
                    .and_then(Workout::rederive)
                {
                    Ok(workout) => Some(workout),
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Skipping unreadable saved workout");
                        None
                    }
                }
            })
            .collect();

        let skipped = total - workouts.len();
        tracing::debug!(loaded = workouts.len(), skipped, "Loaded workouts");
        Ok(LoadedWorkouts { workouts, skipped })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_absent_is_empty() {
        let repo = WorkoutRepository::new(Box::new(MemoryStore::new()));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_null_is_empty() {
        let repo = WorkoutRepository::new(Box::new(MemoryStore::with_entry(
            keys::WORKOUTS,
            "null",
        )));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_object_is_corrupt() {
        let repo = WorkoutRepository::new(Box::new(MemoryStore::with_entry(
            keys::WORKOUTS,
            r#"{"type":"running"}"#,
        )));
        assert!(matches!(repo.load(), Err(AppError::StorageCorrupt(_))));
    }

    #[test]
    fn test_bad_record_skipped() {
        let text = r#"[
            {"id":"1","date":"2024-04-14T10:00:00.000Z","coords":[1.0,2.0],
             "distance":5,"duration":30,"type":"running","cadence":150,"pace":6},
            {"id":"2","type":"swimming"},
            {"id":"3","date":"2024-04-15T10:00:00.000Z","coords":[1.0,2.0],
             "distance":-5,"duration":30,"type":"running","cadence":150,"pace":6}
        ]"#;
        let repo = WorkoutRepository::new(Box::new(MemoryStore::with_entry(keys::WORKOUTS, text)));
        let loaded = repo.load_with_report().unwrap();
        assert_eq!(loaded.workouts.len(), 1);
        assert_eq!(loaded.workouts[0].id(), "1");
        assert_eq!(loaded.skipped, 2);
    }
}
