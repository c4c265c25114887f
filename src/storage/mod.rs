// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent key-value storage and the workout repository built on it.

pub mod file;
pub mod repository;

pub use file::{FileStore, MemoryStore};
pub use repository::{LoadedWorkouts, WorkoutRepository};

use crate::error::Result;

/// Storage keys as constants.
pub mod keys {
    /// The saved workout collection.
    pub const WORKOUTS: &str = "workout";
}

/// Synchronous string key-value store.
///
/// `set` may fail (full disk, quota, permissions); callers decide whether
/// that is fatal.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}
