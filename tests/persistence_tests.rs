// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout repository save/load tests.

use chrono::{TimeZone, Utc};
use workout_mapper::error::AppError;
use workout_mapper::models::{Coordinates, Workout};
use workout_mapper::storage::{keys, FileStore, MemoryStore, WorkoutRepository};

mod common;

fn sample_workouts() -> Vec<Workout> {
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 4, d, 7, 15, 0).unwrap();
    vec![
        Workout::running(Coordinates::new(51.5, -0.1), 5.2, 31.5, 168.0, day(1)).unwrap(),
        Workout::cycling(Coordinates::new(51.52, -0.12), 27.0, 95.0, 240.0, day(2)).unwrap(),
        Workout::running(Coordinates::new(51.49, -0.08), 10.0, 55.0, 172.0, day(3)).unwrap(),
    ]
}

#[test]
fn test_round_trip_preserves_order_and_fields() {
    let mut repo = WorkoutRepository::new(Box::new(MemoryStore::new()));
    let workouts = sample_workouts();

    repo.save(&workouts).unwrap();
    let loaded = repo.load().unwrap();

    assert_eq!(loaded, workouts);
}

#[test]
fn test_round_trip_through_files() {
    let dir = std::env::temp_dir().join(format!("workout-mapper-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let workouts = sample_workouts();
    {
        let mut repo = WorkoutRepository::new(Box::new(FileStore::open(&dir).unwrap()));
        repo.save(&workouts).unwrap();
    }

    // A new session over the same directory sees the same workouts
    let repo = WorkoutRepository::new(Box::new(FileStore::open(&dir).unwrap()));
    assert_eq!(repo.load().unwrap(), workouts);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_saved_layout() {
    let store = common::SharedStore::new();
    let mut repo = WorkoutRepository::new(Box::new(store.clone()));
    repo.save(&sample_workouts()).unwrap();
    let text = store.raw(keys::WORKOUTS).expect("workouts should be saved");

    let saved: serde_json::Value = serde_json::from_str(&text).unwrap();
    let first = &saved[0];
    assert_eq!(first["type"], "running");
    assert_eq!(first["coords"], serde_json::json!([51.5, -0.1]));
    assert_eq!(first["distance"], 5.2);
    assert_eq!(first["duration"], 31.5);
    assert_eq!(first["cadence"], 168.0);
    assert!(first["pace"].is_number());
    assert!(first["date"].is_string());
    assert_eq!(saved[1]["type"], "cycling");
    assert_eq!(saved[1]["elevationGain"], 240.0);
    assert!(saved[1]["speed"].is_number());
}

#[test]
fn test_empty_storage_loads_nothing() {
    let repo = WorkoutRepository::new(Box::new(MemoryStore::new()));
    assert!(repo.load().unwrap().is_empty());
}

#[test]
fn test_malformed_storage_is_corrupt_not_empty() {
    let repo = WorkoutRepository::new(Box::new(MemoryStore::with_entry(
        keys::WORKOUTS,
        "[{not json",
    )));
    assert!(matches!(repo.load(), Err(AppError::StorageCorrupt(_))));
}

#[test]
fn test_loads_browser_written_records() {
    // Millisecond ISO dates and integer-valued numbers
    let text = r#"[{"date":"2024-04-14T09:30:00.123Z","id":"1713087000123",
        "coords":[51.5,-0.1],"distance":5,"duration":30,"type":"running",
        "cadence":150,"pace":6}]"#;
    let repo = WorkoutRepository::new(Box::new(MemoryStore::with_entry(keys::WORKOUTS, text)));

    let loaded = repo.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id(), "1713087000123");
    assert_eq!(loaded[0].derived_metric(), 6.0);
}

#[test]
fn test_write_failure_propagates() {
    let mut repo = WorkoutRepository::new(Box::new(common::FailingStore));
    assert!(matches!(
        repo.save(&sample_workouts()),
        Err(AppError::StorageWrite(_))
    ));
}
