// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use workout_mapper::config::Config;
use workout_mapper::controller::Tracker;
use workout_mapper::error::{AppError, Result};
use workout_mapper::map::GeoJsonMapProvider;
use workout_mapper::models::Coordinates;
use workout_mapper::routes::create_router;
use workout_mapper::storage::{KeyValueStore, MemoryStore};
use workout_mapper::time_utils::Clock;
use workout_mapper::AppState;

/// Position reported by the test geolocation.
#[allow(dead_code)]
pub const HOME: Coordinates = Coordinates {
    lat: 37.42,
    lng: -122.08,
};

/// Clock starting at 2024-04-14 09:30 UTC that advances one second per call.
#[derive(Clone)]
pub struct StepClock {
    next_ms: Arc<AtomicI64>,
}

impl StepClock {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 4, 14, 9, 30, 0).unwrap())
    }

    #[allow(dead_code)]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next_ms: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.next_ms.fetch_add(1_000, Ordering::SeqCst);
        Utc.timestamp_millis_opt(ms).unwrap()
    }
}

/// Clock that always reports the same instant, so every workout it stamps
/// gets the same id.
#[derive(Clone, Copy)]
pub struct FrozenClock(pub DateTime<Utc>);

impl FrozenClock {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 4, 14, 9, 30, 0).unwrap())
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Store that reads as empty and rejects every write.
#[allow(dead_code)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(AppError::StorageWrite("quota exceeded".to_string()))
    }
}

/// Memory store whose contents stay visible to the test after the
/// tracker takes its own handle.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<std::sync::Mutex<MemoryStore>>,
}

impl SharedStore {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_entry(key: &str, value: &str) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(MemoryStore::with_entry(key, value))),
        }
    }

    /// Raw saved text under `key`.
    #[allow(dead_code)]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.get(key).unwrap()
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.lock().unwrap().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner.lock().unwrap().set(key, value)
    }
}

/// Test config with a short form restore delay.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        form_restore_delay: std::time::Duration::from_millis(10),
        ..Config::default()
    }
}

/// Tracker over `store` that has restored and loaded its map at [`HOME`].
#[allow(dead_code)]
pub fn ready_tracker(store: Box<dyn KeyValueStore>) -> Tracker {
    let mut tracker = Tracker::new(test_config(), store, Box::new(StepClock::new()));
    tracker.restore();
    tracker.begin_locating();
    tracker
        .on_location(Ok(HOME), &GeoJsonMapProvider)
        .expect("fixed position should load the map");
    tracker
}

/// Create a test app over an in-memory store with the map loaded.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(ready_tracker(Box::new(MemoryStore::new())))
}

/// Create a test app whose position lookup failed.
#[allow(dead_code)]
pub fn create_test_app_without_map() -> (axum::Router, Arc<AppState>) {
    let mut tracker = Tracker::new(
        test_config(),
        Box::new(MemoryStore::new()),
        Box::new(StepClock::new()),
    );
    tracker.restore();
    tracker.begin_locating();
    let _ = tracker.on_location(
        Err(AppError::GeolocationDenied("denied".to_string())),
        &GeoJsonMapProvider,
    );
    create_app_with(tracker)
}

#[allow(dead_code)]
fn create_app_with(tracker: Tracker) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: tracker.config().clone(),
        tracker: Mutex::new(tracker),
    });
    (create_router(state.clone()), state)
}
