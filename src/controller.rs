// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker session controller.
//!
//! Sequences the session:
//! 1. Restore saved workouts
//! 2. Acquire the user's position
//! 3. Create the map and replay saved workouts as markers
//! 4. Map click opens the entry form at the clicked position
//! 5. Form submit creates a workout, renders it, and saves the collection
//!
//! The tracker owns the workout collection and the pending click position;
//! nothing else mutates them.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geolocation::{self, GeolocationProvider};
use crate::map::{MapProvider, MapSurface, Marker, Popup, TileLayer};
use crate::models::{Coordinates, Workout, WorkoutType};
use crate::render::{self, ListItem};
use crate::storage::{KeyValueStore, WorkoutRepository};
use crate::time_utils::Clock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionState {
    Bootstrapping,
    AwaitingLocation,
    /// Position lookup failed; no map for the rest of the session.
    LocationUnavailable,
    MapReady,
    FormOpen,
}

/// Form inputs that can hold focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum FormField {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

/// Presentation state of the entry form.
#[derive(Debug, Clone)]
pub struct FormView {
    /// Shown because of a map click and not yet submitted
    pub open: bool,
    /// Current value of the type selector
    pub workout_type: WorkoutType,
    pub focus: Option<FormField>,
    /// Cleared briefly after a submit, then restored by a timer
    displayed: Arc<AtomicBool>,
}

impl Default for FormView {
    fn default() -> Self {
        Self {
            open: false,
            workout_type: WorkoutType::Running,
            focus: None,
            displayed: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl FormView {
    pub fn is_displayed(&self) -> bool {
        self.displayed.load(Ordering::SeqCst)
    }

    /// The type-specific field currently shown.
    pub fn visible_field(&self) -> FormField {
        match self.workout_type {
            WorkoutType::Running => FormField::Cadence,
            WorkoutType::Cycling => FormField::Elevation,
        }
    }
}

/// Raw values submitted from the entry form.
///
/// Values are strings as typed; only the field matching the type is used
/// besides distance and duration. Without a `type` the form's selector
/// decides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    #[serde(rename = "type", default)]
    pub workout_type: Option<WorkoutType>,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub cadence: String,
    #[serde(default)]
    pub elevation: String,
}

impl FormInput {
    pub fn running(distance: &str, duration: &str, cadence: &str) -> Self {
        Self {
            workout_type: Some(WorkoutType::Running),
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: cadence.to_string(),
            elevation: String::new(),
        }
    }

    pub fn cycling(distance: &str, duration: &str, elevation: &str) -> Self {
        Self {
            workout_type: Some(WorkoutType::Cycling),
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: String::new(),
            elevation: elevation.to_string(),
        }
    }
}

/// Blank is zero; anything `f64::from_str` rejects is NaN. Hex literals
/// are not accepted, and words like `inf` parse as non-finite values that
/// validation rejects.
fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum NotificationLevel {
    /// Blocking message the user must acknowledge
    Alert,
    /// Non-fatal condition; the session carries on
    Warning,
}

/// User-visible message queued by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Summary of the session for the UI.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub pending_location: Option<[f64; 2]>,
    pub form_open: bool,
    pub form_displayed: bool,
    pub workout_type: WorkoutType,
    pub visible_field: FormField,
    pub focus: Option<FormField>,
    pub workout_count: usize,
}

/// The session controller.
pub struct Tracker {
    config: Config,
    repository: WorkoutRepository,
    clock: Box<dyn Clock>,
    state: SessionState,
    /// Oldest first, as saved
    workouts: Vec<Workout>,
    /// Newest first, as displayed
    list_items: Vec<ListItem>,
    map: Option<Box<dyn MapSurface>>,
    /// Leading workouts that already have a marker
    marked: usize,
    pending: Option<Coordinates>,
    form: FormView,
    notifications: Vec<Notification>,
}

impl Tracker {
    pub fn new(config: Config, store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            repository: WorkoutRepository::new(store),
            clock,
            state: SessionState::Bootstrapping,
            workouts: Vec::new(),
            list_items: Vec::new(),
            map: None,
            marked: 0,
            pending: None,
            form: FormView::default(),
            notifications: Vec::new(),
        }
    }

    // ─── Bootstrap ───────────────────────────────────────────────

    /// Load saved workouts into memory and the list.
    ///
    /// Unreadable storage is reported as a warning and the session starts
    /// empty. Records that fail validation are skipped and counted in a
    /// warning. Returns the number of workouts restored.
    pub fn restore(&mut self) -> usize {
        let workouts = match self.repository.load_with_report() {
            Ok(loaded) => {
                if loaded.skipped > 0 {
                    self.notify(
                        NotificationLevel::Warning,
                        format!("{} saved workout(s) could not be restored", loaded.skipped),
                    );
                }
                loaded.workouts
            }
            Err(e) => {
                tracing::warn!(error = %e, "Starting without saved workouts");
                self.notify(NotificationLevel::Warning, e.to_string());
                Vec::new()
            }
        };

        // Each item goes in front of the previous one: newest first.
        self.list_items = workouts.iter().rev().map(render::list_item).collect();
        self.workouts = workouts;
        tracing::info!(count = self.workouts.len(), "Restored workouts");
        self.workouts.len()
    }

    pub fn begin_locating(&mut self) {
        self.state = SessionState::AwaitingLocation;
    }

    /// Handle the outcome of the position lookup.
    ///
    /// On failure the user is alerted and the session continues without a
    /// map; there is no retry.
    pub fn on_location(
        &mut self,
        position: Result<Coordinates>,
        maps: &dyn MapProvider,
    ) -> Result<()> {
        match position {
            Ok(position) => {
                self.load_map(position, maps);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Position unavailable, continuing without map");
                self.notify(NotificationLevel::Alert, e.to_string());
                self.state = SessionState::LocationUnavailable;
                Err(e)
            }
        }
    }

    /// Acquire the position (with the configured timeout) and load the map.
    pub async fn locate(
        &mut self,
        provider: &dyn GeolocationProvider,
        maps: &dyn MapProvider,
    ) -> Result<()> {
        self.begin_locating();
        let position = geolocation::acquire(provider, self.config.geolocation_timeout).await;
        self.on_location(position, maps)
    }

    /// Create the map centered on `position` and replay saved workouts.
    ///
    /// Calling this again keeps the existing map and only places markers
    /// for workouts that do not have one yet.
    pub fn load_map(&mut self, position: Coordinates, maps: &dyn MapProvider) {
        if self.map.is_none() {
            let mut map = maps.create_map(position, self.config.map_zoom);
            map.add_tile_layer(TileLayer {
                url_template: self.config.tile_url.clone(),
                attribution: self.config.tile_attribution.clone(),
            });
            map.add_marker(Marker {
                position,
                popup: Popup::simple("You are here"),
                workout_id: None,
            });
            tracing::info!(
                lat = position.lat,
                lng = position.lng,
                zoom = self.config.map_zoom,
                "Map loaded"
            );
            self.map = Some(map);
        }

        if self.state != SessionState::FormOpen {
            self.state = SessionState::MapReady;
        }

        let replayed = self.replay_markers().unwrap_or(0);
        tracing::debug!(replayed, "Replayed saved workouts");
    }

    /// Place a marker for every workout that lacks one.
    ///
    /// Returns the number of markers added.
    pub fn replay_markers(&mut self) -> Result<usize> {
        let map = self.map.as_deref_mut().ok_or(AppError::MapUnavailable)?;
        let pending = &self.workouts[self.marked..];
        for workout in pending {
            place_marker(map, workout);
        }
        self.marked = self.workouts.len();
        Ok(pending.len())
    }

    // ─── Interaction ─────────────────────────────────────────────

    /// Open the entry form at the clicked position.
    ///
    /// Overwrites any earlier pending position.
    pub fn handle_map_click(&mut self, position: Coordinates) -> Result<()> {
        match self.state {
            SessionState::MapReady | SessionState::FormOpen => {}
            _ => return Err(AppError::MapUnavailable),
        }
        let position = position.validate()?;

        self.pending = Some(position);
        self.form.open = true;
        self.form.focus = Some(FormField::Distance);
        self.state = SessionState::FormOpen;
        tracing::debug!(lat = position.lat, lng = position.lng, "Entry form opened");
        Ok(())
    }

    /// Flip the type selector. Presentation only.
    pub fn toggle_workout_type(&mut self) -> WorkoutType {
        self.form.workout_type = self.form.workout_type.toggled();
        self.form.workout_type
    }

    /// Validate the form and record a new workout at the pending position.
    ///
    /// Invalid input alerts the user and leaves the form open with the
    /// pending position intact. A failed save is a warning only; the
    /// workout stays in memory.
    pub fn submit(&mut self, input: &FormInput) -> Result<&Workout> {
        let position = match (self.state, self.pending) {
            (SessionState::FormOpen, Some(position)) => position,
            _ => return Err(AppError::NoPendingLocation),
        };

        let workout = match self.build_workout(input, position) {
            Ok(workout) => workout,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected form input");
                self.notify(NotificationLevel::Alert, e.to_string());
                return Err(e);
            }
        };

        self.list_items.insert(0, render::list_item(&workout));
        tracing::info!(
            id = workout.id(),
            workout_type = %workout.workout_type(),
            distance = workout.distance(),
            duration = workout.duration(),
            "Workout recorded"
        );
        self.workouts.push(workout);
        // Places the new workout's marker
        if let Err(e) = self.replay_markers() {
            tracing::debug!(error = %e, "No map for the new workout's marker");
        }

        self.pending = None;
        self.reset_form();
        self.state = SessionState::MapReady;

        if let Err(e) = self.repository.save(&self.workouts) {
            tracing::warn!(error = %e, "Workout kept in memory but not saved");
            self.notify(
                NotificationLevel::Warning,
                format!("Workout recorded but not saved: {}", e),
            );
        }

        self.workouts
            .last()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("workout missing after insert")))
    }

    fn build_workout(&self, input: &FormInput, position: Coordinates) -> Result<Workout> {
        let distance = parse_number(&input.distance);
        let duration = parse_number(&input.duration);
        let now = self.clock.now();

        match input.workout_type.unwrap_or(self.form.workout_type) {
            WorkoutType::Running => Workout::running(
                position,
                distance,
                duration,
                parse_number(&input.cadence),
                now,
            ),
            WorkoutType::Cycling => Workout::cycling(
                position,
                distance,
                duration,
                parse_number(&input.elevation),
                now,
            ),
        }
    }

    /// Close and hide the form, then show it again after the restore delay.
    fn reset_form(&mut self) {
        self.form.open = false;
        self.form.focus = None;
        self.form.workout_type = WorkoutType::Running;
        self.form.displayed.store(false, Ordering::SeqCst);

        let displayed = Arc::clone(&self.form.displayed);
        let delay = self.config.form_restore_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    displayed.store(true, Ordering::SeqCst);
                });
            }
            Err(_) => displayed.store(true, Ordering::SeqCst),
        }
    }

    fn notify(&mut self, level: NotificationLevel, message: String) {
        self.notifications.push(Notification { level, message });
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Workouts in creation order (oldest first).
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Rendered list, newest first.
    pub fn list_items(&self) -> &[ListItem] {
        &self.list_items
    }

    pub fn pending_location(&self) -> Option<Coordinates> {
        self.pending
    }

    pub fn form(&self) -> &FormView {
        &self.form
    }

    pub fn map(&self) -> Option<&dyn MapSurface> {
        self.map.as_deref()
    }

    pub fn repository(&self) -> &WorkoutRepository {
        &self.repository
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            pending_location: self.pending.map(Into::into),
            form_open: self.form.open,
            form_displayed: self.form.is_displayed(),
            workout_type: self.form.workout_type,
            visible_field: self.form.visible_field(),
            focus: self.form.focus,
            workout_count: self.workouts.len(),
        }
    }
}

fn place_marker(map: &mut dyn MapSurface, workout: &Workout) {
    map.add_marker(Marker {
        position: workout.coords(),
        popup: Popup::workout(render::popup_content(workout), render::popup_class(workout)),
        workout_id: Some(workout.id().to_string()),
    });
}
