// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes driving the tracker session.

use crate::controller::{FormInput, Notification, SessionSnapshot};
use crate::error::{AppError, Result};
use crate::models::{Coordinates, WorkoutType};
use crate::render::ListItem;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/workouts", get(get_workouts).post(submit_workout))
        .route("/api/map", get(get_map))
        .route("/api/map/click", post(map_click))
        .route("/api/form/toggle", post(toggle_form_type))
        .route("/api/notifications", get(take_notifications))
}

// ─── Session ─────────────────────────────────────────────────

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.tracker.lock().await.snapshot())
}

// ─── Map ─────────────────────────────────────────────────────

/// Clicked map position.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapClickRequest {
    pub lat: f64,
    pub lng: f64,
}

/// Open the entry form at the clicked position.
async fn map_click(
    State(state): State<Arc<AppState>>,
    Json(click): Json<MapClickRequest>,
) -> Result<Json<SessionSnapshot>> {
    let mut tracker = state.tracker.lock().await;
    tracker.handle_map_click(Coordinates::new(click.lat, click.lng))?;
    Ok(Json(tracker.snapshot()))
}

/// Current map view and markers as a GeoJSON FeatureCollection.
async fn get_map(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let tracker = state.tracker.lock().await;
    let map = tracker.map().ok_or(AppError::MapUnavailable)?;
    let body = serde_json::to_value(map.to_geojson())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize map: {}", e)))?;
    Ok(Json(body))
}

// ─── Form ────────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleResponse {
    pub workout_type: WorkoutType,
}

async fn toggle_form_type(State(state): State<Arc<AppState>>) -> Json<ToggleResponse> {
    let workout_type = state.tracker.lock().await.toggle_workout_type();
    Json(ToggleResponse { workout_type })
}

// ─── Workouts ────────────────────────────────────────────────

/// Workout list, newest first.
async fn get_workouts(State(state): State<Arc<AppState>>) -> Json<Vec<ListItem>> {
    Json(state.tracker.lock().await.list_items().to_vec())
}

/// Submit the entry form.
async fn submit_workout(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FormInput>,
) -> Result<(StatusCode, Json<ListItem>)> {
    let mut tracker = state.tracker.lock().await;
    let workout = tracker.submit(&input)?;
    tracing::debug!(id = workout.id(), "Workout submitted via API");
    let item = crate::render::list_item(workout);
    Ok((StatusCode::CREATED, Json(item)))
}

// ─── Notifications ───────────────────────────────────────────

async fn take_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.tracker.lock().await.take_notifications())
}
