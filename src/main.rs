// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout-Mapper Server
//!
//! Restores saved workouts, looks up the user's position in the
//! background, and serves the tracker API to the browser page.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_mapper::{
    config::Config,
    controller::Tracker,
    geolocation::{self, FixedLocation, GeolocationProvider, IpGeolocation},
    map::GeoJsonMapProvider,
    storage::FileStore,
    time_utils::SystemClock,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Workout-Mapper");

    // Open storage and restore saved workouts
    let store = FileStore::open(&config.data_dir)?;
    let mut tracker = Tracker::new(config.clone(), Box::new(store), Box::new(SystemClock));
    tracker.restore();
    tracker.begin_locating();

    let state = Arc::new(AppState {
        config: config.clone(),
        tracker: Mutex::new(tracker),
    });

    // Position lookup runs once in the background; the API is usable meanwhile
    let provider: Box<dyn GeolocationProvider> = match config.home_position {
        Some(home) => {
            tracing::info!(lat = home.lat, lng = home.lng, "Using configured home position");
            Box::new(FixedLocation(home))
        }
        None => Box::new(IpGeolocation::new(config.geolocation_url.clone())),
    };
    let locate_state = state.clone();
    let timeout = config.geolocation_timeout;
    tokio::spawn(async move {
        let position = geolocation::acquire(provider.as_ref(), timeout).await;
        let mut tracker = locate_state.tracker.lock().await;
        // The tracker raises the user-facing notification itself
        if let Err(e) = tracker.on_location(position, &GeoJsonMapProvider) {
            tracing::debug!(error = %e, "Location lookup did not produce a map");
        }
    });

    // Build router
    let app = workout_mapper::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workout_mapper=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
