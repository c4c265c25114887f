// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout-Mapper: record runs and rides by dropping them on a map
//!
//! This crate provides the session controller, workout model and
//! persistence behind a map-based workout log, plus a small HTTP API
//! that a browser page drives.

pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod map;
pub mod models;
pub mod render;
pub mod routes;
pub mod storage;
pub mod time_utils;

use config::Config;
use controller::Tracker;
use tokio::sync::Mutex;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tracker: Mutex<Tracker>,
}
