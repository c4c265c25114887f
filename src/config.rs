// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first if present.

use crate::models::Coordinates;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default OpenStreetMap tile template.
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Directory holding the saved workouts
    pub data_dir: PathBuf,

    // --- Map ---
    /// Zoom level of the initial map view
    pub map_zoom: u8,
    pub tile_url: String,
    pub tile_attribution: String,

    // --- Geolocation ---
    /// How long to wait for a position before giving up
    pub geolocation_timeout: Duration,
    /// IP geolocation endpoint used when no home position is set
    pub geolocation_url: String,
    /// Fixed position that skips the network lookup
    pub home_position: Option<Coordinates>,

    // --- Form ---
    /// Delay before the entry form is shown again after a submit
    pub form_restore_delay: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            data_dir: PathBuf::from("data"),
            map_zoom: 13,
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            geolocation_timeout: Duration::from_millis(10_000),
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            home_position: None,
            form_restore_delay: Duration::from_millis(1_000),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            map_zoom: parse_var("MAP_ZOOM")?.unwrap_or(defaults.map_zoom),
            tile_url: env::var("TILE_URL").unwrap_or(defaults.tile_url),
            tile_attribution: env::var("TILE_ATTRIBUTION").unwrap_or(defaults.tile_attribution),
            geolocation_timeout: parse_var("GEOLOCATION_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.geolocation_timeout),
            geolocation_url: env::var("GEOLOCATION_URL").unwrap_or(defaults.geolocation_url),
            home_position: home_position()?,
            form_restore_delay: parse_var("FORM_RESTORE_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.form_restore_delay),
        })
    }
}

/// Parse an optional variable; present but unparsable is an error.
fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid(name, e.to_string())),
        Err(_) => Ok(None),
    }
}

/// `HOME_LAT` and `HOME_LNG` must be set together.
fn home_position() -> Result<Option<Coordinates>, ConfigError> {
    match (parse_var::<f64>("HOME_LAT")?, parse_var::<f64>("HOME_LNG")?) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
            .validate()
            .map(Some)
            .map_err(|e| ConfigError::Invalid("HOME_LAT", e.to_string())),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::Missing("HOME_LNG")),
        (None, Some(_)) => Err(ConfigError::Missing("HOME_LAT")),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
