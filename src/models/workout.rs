// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout entry model.
//!
//! A workout is recorded once, at form submission, and never mutated
//! afterwards. Derived metrics (pace for runs, speed for rides) are computed
//! at construction and stored alongside the base fields.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Geographic position as `[latitude, longitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject positions that cannot be placed on a map.
    pub fn validate(self) -> Result<Self, AppError> {
        let in_range = self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng);
        if in_range {
            Ok(self)
        } else {
            Err(AppError::InvalidEntryInput(format!(
                "coordinates out of range: [{}, {}]",
                self.lat, self.lng
            )))
        }
    }

    /// Convert to a `geo` point (x = longitude, y = latitude).
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

/// Discriminator for the two workout variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum WorkoutType {
    #[default]
    Running,
    Cycling,
}

impl WorkoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    /// The other variant; used by the form's type selector.
    pub fn toggled(self) -> Self {
        match self {
            WorkoutType::Running => WorkoutType::Cycling,
            WorkoutType::Cycling => WorkoutType::Running,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific fields, tagged by `type` in the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    Running {
        /// Steps per minute
        cadence: f64,
        /// Minutes per kilometer (derived)
        pace: f64,
    },
    Cycling {
        /// Meters climbed
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// Kilometers per hour (derived)
        speed: f64,
    },
}

impl WorkoutKind {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// A recorded exercise entry.
///
/// Serialized as `{id, date, coords: [lat, lng], distance, duration, type, ...}`
/// with `cadence`/`pace` for runs and `elevationGain`/`speed` for rides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: String,
    date: DateTime<Utc>,
    coords: Coordinates,
    /// Kilometers
    distance: f64,
    /// Minutes
    duration: f64,
    #[serde(flatten)]
    kind: WorkoutKind,
}

impl Workout {
    /// Create a running entry; pace is `duration / distance`.
    pub fn running(
        coords: Coordinates,
        distance: f64,
        duration: f64,
        cadence: f64,
        date: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        require_positive("distance", distance)?;
        require_positive("duration", duration)?;
        require_positive("cadence", cadence)?;
        if cadence.fract() != 0.0 {
            return Err(AppError::InvalidEntryInput(format!(
                "cadence must be a whole number, got {cadence}"
            )));
        }

        Ok(Self::build(
            coords,
            distance,
            duration,
            WorkoutKind::Running {
                cadence,
                pace: duration / distance,
            },
            date,
        ))
    }

    /// Create a cycling entry; speed is `distance / (duration / 60)`.
    pub fn cycling(
        coords: Coordinates,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
        date: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        require_positive("distance", distance)?;
        require_positive("duration", duration)?;
        if !elevation_gain.is_finite() || elevation_gain < 0.0 {
            return Err(AppError::InvalidEntryInput(format!(
                "elevation gain must be a non-negative number, got {elevation_gain}"
            )));
        }

        Ok(Self::build(
            coords,
            distance,
            duration,
            WorkoutKind::Cycling {
                elevation_gain,
                speed: distance / (duration / 60.0),
            },
            date,
        ))
    }

    fn build(
        coords: Coordinates,
        distance: f64,
        duration: f64,
        kind: WorkoutKind,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: date.timestamp_millis().to_string(),
            date,
            coords,
            distance,
            duration,
            kind,
        }
    }

    /// Rebuild a workout loaded from storage, recomputing the derived metric
    /// from the base fields. The stored id and date are kept.
    pub fn rederive(self) -> Result<Self, AppError> {
        let rebuilt = match self.kind {
            WorkoutKind::Running { cadence, .. } => {
                Self::running(self.coords, self.distance, self.duration, cadence, self.date)?
            }
            WorkoutKind::Cycling { elevation_gain, .. } => Self::cycling(
                self.coords,
                self.distance,
                self.duration,
                elevation_gain,
                self.date,
            )?,
        };

        let (stored, derived) = (self.derived_metric(), rebuilt.derived_metric());
        if stored != derived {
            tracing::warn!(
                id = %self.id,
                stored,
                derived,
                "Stored derived metric does not match base fields"
            );
        }

        Ok(Self {
            id: self.id,
            ..rebuilt
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    /// Pace (min/km) for runs, speed (km/h) for rides.
    pub fn derived_metric(&self) -> f64 {
        match self.kind {
            WorkoutKind::Running { pace, .. } => pace,
            WorkoutKind::Cycling { speed, .. } => speed,
        }
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidEntryInput(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}
