// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout construction and derived metric tests.

use chrono::{TimeZone, Utc};
use workout_mapper::error::AppError;
use workout_mapper::models::{Coordinates, Workout, WorkoutKind, WorkoutType};

const SAMPLES: [f64; 7] = [0.1, 1.0, 2.5, 5.0, 12.3, 42.195, 180.0];

fn here() -> Coordinates {
    Coordinates::new(51.5, -0.1)
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 14, 9, 30, 0).unwrap()
}

#[test]
fn test_pace_is_duration_over_distance() {
    for distance in SAMPLES {
        for duration in SAMPLES {
            let w = Workout::running(here(), distance, duration, 170.0, now()).unwrap();
            match *w.kind() {
                WorkoutKind::Running { pace, cadence } => {
                    assert_eq!(pace, duration / distance);
                    assert_eq!(cadence, 170.0);
                }
                _ => panic!("expected a running workout"),
            }
        }
    }
}

#[test]
fn test_speed_is_distance_over_hours() {
    for distance in SAMPLES {
        for duration in SAMPLES {
            let w = Workout::cycling(here(), distance, duration, 250.0, now()).unwrap();
            assert_eq!(w.workout_type(), WorkoutType::Cycling);
            assert_eq!(w.derived_metric(), distance / (duration / 60.0));
        }
    }
}

#[test]
fn test_base_fields_kept() {
    let w = Workout::running(here(), 5.0, 30.0, 150.0, now()).unwrap();
    assert_eq!(w.coords(), here());
    assert_eq!(w.distance(), 5.0);
    assert_eq!(w.duration(), 30.0);
    assert_eq!(w.date(), now());
    assert_eq!(w.id(), now().timestamp_millis().to_string());
}

#[test]
fn test_rejects_bad_distance_and_duration() {
    let bad = [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
    for value in bad {
        assert!(matches!(
            Workout::running(here(), value, 30.0, 150.0, now()),
            Err(AppError::InvalidEntryInput(_))
        ));
        assert!(matches!(
            Workout::running(here(), 5.0, value, 150.0, now()),
            Err(AppError::InvalidEntryInput(_))
        ));
        assert!(matches!(
            Workout::cycling(here(), value, 60.0, 100.0, now()),
            Err(AppError::InvalidEntryInput(_))
        ));
        assert!(matches!(
            Workout::cycling(here(), 20.0, value, 100.0, now()),
            Err(AppError::InvalidEntryInput(_))
        ));
    }
}

#[test]
fn test_rejects_bad_cadence() {
    for cadence in [0.0, -150.0, f64::NAN, 150.5] {
        assert!(
            Workout::running(here(), 5.0, 30.0, cadence, now()).is_err(),
            "cadence {} should be rejected",
            cadence
        );
    }
}

#[test]
fn test_elevation_gain_non_negative() {
    assert!(Workout::cycling(here(), 20.0, 60.0, 0.0, now()).is_ok());
    assert!(Workout::cycling(here(), 20.0, 60.0, 0.5, now()).is_ok());
    assert!(Workout::cycling(here(), 20.0, 60.0, -0.5, now()).is_err());
    assert!(Workout::cycling(here(), 20.0, 60.0, f64::NAN, now()).is_err());
}
