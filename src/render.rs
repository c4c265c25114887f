// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presentation of workouts as list items and marker popups.
//!
//! Pace and elevation gain are shown with one decimal; speed is shown as
//! computed. Distance and duration are shown as entered.

use crate::models::{Workout, WorkoutKind, WorkoutType};
use chrono::Datelike;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One value row of a list item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// A rendered entry in the workout list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListItem {
    pub id: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub title: String,
    pub details: Vec<Detail>,
}

fn icon(workout_type: WorkoutType) -> &'static str {
    match workout_type {
        WorkoutType::Running => "🏃‍♂️",
        WorkoutType::Cycling => "🚴‍♀️",
    }
}

/// "Running" / "Cycling"
pub fn type_label(workout_type: WorkoutType) -> String {
    let name = workout_type.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Month name and day of month, e.g. "April 14".
pub fn date_label(workout: &Workout) -> String {
    let date = workout.date();
    format!("{} {}", MONTHS[date.month0() as usize], date.day())
}

/// Title shared by list items and popups, e.g. "Running on April 14".
pub fn title(workout: &Workout) -> String {
    format!(
        "{} on {}",
        type_label(workout.workout_type()),
        date_label(workout)
    )
}

/// Marker popup content, e.g. "🏃‍♂️ Running on April 14".
pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", icon(workout.workout_type()), title(workout))
}

/// CSS class of the popup for this workout's type.
pub fn popup_class(workout: &Workout) -> String {
    format!("{}-popup", workout.workout_type())
}

/// One decimal, rounding exact ties up (2.25 -> "2.3").
///
/// `{:.1}` already rounds the exact binary value correctly; it only differs
/// on exact ties, where it picks the even digit.
fn to_fixed_1(value: f64) -> String {
    let scaled = value * 10.0;
    let exact = value.mul_add(10.0, -scaled) == 0.0;
    if exact && scaled.fract().abs() == 0.5 {
        format!("{:.1}", scaled.ceil() / 10.0)
    } else {
        format!("{value:.1}")
    }
}

/// Render a workout as a list item.
pub fn list_item(workout: &Workout) -> ListItem {
    let mut details = vec![
        Detail {
            icon: icon(workout.workout_type()),
            value: workout.distance().to_string(),
            unit: "km",
        },
        Detail {
            icon: "⏱",
            value: workout.duration().to_string(),
            unit: "min",
        },
    ];

    match *workout.kind() {
        WorkoutKind::Running { cadence, pace } => {
            details.push(Detail {
                icon: "⚡️",
                value: to_fixed_1(pace),
                unit: "min/km",
            });
            details.push(Detail {
                icon: "🦶🏼",
                value: cadence.to_string(),
                unit: "spm",
            });
        }
        WorkoutKind::Cycling {
            elevation_gain,
            speed,
        } => {
            // Speed is deliberately unrounded, unlike pace.
            details.push(Detail {
                icon: "⚡️",
                value: speed.to_string(),
                unit: "km/h",
            });
            details.push(Detail {
                icon: "⛰",
                value: to_fixed_1(elevation_gain),
                unit: "m",
            });
        }
    }

    ListItem {
        id: workout.id().to_string(),
        workout_type: workout.workout_type(),
        title: title(workout),
        details,
    }
}
