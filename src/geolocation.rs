// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot position lookup.
//!
//! A lookup either completes once or fails; there is no cancellation.
//! [`acquire`] enforces the timeout around any provider.

use crate::error::{AppError, Result};
use crate::models::Coordinates;
use serde::Deserialize;
use std::time::Duration;

/// Source of the user's current position.
#[async_trait::async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Ask `provider` for a position, failing with `GeolocationTimeout` after `timeout`.
pub async fn acquire(provider: &dyn GeolocationProvider, timeout: Duration) -> Result<Coordinates> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(position)) => position.validate().map_err(|_| {
            AppError::GeolocationDenied(format!(
                "provider returned an invalid position [{}, {}]",
                position.lat, position.lng
            ))
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Geolocation timed out");
            Err(AppError::GeolocationTimeout)
        }
    }
}

/// Always reports the same position (configured home location).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait::async_trait]
impl GeolocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// Approximate position from an IP geolocation HTTP endpoint.
///
/// Expects an ip-api.com style response:
/// `{"status": "success", "lat": 51.5, "lon": -0.1}`.
#[derive(Clone)]
pub struct IpGeolocation {
    http_client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl GeolocationProvider for IpGeolocation {
    async fn current_position(&self) -> Result<Coordinates> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::GeolocationDenied(format!("lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::GeolocationDenied(format!(
                "lookup returned HTTP {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeolocationDenied(format!("unreadable lookup: {}", e)))?;

        if body.status.as_deref().is_some_and(|s| s != "success") {
            return Err(AppError::GeolocationDenied(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::debug!(lat, lon, "IP geolocation resolved");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(AppError::GeolocationDenied(
                "lookup response has no coordinates".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverResponds;

    #[async_trait::async_trait]
    impl GeolocationProvider for NeverResponds {
        async fn current_position(&self) -> Result<Coordinates> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let here = Coordinates::new(37.4, -122.1);
        let pos = acquire(&FixedLocation(here), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(pos, here);
    }

    #[tokio::test]
    async fn test_timeout() {
        let result = acquire(&NeverResponds, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(AppError::GeolocationTimeout)));
    }

    #[tokio::test]
    async fn test_invalid_position_rejected() {
        let result = acquire(
            &FixedLocation(Coordinates::new(200.0, 0.0)),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(AppError::GeolocationDenied(_))));
    }
}
