// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map surface abstraction and a GeoJSON-backed implementation.
//!
//! The tracker only needs to create a map at a center/zoom, add a tile
//! layer, and place markers with popups. [`GeoJsonMap`] records those calls
//! and exposes the result as a `FeatureCollection` that a browser map
//! library can draw.

use crate::models::Coordinates;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;

/// Marker handle returned by [`MapSurface::add_marker`].
pub type MarkerId = usize;

/// Tile source for the base map.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

/// Popup bound to a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub content: String,
    pub class_name: Option<String>,
    pub max_width: u32,
    pub min_width: u32,
    /// Keep open when another popup opens
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl Popup {
    /// Plain popup with default sizing that closes normally.
    pub fn simple(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            class_name: None,
            max_width: 300,
            min_width: 50,
            auto_close: true,
            close_on_click: true,
        }
    }

    /// Sticky popup used for workout markers.
    pub fn workout(content: String, class_name: String) -> Self {
        Self {
            content,
            class_name: Some(class_name),
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
        }
    }
}

/// A marker placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub popup: Popup,
    /// Set for workout markers; `None` for the user's own position
    pub workout_id: Option<String>,
}

/// A map view bound to a center and zoom level.
pub trait MapSurface: Send {
    fn center(&self) -> Coordinates;
    fn zoom(&self) -> u8;
    fn add_tile_layer(&mut self, layer: TileLayer);
    fn add_marker(&mut self, marker: Marker) -> MarkerId;
    fn markers(&self) -> &[Marker];
    /// Current view, tile layer and markers as GeoJSON.
    fn to_geojson(&self) -> FeatureCollection;
}

/// Creates map surfaces.
pub trait MapProvider: Send + Sync {
    fn create_map(&self, center: Coordinates, zoom: u8) -> Box<dyn MapSurface>;
}

/// Map surface that keeps its state in memory for GeoJSON export.
#[derive(Debug, Clone)]
pub struct GeoJsonMap {
    center: Coordinates,
    zoom: u8,
    tile_layers: Vec<TileLayer>,
    markers: Vec<Marker>,
}

impl GeoJsonMap {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            tile_layers: Vec::new(),
            markers: Vec::new(),
        }
    }
}

impl MapSurface for GeoJsonMap {
    fn center(&self) -> Coordinates {
        self.center
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn add_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layers.push(layer);
    }

    fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .markers
            .iter()
            .enumerate()
            .map(|(id, marker)| marker_feature(id, marker))
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "center".to_string(),
            json!([self.center.lat, self.center.lng]),
        );
        foreign_members.insert("zoom".to_string(), json!(self.zoom));
        foreign_members.insert(
            "tileLayers".to_string(),
            self.tile_layers
                .iter()
                .map(|t| json!({ "url": t.url_template, "attribution": t.attribution }))
                .collect(),
        );

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }
}

fn marker_feature(id: MarkerId, marker: &Marker) -> Feature {
    let point = marker.position.to_point();
    let mut properties = JsonObject::new();
    properties.insert("popup".to_string(), json!(marker.popup.content));
    properties.insert("className".to_string(), json!(marker.popup.class_name));
    properties.insert("maxWidth".to_string(), json!(marker.popup.max_width));
    properties.insert("minWidth".to_string(), json!(marker.popup.min_width));
    properties.insert("autoClose".to_string(), json!(marker.popup.auto_close));
    properties.insert(
        "closeOnClick".to_string(),
        json!(marker.popup.close_on_click),
    );
    properties.insert("workoutId".to_string(), json!(marker.workout_id));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&point))),
        id: Some(geojson::feature::Id::Number(id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Provider for [`GeoJsonMap`] surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonMapProvider;

impl MapProvider for GeoJsonMapProvider {
    fn create_map(&self, center: Coordinates, zoom: u8) -> Box<dyn MapSurface> {
        tracing::debug!(lat = center.lat, lng = center.lng, zoom, "Creating map");
        Box::new(GeoJsonMap::new(center, zoom))
    }
}
