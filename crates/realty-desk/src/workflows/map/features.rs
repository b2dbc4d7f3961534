use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tracing::warn;

use super::geo::LatLng;
use crate::workflows::moderation::PropertyId;

/// Highest zoom at which server clusters are drawn; individual points take over above it.
pub const CLUSTER_ZOOM_THRESHOLD: u8 = 11;
const CLUSTER_EXPAND_STEP: u8 = 2;
const CLUSTER_EXPAND_MIN_ZOOM: u8 = 12;
const CLUSTER_EXPAND_MAX_ZOOM: u8 = 14;

/// GeoJSON feature collection returned by the map endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

impl FeatureCollection {
    /// Typed features; entries without a usable point are skipped one by one.
    pub fn classified(&self) -> Vec<MapFeature> {
        self.features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let classified = classify_feature(feature);
                if classified.is_none() {
                    warn!(
                        index,
                        geometry = ?feature.geometry,
                        "map feature without a usable coordinate skipped"
                    );
                }
                classified
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Some backend versions name this object `property`.
    #[serde(default, alias = "property")]
    pub properties: Map<String, Value>,
}

/// GeoJSON point geometry, `[longitude, latitude, altitude?]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Geometry {
    pub fn point(coord: LatLng) -> Self {
        Self {
            coordinates: vec![coord.lng, coord.lat],
        }
    }

    /// Extra positions such as altitude are ignored.
    pub fn lat_lng(&self) -> Option<LatLng> {
        match self.coordinates.as_slice() {
            [lng, lat, ..] => Some(LatLng::new(*lat, *lng)).filter(LatLng::is_valid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapFeature {
    Cluster(ClusterFeature),
    Point(PointFeature),
}

impl MapFeature {
    pub fn coordinates(&self) -> LatLng {
        match self {
            MapFeature::Cluster(cluster) => cluster.coordinates,
            MapFeature::Point(point) => point.coordinates,
        }
    }

    pub fn is_visible_at(&self, zoom: u8) -> bool {
        match self {
            MapFeature::Cluster(_) => zoom <= CLUSTER_ZOOM_THRESHOLD,
            MapFeature::Point(_) => zoom > CLUSTER_ZOOM_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterFeature {
    pub coordinates: LatLng,
    pub point_count: u64,
}

impl ClusterFeature {
    /// Camera move performed when the cluster is clicked.
    pub fn expand(&self, current_zoom: u8) -> CameraTarget {
        CameraTarget {
            center: self.coordinates,
            zoom: cluster_zoom_target(current_zoom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFeature {
    pub coordinates: LatLng,
    pub property_id: Option<PropertyId>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTarget {
    pub center: LatLng,
    pub zoom: u8,
}

pub fn cluster_zoom_target(current_zoom: u8) -> u8 {
    current_zoom
        .saturating_add(CLUSTER_EXPAND_STEP)
        .clamp(CLUSTER_EXPAND_MIN_ZOOM, CLUSTER_EXPAND_MAX_ZOOM)
}

/// A feature is a cluster exactly when its attributes carry a `cluster` key. Features that
/// cannot be placed on the map yield `None`.
pub fn classify_feature(feature: &RawFeature) -> Option<MapFeature> {
    let coordinates = feature.geometry.as_ref()?.lat_lng()?;
    let attributes = &feature.properties;

    if attributes.contains_key("cluster") {
        let point_count = attributes
            .get("point_count")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        return Some(MapFeature::Cluster(ClusterFeature {
            coordinates,
            point_count,
        }));
    }

    let property_id = attributes
        .get("id")
        .or_else(|| attributes.get("property_id"))
        .and_then(id_from_value);
    let title = attributes
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(MapFeature::Point(PointFeature {
        coordinates,
        property_id,
        title,
    }))
}

fn id_from_value(value: &Value) -> Option<PropertyId> {
    match value {
        Value::String(id) if !id.is_empty() => Some(PropertyId(id.clone())),
        Value::Number(id) => Some(PropertyId(id.to_string())),
        _ => None,
    }
}
