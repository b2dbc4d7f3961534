use serde::Serialize;

use super::geo::LatLng;
use crate::workflows::moderation::{Property, PropertyId};

/// A listing placed on the client-clustered map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub property_id: PropertyId,
    pub coordinates: LatLng,
}

/// Listings with both coordinates present and in range; the rest cannot be drawn.
pub fn map_points(properties: &[Property]) -> Vec<MapPoint> {
    properties
        .iter()
        .filter_map(|property| {
            let coordinates = LatLng::new(property.latitude?, property.longitude?);
            coordinates.is_valid().then(|| MapPoint {
                property_id: property.id.clone(),
                coordinates,
            })
        })
        .collect()
}
