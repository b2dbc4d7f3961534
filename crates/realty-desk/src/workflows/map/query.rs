use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::geo::{Bounds, ViewportState};

/// Listing filters the map endpoint understands; everything else on the page URL is ignored.
pub const FILTER_KEYS: [&str; 16] = [
    "price_min",
    "price_max",
    "city",
    "district",
    "repair_type",
    "property_type",
    "rooms_min",
    "rooms_max",
    "area_min",
    "area_max",
    "floor_min",
    "floor_max",
    "listing_type",
    "offer_type",
    "landmark",
    "is_full_apartment",
];

/// Active listing filters, reduced to allow-listed keys with non-blank values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapFilters(BTreeMap<String, String>);

impl MapFilters {
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filters = params
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.as_ref();
                let value = value.as_ref().trim();
                (FILTER_KEYS.contains(&key) && !value.is_empty())
                    .then(|| (key.to_string(), value.to_string()))
            })
            .collect();
        Self(filters)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Request for the features inside the visible map area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundedQuery {
    pub bounds: Bounds,
    pub zoom: u8,
    pub filters: MapFilters,
}

impl BoundedQuery {
    /// Query-string pairs: bounds and zoom first, then filters in key order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("north".to_string(), self.bounds.north.to_string()),
            ("south".to_string(), self.bounds.south.to_string()),
            ("east".to_string(), self.bounds.east.to_string()),
            ("west".to_string(), self.bounds.west.to_string()),
            ("zoom".to_string(), self.zoom.to_string()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        pairs
    }
}

pub fn derive_map_query<I, K, V>(params: I, viewport: &ViewportState) -> BoundedQuery
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    BoundedQuery {
        bounds: viewport.bounds,
        zoom: viewport.zoom,
        filters: MapFilters::from_params(params),
    }
}
