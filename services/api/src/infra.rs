use async_trait::async_trait;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use realty_desk::backend::TransportError;
use realty_desk::workflows::map::{
    BoundedQuery, FeatureCollection, Geometry, LatLng, MapDataGateway, RawFeature,
    CLUSTER_ZOOM_THRESHOLD,
};
use realty_desk::workflows::moderation::{
    Notification, NotificationLevel, Notifier, Property, PropertyGateway, PropertyId,
    PropertyUpdate, UpdatePayload,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) map_api_key: Option<String>,
}

/// Forwards moderation toasts to the service log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(
                property = %notification.property_id,
                message = %notification.message,
                "notification"
            ),
            NotificationLevel::Error => warn!(
                property = %notification.property_id,
                message = %notification.message,
                "notification"
            ),
        }
    }
}

/// Backend stand-in used by the CLI demo: keeps listings in memory and records every update.
#[derive(Default, Clone)]
pub(crate) struct InMemoryGateway {
    listings: Arc<Mutex<BTreeMap<PropertyId, Property>>>,
    payloads: Arc<Mutex<Vec<(PropertyId, UpdatePayload)>>>,
    views: Arc<Mutex<Vec<PropertyId>>>,
}

impl InMemoryGateway {
    pub(crate) fn with_listings(listings: impl IntoIterator<Item = Property>) -> Self {
        let gateway = Self::default();
        {
            let mut guard = gateway.listings.lock().expect("gateway mutex poisoned");
            for listing in listings {
                guard.insert(listing.id.clone(), listing);
            }
        }
        gateway
    }

    pub(crate) fn payloads(&self) -> Vec<(PropertyId, UpdatePayload)> {
        self.payloads.lock().expect("gateway mutex poisoned").clone()
    }

    pub(crate) fn views(&self) -> Vec<PropertyId> {
        self.views.lock().expect("gateway mutex poisoned").clone()
    }

    fn not_found(id: &PropertyId) -> TransportError {
        TransportError::not_found(format!("property {id} not found"))
    }
}

#[async_trait]
impl PropertyGateway for InMemoryGateway {
    async fn property(&self, id: &PropertyId) -> Result<Property, TransportError> {
        self.listings
            .lock()
            .expect("gateway mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update_moderation(
        &self,
        id: &PropertyId,
        payload: &UpdatePayload,
    ) -> Result<PropertyUpdate, TransportError> {
        let update = payload.to_property_update();
        {
            let mut listings = self.listings.lock().expect("gateway mutex poisoned");
            let listing = listings.get_mut(id).ok_or_else(|| Self::not_found(id))?;
            *listing = listing.merged(&update);
        }
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .push((id.clone(), payload.clone()));
        Ok(update)
    }

    async fn similar(&self, id: &PropertyId) -> Result<Vec<Property>, TransportError> {
        let listings = self.listings.lock().expect("gateway mutex poisoned");
        let Some(reference) = listings.get(id) else {
            return Err(Self::not_found(id));
        };
        Ok(listings
            .values()
            .filter(|listing| listing.id != *id && listing.offer_type == reference.offer_type)
            .cloned()
            .collect())
    }

    async fn record_view(&self, id: &PropertyId) -> Result<(), TransportError> {
        self.views
            .lock()
            .expect("gateway mutex poisoned")
            .push(id.clone());
        Ok(())
    }
}

#[async_trait]
impl MapDataGateway for InMemoryGateway {
    /// Single cluster at low zoom, one point per located listing above it.
    async fn fetch_features(
        &self,
        query: &BoundedQuery,
    ) -> Result<FeatureCollection, TransportError> {
        let listings = self.listings.lock().expect("gateway mutex poisoned");
        let located: Vec<(LatLng, &Property)> = listings
            .values()
            .filter_map(|listing| {
                let coord = LatLng::new(listing.latitude?, listing.longitude?);
                query.bounds.contains(coord).then_some((coord, listing))
            })
            .collect();

        if located.is_empty() {
            return Ok(FeatureCollection::default());
        }

        let features = if query.zoom <= CLUSTER_ZOOM_THRESHOLD {
            let count = located.len() as f64;
            let center = LatLng::new(
                located.iter().map(|(coord, _)| coord.lat).sum::<f64>() / count,
                located.iter().map(|(coord, _)| coord.lng).sum::<f64>() / count,
            );
            vec![RawFeature {
                geometry: Some(Geometry::point(center)),
                properties: object(json!({ "cluster": true, "point_count": located.len() })),
            }]
        } else {
            located
                .into_iter()
                .map(|(coord, listing)| RawFeature {
                    geometry: Some(Geometry::point(coord)),
                    properties: object(json!({ "id": listing.id, "title": listing.title })),
                })
                .collect()
        };

        Ok(FeatureCollection { features })
    }

    async fn fetch_property(&self, property_id: &PropertyId) -> Result<Property, TransportError> {
        PropertyGateway::property(self, property_id).await
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
