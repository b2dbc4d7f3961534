use tracing::{debug, error};

use super::features::{CameraTarget, ClusterFeature, FeatureCollection, MapFeature, PointFeature};
use super::gateway::MapDataGateway;
use super::geo::{project_to_screen, LatLng, MapView, ScreenPosition, ViewportState, CARD_OFFSET};
use super::points::MapPoint;
use super::query::{BoundedQuery, MapFilters};
use super::strategy::{select_render_strategy, RenderStrategy};
use crate::workflows::moderation::{Property, PropertyId};

/// A feature request issued for one (bounds, zoom, filters) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket {
    pub sequence: u64,
    pub query: BoundedQuery,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    /// Server-side point; details arrive from a separate fetch.
    Feature {
        property_id: PropertyId,
        coordinates: LatLng,
        details: Option<Property>,
    },
    /// Point from the preloaded, client-clustered list.
    Client(MapPoint),
}

impl Selection {
    pub fn coordinates(&self) -> Option<LatLng> {
        match self {
            Selection::None => None,
            Selection::Feature { coordinates, .. } => Some(*coordinates),
            Selection::Client(point) => Some(point.coordinates),
        }
    }

    pub fn property_id(&self) -> Option<&PropertyId> {
        match self {
            Selection::None => None,
            Selection::Feature { property_id, .. } => Some(property_id),
            Selection::Client(point) => Some(&point.property_id),
        }
    }
}

/// Keeps map features in step with the visible area and active filters.
///
/// Every change of bounds, zoom or filters issues a new ticket; only the response to the most
/// recent ticket is applied, so a slow reply for an old viewport never overwrites a newer one.
#[derive(Debug, Default)]
pub struct MapViewportSync {
    viewport: Option<ViewportState>,
    filters: MapFilters,
    issued: u64,
    applied: Option<u64>,
    features: Vec<MapFeature>,
    selection: Selection,
}

impl MapViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: MapFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Option<&ViewportState> {
        self.viewport.as_ref()
    }

    pub fn filters(&self) -> &MapFilters {
        &self.filters
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn update_viewport(&mut self, state: ViewportState) -> Option<QueryTicket> {
        if self.viewport.as_ref() == Some(&state) {
            return None;
        }
        self.viewport = Some(state);
        self.issue()
    }

    /// Filters are remembered even before the first viewport; no ticket is issued until one exists.
    pub fn set_filters(&mut self, filters: MapFilters) -> Option<QueryTicket> {
        if self.filters == filters {
            return None;
        }
        self.filters = filters;
        self.issue()
    }

    fn issue(&mut self) -> Option<QueryTicket> {
        let viewport = self.viewport?;
        self.issued += 1;

        let query = BoundedQuery {
            bounds: viewport.bounds,
            zoom: viewport.zoom,
            filters: self.filters.clone(),
        };
        debug!(sequence = self.issued, zoom = viewport.zoom, "map query issued");

        Some(QueryTicket {
            sequence: self.issued,
            query,
        })
    }

    /// Applies a response when it answers the latest ticket; stale responses are dropped.
    pub fn apply_response(&mut self, ticket: &QueryTicket, collection: FeatureCollection) -> bool {
        if ticket.sequence != self.issued {
            debug!(
                sequence = ticket.sequence,
                latest = self.issued,
                "stale map response discarded"
            );
            return false;
        }

        self.features = collection.classified();
        self.applied = Some(ticket.sequence);
        true
    }

    pub fn is_current(&self) -> bool {
        self.applied == Some(self.issued)
    }

    pub fn visible_features(&self) -> Vec<&MapFeature> {
        let Some(viewport) = self.viewport else {
            return Vec::new();
        };
        self.features
            .iter()
            .filter(|feature| feature.is_visible_at(viewport.zoom))
            .collect()
    }

    pub fn click_cluster(&self, cluster: &ClusterFeature) -> CameraTarget {
        let zoom = self.viewport.map(|viewport| viewport.zoom).unwrap_or_default();
        cluster.expand(zoom)
    }

    /// Selects a server point and returns the listing whose details should be fetched.
    ///
    /// A point without a listing id cannot show a card, so clicking it only clears the current
    /// selection.
    pub fn click_point(&mut self, point: &PointFeature) -> Option<PropertyId> {
        let Some(property_id) = point.property_id.clone() else {
            self.selection = Selection::None;
            return None;
        };
        self.selection = Selection::Feature {
            property_id: property_id.clone(),
            coordinates: point.coordinates,
            details: None,
        };
        Some(property_id)
    }

    pub fn select_client_point(&mut self, point: MapPoint) {
        self.selection = Selection::Client(point);
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Stores fetched details if they still belong to the selected point.
    pub fn attach_details(&mut self, property: Property) -> bool {
        match &mut self.selection {
            Selection::Feature {
                property_id,
                details,
                ..
            } if *property_id == property.id => {
                *details = Some(property);
                true
            }
            _ => false,
        }
    }

    pub fn render_strategy(&self, points: &[MapPoint]) -> RenderStrategy {
        select_render_strategy(points.len())
    }

    /// Page position of the selected listing's card; recomputed by callers after selection,
    /// resize and viewport changes.
    pub fn anchor(&self, map: Option<&MapView>) -> Option<ScreenPosition> {
        project_to_screen(map, self.selection.coordinates(), CARD_OFFSET)
    }

    /// Runs a ticket through the gateway. Failures keep the previous features.
    pub async fn refresh<G>(&mut self, gateway: &G, ticket: &QueryTicket) -> bool
    where
        G: MapDataGateway + ?Sized,
    {
        match gateway.fetch_features(&ticket.query).await {
            Ok(collection) => self.apply_response(ticket, collection),
            Err(err) => {
                error!(sequence = ticket.sequence, error = %err, "map features unavailable");
                false
            }
        }
    }

    /// Loads details for the selected server point, if any.
    pub async fn load_selected<G>(&mut self, gateway: &G) -> Option<&Property>
    where
        G: MapDataGateway + ?Sized,
    {
        let property_id = match &self.selection {
            Selection::Feature { property_id, .. } => property_id.clone(),
            _ => return None,
        };

        match gateway.fetch_property(&property_id).await {
            Ok(property) => {
                self.attach_details(property);
            }
            Err(err) => {
                error!(property = %property_id, error = %err, "listing details unavailable");
            }
        }

        match &self.selection {
            Selection::Feature { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::map::features::{Geometry, RawFeature};
    use crate::workflows::map::geo::Bounds;
    use serde_json::json;

    fn viewport(zoom: u8) -> ViewportState {
        ViewportState {
            bounds: Bounds {
                north: 42.95,
                south: 42.8,
                east: 74.7,
                west: 74.5,
            },
            zoom,
        }
    }

    fn collection() -> FeatureCollection {
        let cluster = RawFeature {
            geometry: Some(Geometry::point(LatLng::new(42.87, 74.59))),
            properties: json!({ "cluster": true, "point_count": 12 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        let point = RawFeature {
            geometry: Some(Geometry::point(LatLng::new(42.88, 74.6))),
            properties: json!({ "id": "prop-101" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        FeatureCollection {
            features: vec![cluster, point],
        }
    }

    #[test]
    fn first_viewport_issues_a_ticket_and_repeats_do_not() {
        let mut sync = MapViewportSync::new();
        let ticket = sync.update_viewport(viewport(10)).expect("ticket");
        assert_eq!(ticket.sequence, 1);
        assert!(sync.update_viewport(viewport(10)).is_none());
        assert_eq!(sync.update_viewport(viewport(12)).map(|t| t.sequence), Some(2));
    }

    #[test]
    fn filters_before_viewport_are_remembered() {
        let mut sync = MapViewportSync::new();
        assert!(sync
            .set_filters(MapFilters::from_params([("city", "Bishkek")]))
            .is_none());

        let ticket = sync.update_viewport(viewport(10)).expect("ticket");
        assert_eq!(ticket.query.filters.get("city"), Some("Bishkek"));
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut sync = MapViewportSync::new();
        let old = sync.update_viewport(viewport(10)).expect("ticket");
        let latest = sync.update_viewport(viewport(12)).expect("ticket");

        assert!(sync.apply_response(&latest, collection()));
        assert!(!sync.apply_response(&old, FeatureCollection::default()));
        assert_eq!(sync.features().len(), 2);
        assert!(sync.is_current());
    }

    #[test]
    fn visible_features_follow_zoom() {
        let mut sync = MapViewportSync::new();
        let ticket = sync.update_viewport(viewport(11)).expect("ticket");
        sync.apply_response(&ticket, collection());

        let visible = sync.visible_features();
        assert_eq!(visible.len(), 1);
        assert!(matches!(visible[0], MapFeature::Cluster(_)));

        sync.update_viewport(viewport(12));
        let visible = sync.visible_features();
        assert_eq!(visible.len(), 1);
        assert!(matches!(visible[0], MapFeature::Point(_)));
    }

    #[test]
    fn clicking_a_point_replaces_a_client_selection() {
        let mut sync = MapViewportSync::new();
        sync.select_client_point(MapPoint {
            property_id: PropertyId("client-1".into()),
            coordinates: LatLng::new(42.86, 74.58),
        });

        let point = PointFeature {
            coordinates: LatLng::new(42.88, 74.6),
            property_id: Some(PropertyId("prop-101".into())),
            title: None,
        };
        assert_eq!(
            sync.click_point(&point),
            Some(PropertyId("prop-101".into()))
        );
        assert_eq!(
            sync.selection().coordinates(),
            Some(LatLng::new(42.88, 74.6))
        );

        sync.clear_selection();
        assert_eq!(sync.selection(), &Selection::None);
    }

    #[test]
    fn clicking_a_point_without_id_drops_the_previous_card() {
        let mut sync = MapViewportSync::new();
        sync.select_client_point(MapPoint {
            property_id: PropertyId("client-1".into()),
            coordinates: LatLng::new(42.86, 74.58),
        });

        let anonymous = PointFeature {
            coordinates: LatLng::new(42.88, 74.6),
            property_id: None,
            title: Some("Unnamed".into()),
        };
        assert_eq!(sync.click_point(&anonymous), None);
        assert_eq!(sync.selection(), &Selection::None);
        assert_eq!(sync.selection().coordinates(), None);
    }

    #[test]
    fn details_for_a_previous_selection_are_ignored() {
        let mut sync = MapViewportSync::new();
        sync.click_point(&PointFeature {
            coordinates: LatLng::new(42.88, 74.6),
            property_id: Some(PropertyId("prop-2".into())),
            title: None,
        });

        let stale = Property::new(
            "prop-1",
            crate::workflows::moderation::ModerationStatus::Approved,
            crate::workflows::moderation::ListingType::Regular,
            crate::workflows::moderation::OfferType::Sale,
        );
        assert!(!sync.attach_details(stale));
    }

    #[test]
    fn cluster_click_uses_current_zoom() {
        let mut sync = MapViewportSync::new();
        sync.update_viewport(viewport(9));
        let target = sync.click_cluster(&ClusterFeature {
            coordinates: LatLng::new(42.87, 74.59),
            point_count: 4,
        });
        assert_eq!(target.zoom, 12);
        assert_eq!(target.center, LatLng::new(42.87, 74.59));
    }

    #[test]
    fn anchor_is_hidden_without_selection() {
        let sync = MapViewportSync::new();
        assert!(sync.anchor(None).is_none());
    }
}
