//! Map viewport scenarios driven through the public facade: strategy choice, zoom-dependent
//! features, cluster expansion, out-of-order responses and card anchoring.

mod common {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use realty_desk::backend::TransportError;
    use realty_desk::workflows::map::{
        BoundedQuery, FeatureCollection, Geometry, LatLng, MapDataGateway, RawFeature,
        CLUSTER_ZOOM_THRESHOLD,
    };
    use realty_desk::workflows::moderation::{
        ListingType, ModerationStatus, OfferType, Property, PropertyId,
    };
    use serde_json::{json, Map, Value};

    pub(super) fn listing(id: &str, lat: f64, lng: f64) -> Property {
        let mut property = Property::new(
            id,
            ModerationStatus::Approved,
            ListingType::Regular,
            OfferType::Sale,
        );
        property.title = format!("Listing {id}");
        property.latitude = Some(lat);
        property.longitude = Some(lng);
        property
    }

    fn attributes(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    /// Answers with one cluster at low zoom and individual points above the threshold.
    #[derive(Default)]
    pub(super) struct ZoomAwareGateway {
        pub(super) listings: Vec<Property>,
        pub(super) queries: Mutex<Vec<BoundedQuery>>,
        pub(super) offline: bool,
    }

    #[async_trait]
    impl MapDataGateway for ZoomAwareGateway {
        async fn fetch_features(
            &self,
            query: &BoundedQuery,
        ) -> Result<FeatureCollection, TransportError> {
            if self.offline {
                return Err(TransportError::Unavailable("map tiles offline".into()));
            }
            self.queries
                .lock()
                .expect("gateway mutex poisoned")
                .push(query.clone());

            let features = if query.zoom <= CLUSTER_ZOOM_THRESHOLD {
                vec![RawFeature {
                    geometry: Some(Geometry::point(LatLng::new(42.87, 74.59))),
                    properties: attributes(json!({
                        "cluster": true,
                        "point_count": self.listings.len()
                    })),
                }]
            } else {
                self.listings
                    .iter()
                    .filter_map(|listing| {
                        Some(RawFeature {
                            geometry: Some(Geometry::point(LatLng::new(
                                listing.latitude?,
                                listing.longitude?,
                            ))),
                            properties: attributes(json!({ "id": listing.id })),
                        })
                    })
                    .collect()
            };

            Ok(FeatureCollection { features })
        }

        async fn fetch_property(
            &self,
            property_id: &PropertyId,
        ) -> Result<Property, TransportError> {
            self.listings
                .iter()
                .find(|listing| &listing.id == property_id)
                .cloned()
                .ok_or_else(|| TransportError::not_found(property_id.to_string()))
        }
    }
}

use std::sync::Arc;

use common::*;
use realty_desk::workflows::map::{
    map_points, project_to_screen, Bounds, ContainerSize, FeatureCollection, MapFeature,
    MapFilters, MapView, MapViewportSync, Pixel, PresentationMode, RenderStrategy, Selection,
    SheetDrag, ViewportState, WebMercator, CARD_OFFSET,
};

fn bounds() -> Bounds {
    Bounds {
        north: 42.95,
        south: 42.8,
        east: 74.7,
        west: 74.5,
    }
}

fn gateway() -> ZoomAwareGateway {
    ZoomAwareGateway {
        listings: vec![
            listing("prop-1", 42.8746, 74.5698),
            listing("prop-2", 42.8391, 74.6105),
        ],
        ..ZoomAwareGateway::default()
    }
}

#[test]
fn strategy_follows_preloaded_point_count() {
    let sync = MapViewportSync::new();
    let many: Vec<_> = (0..101)
        .map(|index| listing(&format!("p{index}"), 42.87, 74.59))
        .collect();

    assert_eq!(sync.render_strategy(&[]), RenderStrategy::ServerClusters);
    assert_eq!(
        sync.render_strategy(&map_points(&many[..100])),
        RenderStrategy::ClientClusters
    );
    assert_eq!(
        sync.render_strategy(&map_points(&many)),
        RenderStrategy::ServerClusters
    );
}

#[tokio::test]
async fn cluster_click_leads_to_points_and_a_selected_card() {
    let gateway = gateway();
    let mut sync = MapViewportSync::with_filters(MapFilters::from_params([("city", "Bishkek")]));

    let ticket = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: 11,
        })
        .expect("first viewport issues a ticket");
    assert!(sync.refresh(&gateway, &ticket).await);

    let cluster = match sync.visible_features().as_slice() {
        [MapFeature::Cluster(cluster)] => cluster.clone(),
        other => panic!("expected a single cluster, got {other:?}"),
    };
    assert_eq!(cluster.point_count, 2);

    let target = sync.click_cluster(&cluster);
    assert_eq!(target.zoom, 13);

    let ticket = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: target.zoom,
        })
        .expect("zoom change issues a ticket");
    assert!(sync.refresh(&gateway, &ticket).await);
    assert_eq!(sync.visible_features().len(), 2);

    let queries = gateway.queries.lock().expect("gateway mutex poisoned").clone();
    assert_eq!(queries.len(), 2);
    assert!(queries
        .iter()
        .all(|query| query.filters.get("city") == Some("Bishkek")));

    let point = match sync.visible_features()[0] {
        MapFeature::Point(point) => point.clone(),
        MapFeature::Cluster(_) => panic!("clusters hidden above the threshold"),
    };
    sync.click_point(&point);
    let details = sync.load_selected(&gateway).await.expect("details load");
    assert_eq!(details.title, "Listing prop-1");

    let map = MapView::new(
        Arc::new(WebMercator),
        target.center,
        f64::from(target.zoom),
        ContainerSize {
            width: 1024.0,
            height: 768.0,
        },
        Pixel { x: 0.0, y: 80.0 },
    );
    let anchor = sync.anchor(Some(&map)).expect("card anchored");
    let expected = project_to_screen(Some(&map), Some(point.coordinates), CARD_OFFSET);
    assert_eq!(Some(anchor), expected);
}

#[tokio::test]
async fn slow_response_for_an_old_viewport_is_ignored() {
    let gateway = gateway();
    let mut sync = MapViewportSync::new();

    let zoomed_out = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: 10,
        })
        .expect("ticket");
    let zoomed_in = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: 14,
        })
        .expect("ticket");

    assert!(sync.refresh(&gateway, &zoomed_in).await);
    assert!(!sync.refresh(&gateway, &zoomed_out).await);

    assert!(sync
        .features()
        .iter()
        .all(|feature| matches!(feature, MapFeature::Point(_))));
    assert!(sync.is_current());
}

#[tokio::test]
async fn transport_failure_keeps_previous_features() {
    let mut sync = MapViewportSync::new();
    let ticket = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: 14,
        })
        .expect("ticket");
    assert!(sync.refresh(&gateway(), &ticket).await);
    let before = sync.features().len();

    sync.set_filters(MapFilters::from_params([("rooms_min", "3")]));
    let offline = ZoomAwareGateway {
        offline: true,
        ..gateway()
    };
    let ticket = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: 15,
        })
        .expect("ticket");
    assert!(!sync.refresh(&offline, &ticket).await);
    assert_eq!(sync.features().len(), before);
    assert!(!sync.is_current());
}

#[test]
fn empty_response_clears_features_for_the_latest_ticket() {
    let mut sync = MapViewportSync::new();
    let ticket = sync
        .update_viewport(ViewportState {
            bounds: bounds(),
            zoom: 12,
        })
        .expect("ticket");
    assert!(sync.apply_response(&ticket, FeatureCollection::default()));
    assert!(sync.visible_features().is_empty());
}

#[test]
fn client_selection_anchors_and_clears() {
    let mut sync = MapViewportSync::new();
    let points = map_points(&[listing("prop-9", 42.87, 74.59)]);
    sync.select_client_point(points[0].clone());
    assert!(matches!(sync.selection(), Selection::Client(_)));

    assert!(sync.anchor(None).is_none());
    sync.clear_selection();
    assert_eq!(sync.selection(), &Selection::None);
}

#[test]
fn presentation_switches_at_the_mobile_breakpoint() {
    assert_eq!(
        PresentationMode::for_viewport_width(767),
        PresentationMode::BottomSheet
    );
    assert_eq!(
        PresentationMode::for_viewport_width(768),
        PresentationMode::AnchoredCard
    );
    assert!(SheetDrag {
        distance_px: 121.0,
        duration_ms: 1000.0
    }
    .should_dismiss());
    assert!(!SheetDrag {
        distance_px: 120.0,
        duration_ms: 1000.0
    }
    .should_dismiss());
}
