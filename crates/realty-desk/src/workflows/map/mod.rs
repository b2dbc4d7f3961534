//! Map viewport synchronisation: choosing between client and server clustering, deriving the
//! bounded feature query, classifying returned features by zoom and anchoring the selected
//! listing's card on screen.

pub mod features;
pub mod gateway;
pub mod geo;
pub mod points;
pub mod presentation;
pub mod query;
pub mod strategy;
pub mod sync;

pub use features::{
    classify_feature, cluster_zoom_target, CameraTarget, ClusterFeature, FeatureCollection,
    Geometry, MapFeature, PointFeature, RawFeature, CLUSTER_ZOOM_THRESHOLD,
};
pub use gateway::MapDataGateway;
pub use geo::{
    project_to_screen, try_project_to_screen, Bounds, ContainerSize, GeoCapabilityError, LatLng,
    MapProjection, MapView, Pixel, PixelOffset, ScreenPosition, ViewportState, WebMercator,
    CARD_OFFSET,
};
pub use points::{map_points, MapPoint};
pub use presentation::{
    PresentationMode, SheetDrag, DISMISS_DISTANCE_PX, DISMISS_VELOCITY_PX_PER_MS,
    MOBILE_BREAKPOINT_PX,
};
pub use query::{derive_map_query, BoundedQuery, MapFilters, FILTER_KEYS};
pub use strategy::{select_render_strategy, RenderStrategy, CLIENT_CLUSTER_LIMIT};
pub use sync::{MapViewportSync, QueryTicket, Selection};
