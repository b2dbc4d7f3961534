use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use realty_desk::error::AppError;
use realty_desk::workflows::map::{
    derive_map_query, project_to_screen, select_render_strategy, BoundedQuery, ContainerSize,
    LatLng, MapDataGateway, MapFeature, MapView, Pixel, PixelOffset, PresentationMode,
    RenderStrategy, ScreenPosition, ViewportState, WebMercator, CARD_OFFSET,
};
use realty_desk::workflows::moderation::{
    moderation_router, ModerationService, Notifier, PropertyGateway,
};
use realty_desk::workflows::mortgage::{self, MortgageQuote, MortgageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub(crate) type SharedMapGateway = Arc<dyn MapDataGateway>;

pub(crate) fn with_service_routes<G, N>(service: Arc<ModerationService<G, N>>) -> axum::Router
where
    G: PropertyGateway + 'static,
    N: Notifier + 'static,
{
    moderation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/map/config", axum::routing::get(map_config_endpoint))
        .route("/api/v1/map/query", axum::routing::post(map_query_endpoint))
        .route(
            "/api/v1/map/features",
            axum::routing::post(map_features_endpoint),
        )
        .route(
            "/api/v1/map/project",
            axum::routing::post(map_project_endpoint),
        )
        .route(
            "/api/v1/mortgage/quote",
            axum::routing::post(mortgage_quote_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn map_config_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "api_key": state.map_api_key }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct MapQueryRequest {
    #[serde(default)]
    pub(crate) params: BTreeMap<String, String>,
    pub(crate) viewport: ViewportState,
    /// Number of preloaded listings; omitted when nothing was preloaded.
    #[serde(default)]
    pub(crate) point_count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct MapQueryResponse {
    pub(crate) query: BoundedQuery,
    pub(crate) pairs: Vec<(String, String)>,
    pub(crate) strategy: RenderStrategy,
}

pub(crate) async fn map_query_endpoint(
    Json(request): Json<MapQueryRequest>,
) -> Json<MapQueryResponse> {
    let query = derive_map_query(&request.params, &request.viewport);
    let pairs = query.to_query_pairs();

    Json(MapQueryResponse {
        query,
        pairs,
        strategy: select_render_strategy(request.point_count),
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct MapFeaturesResponse {
    pub(crate) zoom: u8,
    pub(crate) features: Vec<MapFeature>,
}

/// Server-clustered features for a viewport, already reduced to what is visible at its zoom.
pub(crate) async fn map_features_endpoint(
    Extension(gateway): Extension<SharedMapGateway>,
    Json(request): Json<MapQueryRequest>,
) -> Result<Json<MapFeaturesResponse>, AppError> {
    let query = derive_map_query(&request.params, &request.viewport);
    let collection = gateway.fetch_features(&query).await?;

    let features = collection
        .classified()
        .into_iter()
        .filter(|feature| feature.is_visible_at(query.zoom))
        .collect();

    Ok(Json(MapFeaturesResponse {
        zoom: query.zoom,
        features,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct MapViewRequest {
    pub(crate) center: LatLng,
    pub(crate) zoom: f64,
    pub(crate) size: ContainerSize,
    #[serde(default = "page_origin")]
    pub(crate) container_origin: Pixel,
}

fn page_origin() -> Pixel {
    Pixel { x: 0.0, y: 0.0 }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRequest {
    #[serde(default)]
    pub(crate) map: Option<MapViewRequest>,
    #[serde(default)]
    pub(crate) coordinate: Option<LatLng>,
    #[serde(default)]
    pub(crate) offset: Option<PixelOffset>,
    #[serde(default)]
    pub(crate) viewport_width: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectResponse {
    pub(crate) position: Option<ScreenPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) presentation: Option<PresentationMode>,
}

pub(crate) async fn map_project_endpoint(
    Json(request): Json<ProjectRequest>,
) -> Json<ProjectResponse> {
    let map = request.map.map(|view| {
        MapView::new(
            Arc::new(WebMercator),
            view.center,
            view.zoom,
            view.size,
            view.container_origin,
        )
    });
    let presentation = request
        .viewport_width
        .map(PresentationMode::for_viewport_width);

    let position = if presentation.map_or(true, PresentationMode::needs_anchor) {
        project_to_screen(
            map.as_ref(),
            request.coordinate,
            request.offset.unwrap_or(CARD_OFFSET),
        )
    } else {
        None
    };

    Json(ProjectResponse {
        position,
        presentation,
    })
}

pub(crate) async fn mortgage_quote_endpoint(
    Json(request): Json<MortgageRequest>,
) -> Result<Json<MortgageQuote>, AppError> {
    Ok(Json(mortgage::quote(&request)?))
}
