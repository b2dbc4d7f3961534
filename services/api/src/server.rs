use crate::cli::ServeArgs;
use crate::infra::{AppState, LoggingNotifier};
use crate::routes::{with_service_routes, SharedMapGateway};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use realty_desk::backend::BackendClient;
use realty_desk::config::AppConfig;
use realty_desk::error::AppError;
use realty_desk::telemetry;
use realty_desk::workflows::moderation::{ModerationService, PropertyStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        map_api_key: config.map.api_key.clone(),
    };

    let backend = Arc::new(BackendClient::new(&config.backend)?);
    let store = Arc::new(PropertyStore::new());
    let moderation_service = Arc::new(ModerationService::new(
        store,
        backend.clone(),
        Arc::new(LoggingNotifier),
    ));
    let map_gateway: SharedMapGateway = backend;

    let app = with_service_routes(moderation_service)
        .layer(Extension(app_state))
        .layer(Extension(map_gateway))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %config.backend.base_url,
        "realty desk api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
