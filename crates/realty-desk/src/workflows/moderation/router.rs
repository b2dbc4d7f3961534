use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ListingType, ModerationStatus, OfferType, PropertyId, Role};
use super::policy::moderation_options;
use super::repository::{Notifier, PropertyGateway};
use super::service::{ModerationRequest, ModerationService, ModerationServiceError};
use super::validation::ModerationForm;

/// Picker query for a listing that may not exist yet (creation flow).
#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub role: Role,
    pub offer_type: OfferType,
    pub listing_type: ListingType,
    #[serde(default = "default_editing")]
    pub is_editing: bool,
    #[serde(default)]
    pub current_status: Option<ModerationStatus>,
}

fn default_editing() -> bool {
    true
}

/// Save body; the listing id comes from the path.
#[derive(Debug, Deserialize)]
pub struct ModerationSubmission {
    pub role: Role,
    pub status: ModerationStatus,
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    #[serde(default)]
    pub form: ModerationForm,
}

/// Router builder exposing the moderation workflow over HTTP.
pub fn moderation_router<G, N>(service: Arc<ModerationService<G, N>>) -> Router
where
    G: PropertyGateway + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/moderation/options", post(options_handler))
        .route(
            "/api/v1/properties/:property_id",
            get(property_handler::<G, N>),
        )
        .route(
            "/api/v1/properties/:property_id/moderation",
            patch(submit_handler::<G, N>),
        )
        .route(
            "/api/v1/properties/:property_id/similar",
            get(similar_handler::<G, N>),
        )
        .with_state(service)
}

pub(crate) async fn options_handler(Json(query): Json<OptionsQuery>) -> Response {
    let options = moderation_options(
        query.role,
        query.offer_type,
        query.listing_type,
        query.is_editing,
        query.current_status,
    );
    (StatusCode::OK, Json(options)).into_response()
}

pub(crate) async fn property_handler<G, N>(
    State(service): State<Arc<ModerationService<G, N>>>,
    Path(property_id): Path<String>,
) -> Response
where
    G: PropertyGateway + 'static,
    N: Notifier + 'static,
{
    match service.property(&PropertyId(property_id)).await {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn submit_handler<G, N>(
    State(service): State<Arc<ModerationService<G, N>>>,
    Path(property_id): Path<String>,
    Json(submission): Json<ModerationSubmission>,
) -> Response
where
    G: PropertyGateway + 'static,
    N: Notifier + 'static,
{
    let request = ModerationRequest {
        property_id: PropertyId(property_id),
        role: submission.role,
        status: submission.status,
        listing_type: submission.listing_type,
        form: submission.form,
    };

    match service.submit(request).await {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn similar_handler<G, N>(
    State(service): State<Arc<ModerationService<G, N>>>,
    Path(property_id): Path<String>,
) -> Response
where
    G: PropertyGateway + 'static,
    N: Notifier + 'static,
{
    match service.similar(&PropertyId(property_id)).await {
        Ok(properties) => (StatusCode::OK, Json(properties)).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) fn error_response(err: &ModerationServiceError) -> Response {
    match err {
        ModerationServiceError::Validation(validation) => {
            let payload = json!({
                "error": validation.message,
                "field": validation.field,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ModerationServiceError::NotFound(id) => {
            let payload = json!({
                "error": err.to_string(),
                "property_id": id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ModerationServiceError::IllegalStatus { status, .. } => {
            let payload = json!({
                "error": err.to_string(),
                "status": status,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ModerationServiceError::SubmissionInFlight(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ModerationServiceError::Transport(_) => {
            let payload = json!({ "error": "listing backend unavailable" });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}
