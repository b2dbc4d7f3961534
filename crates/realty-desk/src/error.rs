use crate::backend::TransportError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::mortgage::MortgageError;
use crate::workflows::moderation::ModerationServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Moderation(ModerationServiceError),
    Transport(TransportError),
    Mortgage(MortgageError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Moderation(err) => write!(f, "moderation error: {}", err),
            AppError::Transport(err) => write!(f, "backend error: {}", err),
            AppError::Mortgage(err) => write!(f, "mortgage error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Moderation(err) => Some(err),
            AppError::Transport(err) => Some(err),
            AppError::Mortgage(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Moderation(ModerationServiceError::Validation(_))
            | AppError::Moderation(ModerationServiceError::IllegalStatus { .. })
            | AppError::Mortgage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Moderation(ModerationServiceError::SubmissionInFlight(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Moderation(ModerationServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Moderation(ModerationServiceError::Transport(_)) | AppError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ModerationServiceError> for AppError {
    fn from(value: ModerationServiceError) -> Self {
        Self::Moderation(value)
    }
}

impl From<TransportError> for AppError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<MortgageError> for AppError {
    fn from(value: MortgageError) -> Self {
        Self::Mortgage(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::moderation::{ModerationStatus, PropertyId, Role};

    #[test]
    fn moderation_errors_map_to_http_statuses() {
        let not_found = AppError::from(ModerationServiceError::NotFound(PropertyId("x".into())));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let busy =
            AppError::from(ModerationServiceError::SubmissionInFlight(PropertyId("x".into())));
        assert_eq!(busy.status_code(), StatusCode::CONFLICT);

        let illegal = AppError::from(ModerationServiceError::IllegalStatus {
            property_id: PropertyId("x".into()),
            role: Role::Agent,
            status: ModerationStatus::Deleted,
        });
        assert_eq!(illegal.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let backend = AppError::from(TransportError::Unavailable("down".into()));
        assert_eq!(backend.status_code(), StatusCode::BAD_GATEWAY);

        assert_eq!(
            AppError::from(ConfigError::InvalidPort).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(MortgageError::InvalidTerm).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
