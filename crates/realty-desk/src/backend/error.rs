use reqwest::StatusCode;

/// Failure talking to the listings backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unable to decode backend response: {0}")]
    Decode(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn not_found(body: impl Into<String>) -> Self {
        TransportError::Status {
            status: StatusCode::NOT_FOUND,
            body: body.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
