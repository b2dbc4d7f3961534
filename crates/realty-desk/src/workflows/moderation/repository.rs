use async_trait::async_trait;
use serde::Serialize;

use super::domain::{Property, PropertyId, PropertyUpdate};
use super::payload::UpdatePayload;
use crate::backend::TransportError;

/// Backend operations the moderation flow depends on, so the service can run against the REST
/// client or an in-memory double.
#[async_trait]
pub trait PropertyGateway: Send + Sync {
    async fn property(&self, id: &PropertyId) -> Result<Property, TransportError>;

    async fn update_moderation(
        &self,
        id: &PropertyId,
        payload: &UpdatePayload,
    ) -> Result<PropertyUpdate, TransportError>;

    async fn similar(&self, id: &PropertyId) -> Result<Vec<Property>, TransportError>;

    async fn record_view(&self, id: &PropertyId) -> Result<(), TransportError>;
}

/// Outbound hook for user-facing toasts.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub property_id: PropertyId,
    pub message: String,
}

impl Notification {
    pub fn success(property_id: PropertyId, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            property_id,
            message: message.into(),
        }
    }

    pub fn error(property_id: PropertyId, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            property_id,
            message: message.into(),
        }
    }
}
