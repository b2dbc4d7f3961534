//! Listing moderation: which statuses a staff role may pick, which supplementary data each
//! status demands, and how the update sent to the listings backend is assembled.
//!
//! Selectable statuses are recomputed from (role, offer type, listing type, editing flag) on
//! every call; nothing here stores a transition history.

pub mod domain;
pub mod payload;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ListingType, ModerationStatus, MoneyHolder, OfferType, Property, PropertyId, PropertyUpdate,
    Role, SaleAgent, SaleAgentRole,
};
pub use payload::{
    build_update_payload, effective_status, AgentAssignment, DealBlock, DepositBlock,
    UpdatePayload,
};
pub use policy::{
    available_statuses, is_status_legal, moderation_options, reconcile_selection,
    ModerationOptions, StatusOption,
};
pub use repository::{Notification, NotificationLevel, Notifier, PropertyGateway};
pub use router::moderation_router;
pub use service::{ModerationRequest, ModerationService, ModerationServiceError};
pub use store::PropertyStore;
pub use validation::{
    required_field_set, validate, FormField, ModerationForm, RequiredFields, ValidationError,
};
