use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::{error, info, warn};

use super::domain::{ListingType, ModerationStatus, Property, PropertyId, Role};
use super::payload::{build_update_payload, effective_status};
use super::policy::{is_status_legal, moderation_options, ModerationOptions};
use super::repository::{Notification, Notifier, PropertyGateway};
use super::store::PropertyStore;
use super::validation::{validate, ModerationForm, ValidationError};
use crate::backend::TransportError;

/// A staff member's save action from the moderation modal or the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModerationRequest {
    pub property_id: PropertyId,
    pub role: Role,
    pub status: ModerationStatus,
    /// Administrator's pending listing type choice; the stored one is used when absent.
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    #[serde(default)]
    pub form: ModerationForm,
}

/// Service composing the property store, the backend gateway and user notifications.
pub struct ModerationService<G, N> {
    store: Arc<PropertyStore>,
    gateway: Arc<G>,
    notifier: Arc<N>,
    in_flight: Mutex<HashSet<PropertyId>>,
}

impl<G, N> ModerationService<G, N>
where
    G: PropertyGateway + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<PropertyStore>, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            store,
            gateway,
            notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<PropertyStore> {
        &self.store
    }

    /// Stored listing, loaded from the backend and cached on first access.
    pub async fn property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Property, ModerationServiceError> {
        if let Some(property) = self.store.get(property_id) {
            return Ok(property);
        }

        match self.gateway.property(property_id).await {
            Ok(property) => {
                self.store.insert(property.clone());
                Ok(property)
            }
            Err(err) if err.is_not_found() => {
                Err(ModerationServiceError::NotFound(property_id.clone()))
            }
            Err(err) => {
                error!(property = %property_id, error = %err, "listing lookup failed");
                Err(ModerationServiceError::Transport(err))
            }
        }
    }

    /// Picker state for a stored listing.
    pub async fn options(
        &self,
        role: Role,
        property_id: &PropertyId,
        is_editing: bool,
    ) -> Result<ModerationOptions, ModerationServiceError> {
        let property = self.property(property_id).await?;

        Ok(moderation_options(
            role,
            property.offer_type,
            property.listing_type,
            is_editing,
            Some(property.moderation_status),
        ))
    }

    /// Validate, send and apply a moderation change.
    ///
    /// On success the store holds the updated listing, which is also returned. On a transport
    /// failure the store is untouched so the caller can keep its dialog open and retry.
    pub async fn submit(
        &self,
        request: ModerationRequest,
    ) -> Result<Property, ModerationServiceError> {
        let ModerationRequest {
            property_id,
            role,
            status,
            listing_type,
            form,
        } = request;

        let _in_flight = self.begin_submission(&property_id)?;

        let property = self.property(&property_id).await?;

        let listing_type = listing_type.unwrap_or(property.listing_type);
        let effective = effective_status(role, status, &property);

        // Agents cannot change the tier, so their options follow the stored one.
        let offered_for = if role.can_edit_listing_type() {
            listing_type
        } else {
            property.listing_type
        };
        if !is_status_legal(role, property.offer_type, offered_for, true, effective) {
            warn!(
                property = %property_id,
                role = role.label(),
                status = effective.label(),
                "status not offered for this listing"
            );
            return Err(ModerationServiceError::IllegalStatus {
                property_id,
                role,
                status: effective,
            });
        }

        validate(effective, &form)?;

        let payload = build_update_payload(role, status, listing_type, &form, &property);

        match self.gateway.update_moderation(&property_id, &payload).await {
            Ok(response) => {
                let updated = property
                    .merged(&payload.to_property_update())
                    .merged(&response);
                self.store.replace(updated.clone());

                info!(
                    property = %property_id,
                    role = role.label(),
                    status = updated.moderation_status.label(),
                    "moderation status saved"
                );
                self.notifier.notify(Notification::success(
                    property_id,
                    "Moderation status updated",
                ));
                Ok(updated)
            }
            Err(err) => {
                error!(property = %property_id, error = %err, "moderation update failed");
                self.notifier.notify(Notification::error(
                    property_id,
                    "Could not update the moderation status. Please try again.",
                ));
                Err(ModerationServiceError::Transport(err))
            }
        }
    }

    /// Listings the backend considers similar; failures are logged and surfaced to the caller.
    pub async fn similar(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<Property>, ModerationServiceError> {
        self.gateway.similar(property_id).await.map_err(|err| {
            error!(property = %property_id, error = %err, "similar listings unavailable");
            ModerationServiceError::Transport(err)
        })
    }

    fn begin_submission(
        &self,
        property_id: &PropertyId,
    ) -> Result<InFlightSubmission<'_>, ModerationServiceError> {
        let mut guard = self.in_flight.lock().expect("in-flight mutex poisoned");
        if !guard.insert(property_id.clone()) {
            return Err(ModerationServiceError::SubmissionInFlight(
                property_id.clone(),
            ));
        }

        Ok(InFlightSubmission {
            registry: &self.in_flight,
            property_id: property_id.clone(),
        })
    }
}

/// Marks a listing as having a save in progress until dropped.
struct InFlightSubmission<'a> {
    registry: &'a Mutex<HashSet<PropertyId>>,
    property_id: PropertyId,
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.registry.lock() {
            guard.remove(&self.property_id);
        }
    }
}

/// Error raised by the moderation service.
#[derive(Debug, thiserror::Error)]
pub enum ModerationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("property {0} not found")]
    NotFound(PropertyId),
    #[error("a moderation update for property {0} is already in progress")]
    SubmissionInFlight(PropertyId),
    #[error(
        "{} cannot move property {} to {}",
        .role.label(),
        .property_id,
        .status.label()
    )]
    IllegalStatus {
        property_id: PropertyId,
        role: Role,
        status: ModerationStatus,
    },
}
