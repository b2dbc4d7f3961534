use serde::Serialize;

use super::domain::{ListingType, ModerationStatus, OfferType, Role};
use super::validation::{required_field_set, RequiredFields};

const BASE_STATUSES: [ModerationStatus; 7] = [
    ModerationStatus::Pending,
    ModerationStatus::Approved,
    ModerationStatus::Deposit,
    ModerationStatus::Sold,
    ModerationStatus::SoldByOwner,
    ModerationStatus::Rented,
    ModerationStatus::Denied,
];

/// Selectable entry in a moderation status picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub status: ModerationStatus,
    pub label: &'static str,
}

impl From<ModerationStatus> for StatusOption {
    fn from(status: ModerationStatus) -> Self {
        Self {
            status,
            label: status.display_name(),
        }
    }
}

/// Statuses the acting role may pick for a listing, in display order.
///
/// The result is recomputed from scratch on every call and is never empty.
pub fn available_statuses(
    role: Role,
    offer_type: OfferType,
    listing_type: ListingType,
    is_editing: bool,
) -> Vec<StatusOption> {
    if role == Role::Agent && listing_type != ListingType::Regular {
        return vec![ModerationStatus::Pending.into()];
    }

    let mut statuses: Vec<ModerationStatus> = if is_editing {
        BASE_STATUSES
            .iter()
            .copied()
            .filter(|status| allowed_for_offer(*status, offer_type))
            .collect()
    } else {
        vec![ModerationStatus::Pending, ModerationStatus::Approved]
    };

    if role != Role::Agent {
        statuses.push(ModerationStatus::Deleted);
    }

    statuses.into_iter().map(StatusOption::from).collect()
}

fn allowed_for_offer(status: ModerationStatus, offer_type: OfferType) -> bool {
    match offer_type {
        OfferType::Sale => status != ModerationStatus::Rented,
        OfferType::Rent => !matches!(
            status,
            ModerationStatus::Sold | ModerationStatus::SoldByOwner
        ),
    }
}

/// Whether `status` is selectable for the given combination.
pub fn is_status_legal(
    role: Role,
    offer_type: OfferType,
    listing_type: ListingType,
    is_editing: bool,
    status: ModerationStatus,
) -> bool {
    available_statuses(role, offer_type, listing_type, is_editing)
        .iter()
        .any(|option| option.status == status)
}

/// Keeps `current` when it is still offered, else falls back to `pending`, else the first option.
pub fn reconcile_selection(
    current: Option<ModerationStatus>,
    options: &[StatusOption],
) -> ModerationStatus {
    let offered = |status: ModerationStatus| options.iter().any(|option| option.status == status);

    match current {
        Some(status) if offered(status) => status,
        _ if offered(ModerationStatus::Pending) => ModerationStatus::Pending,
        _ => options
            .first()
            .map(|option| option.status)
            .unwrap_or(ModerationStatus::Pending),
    }
}

/// Everything a status picker needs to render for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationOptions {
    pub statuses: Vec<StatusOption>,
    pub selected: ModerationStatus,
    pub listing_type_editable: bool,
    pub required: RequiredFields,
}

pub fn moderation_options(
    role: Role,
    offer_type: OfferType,
    listing_type: ListingType,
    is_editing: bool,
    current: Option<ModerationStatus>,
) -> ModerationOptions {
    let statuses = available_statuses(role, offer_type, listing_type, is_editing);
    let selected = reconcile_selection(current, &statuses);

    ModerationOptions {
        required: required_field_set(selected),
        listing_type_editable: role.can_edit_listing_type(),
        statuses,
        selected,
    }
}
