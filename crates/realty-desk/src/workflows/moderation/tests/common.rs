use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Notify;

use crate::backend::TransportError;
use crate::workflows::moderation::domain::{
    ListingType, ModerationStatus, MoneyHolder, OfferType, Property, PropertyId, PropertyUpdate,
    SaleAgent, SaleAgentRole,
};
use crate::workflows::moderation::payload::UpdatePayload;
use crate::workflows::moderation::repository::{Notification, Notifier, PropertyGateway};
use crate::workflows::moderation::store::PropertyStore;
use crate::workflows::moderation::validation::ModerationForm;
use crate::workflows::moderation::{moderation_router, ModerationService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn sale_property() -> Property {
    let mut property = Property::new(
        "prop-101",
        ModerationStatus::Approved,
        ListingType::Regular,
        OfferType::Sale,
    );
    property.title = "3-room apartment, 7th microdistrict".to_string();
    property.latitude = Some(42.8746);
    property.longitude = Some(74.5698);
    property
}

pub(super) fn promoted_property(listing_type: ListingType) -> Property {
    let mut property = sale_property();
    property.id = PropertyId("prop-202".to_string());
    property.listing_type = listing_type;
    property.moderation_status = ModerationStatus::Pending;
    property
}

/// Form that passes every block for `sold`.
pub(super) fn complete_sale_form() -> ModerationForm {
    ModerationForm {
        comment: "Closed with the buyer from the open house".to_string(),
        buyer_full_name: "Aida Sadykova".to_string(),
        buyer_phone: "+996 555 010 203".to_string(),
        deposit_amount: Some(2000),
        deposit_currency: Some("USD".to_string()),
        deposit_received_at: Some(date(2025, 3, 1)),
        deposit_expires_at: None,
        money_holder: Some(MoneyHolder::Company),
        company_expected_income: Some(6000),
        planned_contract_signed_at: Some(date(2025, 3, 20)),
        actual_sale_price: Some(450_000),
        company_commission_amount: Some(5000),
        sale_agents: vec![SaleAgent {
            agent_id: 3,
            role: SaleAgentRole::Main,
            commission_amount: None,
        }],
    }
}

#[derive(Default)]
pub(super) struct MemoryGateway {
    pub(super) payloads: Mutex<Vec<(PropertyId, UpdatePayload)>>,
    pub(super) similar: Mutex<Vec<Property>>,
    pub(super) remote: Mutex<Vec<Property>>,
    pub(super) fail: bool,
}

impl MemoryGateway {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn with_remote(properties: Vec<Property>) -> Self {
        Self {
            remote: Mutex::new(properties),
            ..Self::default()
        }
    }

    pub(super) fn payloads(&self) -> Vec<(PropertyId, UpdatePayload)> {
        self.payloads.lock().expect("gateway mutex poisoned").clone()
    }
}

fn not_found(id: &PropertyId) -> TransportError {
    TransportError::not_found(format!("property {id} not found"))
}

#[async_trait]
impl PropertyGateway for MemoryGateway {
    async fn property(&self, id: &PropertyId) -> Result<Property, TransportError> {
        self.remote
            .lock()
            .expect("gateway mutex poisoned")
            .iter()
            .find(|property| &property.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update_moderation(
        &self,
        id: &PropertyId,
        payload: &UpdatePayload,
    ) -> Result<PropertyUpdate, TransportError> {
        if self.fail {
            return Err(TransportError::Unavailable("backend offline".to_string()));
        }
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .push((id.clone(), payload.clone()));
        Ok(PropertyUpdate {
            moderation_status: Some(payload.moderation_status),
            ..PropertyUpdate::default()
        })
    }

    async fn similar(&self, _id: &PropertyId) -> Result<Vec<Property>, TransportError> {
        if self.fail {
            return Err(TransportError::Unavailable("backend offline".to_string()));
        }
        Ok(self.similar.lock().expect("gateway mutex poisoned").clone())
    }

    async fn record_view(&self, _id: &PropertyId) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Holds every update until the test releases it.
#[derive(Default)]
pub(super) struct GatedGateway {
    pub(super) entered: Notify,
    pub(super) release: Notify,
}

#[async_trait]
impl PropertyGateway for GatedGateway {
    async fn property(&self, id: &PropertyId) -> Result<Property, TransportError> {
        Err(not_found(id))
    }

    async fn update_moderation(
        &self,
        _id: &PropertyId,
        payload: &UpdatePayload,
    ) -> Result<PropertyUpdate, TransportError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(PropertyUpdate {
            moderation_status: Some(payload.moderation_status),
            ..PropertyUpdate::default()
        })
    }

    async fn similar(&self, _id: &PropertyId) -> Result<Vec<Property>, TransportError> {
        Ok(Vec::new())
    }

    async fn record_view(&self, _id: &PropertyId) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
    }
}

pub(super) fn build_service_with<G>(
    gateway: Arc<G>,
) -> (
    ModerationService<G, MemoryNotifier>,
    Arc<PropertyStore>,
    Arc<MemoryNotifier>,
)
where
    G: PropertyGateway + 'static,
{
    let store = Arc::new(PropertyStore::with_properties([
        sale_property(),
        promoted_property(ListingType::Vip),
    ]));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = ModerationService::new(store.clone(), gateway, notifier.clone());
    (service, store, notifier)
}

pub(super) fn router_with_gateway(gateway: Arc<MemoryGateway>) -> axum::Router {
    let (service, _, _) = build_service_with(gateway);
    moderation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
