use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    ListingType, ModerationStatus, MoneyHolder, Property, PropertyUpdate, Role, SaleAgent,
    SaleAgentRole,
};
use super::validation::{required_field_set, ModerationForm};

/// Body of `PATCH /properties/{id}/moderation-listing`.
///
/// Every optional field is omitted from the JSON body when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePayload {
    pub moderation_status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Shared by the deposit and deal blocks; present whenever either block is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money_holder: Option<MoneyHolder>,
    #[serde(flatten)]
    pub deposit: Option<DepositBlock>,
    #[serde(flatten)]
    pub deal: Option<DealBlock>,
}

impl UpdatePayload {
    /// Local view of the fields this payload writes, applied before the backend's echo.
    pub fn to_property_update(&self) -> PropertyUpdate {
        let mut update = PropertyUpdate {
            moderation_status: Some(self.moderation_status),
            listing_type: self.listing_type,
            money_holder: self.money_holder,
            ..PropertyUpdate::default()
        };

        if let Some(deposit) = &self.deposit {
            update.buyer_full_name = Some(deposit.buyer_full_name.clone());
            update.buyer_phone = Some(deposit.buyer_phone.clone());
            update.deposit_amount = deposit.deposit_amount;
            update.deposit_currency = deposit.deposit_currency.clone();
            update.deposit_received_at = deposit.deposit_received_at;
            update.deposit_expires_at = deposit.deposit_expires_at;
            update.company_expected_income = deposit.company_expected_income;
            update.planned_contract_signed_at = deposit.planned_contract_signed_at;
        }

        if let Some(deal) = &self.deal {
            update.actual_sale_price = deal.actual_sale_price;
            update.company_commission_amount = deal.company_commission_amount;
            update.sale_agents = deal.agents.as_ref().map(|agents| {
                agents
                    .iter()
                    .map(|agent| SaleAgent {
                        agent_id: agent.agent_id,
                        role: agent.role,
                        commission_amount: agent.commission_amount,
                    })
                    .collect()
            });
        }

        update
    }
}

/// Earnest-money fields captured before a sale closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositBlock {
    pub buyer_full_name: String,
    pub buyer_phone: String,
    pub deposit_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_currency: Option<String>,
    pub deposit_received_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_expires_at: Option<NaiveDate>,
    pub company_expected_income: Option<i64>,
    pub planned_contract_signed_at: Option<NaiveDate>,
}

/// Final terms of a sale or rental.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealBlock {
    pub actual_sale_price: Option<i64>,
    pub company_commission_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<AgentAssignment>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAssignment {
    pub agent_id: u64,
    pub role: SaleAgentRole,
    pub commission_amount: Option<i64>,
}

impl From<&SaleAgent> for AgentAssignment {
    fn from(agent: &SaleAgent) -> Self {
        Self {
            agent_id: agent.agent_id,
            role: agent.role,
            commission_amount: agent.commission_amount,
        }
    }
}

/// Status actually sent to the backend for this role and listing.
///
/// Agents cannot publish promoted listings: the property's stored listing type decides, since
/// agents have no way to change it.
pub fn effective_status(
    role: Role,
    requested: ModerationStatus,
    property: &Property,
) -> ModerationStatus {
    if role == Role::Agent && property.listing_type.is_promoted() {
        ModerationStatus::Pending
    } else {
        requested
    }
}

pub fn build_update_payload(
    role: Role,
    status: ModerationStatus,
    listing_type: ListingType,
    form: &ModerationForm,
    property: &Property,
) -> UpdatePayload {
    let status = effective_status(role, status, property);
    let required = required_field_set(status);

    let listing_type = role.can_edit_listing_type().then_some(listing_type);

    let comment = required.comment.then(|| form.comment.trim().to_string());

    let deposit = required.deposit.then(|| DepositBlock {
        buyer_full_name: form.buyer_full_name.trim().to_string(),
        buyer_phone: form.buyer_phone.trim().to_string(),
        deposit_amount: form.deposit_amount,
        deposit_currency: form.deposit_currency.clone(),
        deposit_received_at: form.deposit_received_at,
        deposit_expires_at: form.deposit_expires_at,
        company_expected_income: form.company_expected_income,
        planned_contract_signed_at: form.planned_contract_signed_at,
    });

    let deal = required.deal.then(|| DealBlock {
        actual_sale_price: form.actual_sale_price,
        company_commission_amount: form.company_commission_amount,
        agents: (status == ModerationStatus::Sold)
            .then(|| form.sale_agents.iter().map(AgentAssignment::from).collect()),
    });

    let money_holder = (required.deposit || required.deal)
        .then_some(form.money_holder)
        .flatten();

    UpdatePayload {
        moderation_status: status,
        listing_type,
        comment,
        money_holder,
        deposit,
        deal,
    }
}
