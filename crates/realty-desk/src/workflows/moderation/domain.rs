use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for listings owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Staff role of the user acting on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
    Superadmin,
}

impl Role {
    /// Only administrators may promote or demote a listing.
    pub const fn can_edit_listing_type(self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Superadmin => "superadmin",
        }
    }
}

/// Publication and deal state of a listing as seen by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Draft,
    Pending,
    Approved,
    Deposit,
    Sold,
    SoldByOwner,
    Rented,
    Denied,
    Deleted,
    Rejected,
}

impl ModerationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationStatus::Draft => "draft",
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Deposit => "deposit",
            ModerationStatus::Sold => "sold",
            ModerationStatus::SoldByOwner => "sold_by_owner",
            ModerationStatus::Rented => "rented",
            ModerationStatus::Denied => "denied",
            ModerationStatus::Deleted => "deleted",
            ModerationStatus::Rejected => "rejected",
        }
    }

    /// Text shown next to the option in status pickers.
    pub const fn display_name(self) -> &'static str {
        match self {
            ModerationStatus::Draft => "Draft",
            ModerationStatus::Pending => "Pending review",
            ModerationStatus::Approved => "Approved",
            ModerationStatus::Deposit => "Deposit taken",
            ModerationStatus::Sold => "Sold",
            ModerationStatus::SoldByOwner => "Sold by owner",
            ModerationStatus::Rented => "Rented",
            ModerationStatus::Denied => "Denied",
            ModerationStatus::Deleted => "Deleted",
            ModerationStatus::Rejected => "Rejected",
        }
    }
}

/// Promotion tier of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Regular,
    Vip,
    Urgent,
}

impl ListingType {
    pub const fn is_promoted(self) -> bool {
        matches!(self, ListingType::Vip | ListingType::Urgent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    Sale,
    Rent,
}

/// Party holding the deposit or the sale proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyHolder {
    Company,
    Owner,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleAgentRole {
    Main,
    Assistant,
    Partner,
}

/// Agent credited on a closed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAgent {
    pub agent_id: u64,
    pub role: SaleAgentRole,
    pub commission_amount: Option<i64>,
}

/// Subset of a backend listing read and written by the moderation and map workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    #[serde(default)]
    pub title: String,
    pub moderation_status: ModerationStatus,
    pub listing_type: ListingType,
    pub offer_type: OfferType,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub money_holder: Option<MoneyHolder>,
    #[serde(default)]
    pub deposit_amount: Option<i64>,
    #[serde(default)]
    pub deposit_currency: Option<String>,
    #[serde(default)]
    pub deposit_received_at: Option<NaiveDate>,
    #[serde(default)]
    pub deposit_expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub actual_sale_price: Option<i64>,
    #[serde(default)]
    pub company_commission_amount: Option<i64>,
    #[serde(default)]
    pub buyer_full_name: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    #[serde(default)]
    pub planned_contract_signed_at: Option<NaiveDate>,
    #[serde(default)]
    pub company_expected_income: Option<i64>,
    #[serde(default)]
    pub sale_agents: Vec<SaleAgent>,
}

impl Property {
    /// Minimal listing as created by the backend before any deal data exists.
    pub fn new(
        id: impl Into<String>,
        moderation_status: ModerationStatus,
        listing_type: ListingType,
        offer_type: OfferType,
    ) -> Self {
        Self {
            id: PropertyId(id.into()),
            title: String::new(),
            moderation_status,
            listing_type,
            offer_type,
            latitude: None,
            longitude: None,
            money_holder: None,
            deposit_amount: None,
            deposit_currency: None,
            deposit_received_at: None,
            deposit_expires_at: None,
            actual_sale_price: None,
            company_commission_amount: None,
            buyer_full_name: None,
            buyer_phone: None,
            planned_contract_signed_at: None,
            company_expected_income: None,
            sale_agents: Vec::new(),
        }
    }

    /// Returns a copy with the fields present in `update` applied on top.
    pub fn merged(&self, update: &PropertyUpdate) -> Property {
        let mut next = self.clone();

        if let Some(title) = &update.title {
            next.title = title.clone();
        }
        if let Some(status) = update.moderation_status {
            next.moderation_status = status;
        }
        if let Some(listing_type) = update.listing_type {
            next.listing_type = listing_type;
        }
        if let Some(offer_type) = update.offer_type {
            next.offer_type = offer_type;
        }
        merge_option(&mut next.latitude, update.latitude);
        merge_option(&mut next.longitude, update.longitude);
        merge_option(&mut next.money_holder, update.money_holder);
        merge_option(&mut next.deposit_amount, update.deposit_amount);
        merge_option(&mut next.deposit_currency, update.deposit_currency.clone());
        merge_option(&mut next.deposit_received_at, update.deposit_received_at);
        merge_option(&mut next.deposit_expires_at, update.deposit_expires_at);
        merge_option(&mut next.actual_sale_price, update.actual_sale_price);
        merge_option(
            &mut next.company_commission_amount,
            update.company_commission_amount,
        );
        merge_option(&mut next.buyer_full_name, update.buyer_full_name.clone());
        merge_option(&mut next.buyer_phone, update.buyer_phone.clone());
        merge_option(
            &mut next.planned_contract_signed_at,
            update.planned_contract_signed_at,
        );
        merge_option(
            &mut next.company_expected_income,
            update.company_expected_income,
        );
        if let Some(agents) = &update.sale_agents {
            next.sale_agents = agents.clone();
        }

        next
    }
}

fn merge_option<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}

/// Partial listing representation returned by the backend after a moderation update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub moderation_status: Option<ModerationStatus>,
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    #[serde(default)]
    pub offer_type: Option<OfferType>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub money_holder: Option<MoneyHolder>,
    #[serde(default)]
    pub deposit_amount: Option<i64>,
    #[serde(default)]
    pub deposit_currency: Option<String>,
    #[serde(default)]
    pub deposit_received_at: Option<NaiveDate>,
    #[serde(default)]
    pub deposit_expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub actual_sale_price: Option<i64>,
    #[serde(default)]
    pub company_commission_amount: Option<i64>,
    #[serde(default)]
    pub buyer_full_name: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    #[serde(default)]
    pub planned_contract_signed_at: Option<NaiveDate>,
    #[serde(default)]
    pub company_expected_income: Option<i64>,
    #[serde(default, alias = "agents")]
    pub sale_agents: Option<Vec<SaleAgent>>,
}
