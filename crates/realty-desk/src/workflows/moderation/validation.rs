use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ModerationStatus, MoneyHolder, SaleAgent};

/// Supplementary data that must accompany a status choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequiredFields {
    pub comment: bool,
    pub deal: bool,
    pub deposit: bool,
}

impl RequiredFields {
    pub const fn any(self) -> bool {
        self.comment || self.deal || self.deposit
    }
}

pub const fn required_field_set(status: ModerationStatus) -> RequiredFields {
    use ModerationStatus::*;

    RequiredFields {
        comment: matches!(status, Sold | SoldByOwner | Rented | Denied | Deleted),
        deal: matches!(status, Sold | Rented),
        deposit: matches!(status, Deposit | Sold),
    }
}

/// Values captured by the moderation modal or the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationForm {
    pub comment: String,
    pub buyer_full_name: String,
    pub buyer_phone: String,
    pub deposit_amount: Option<i64>,
    pub deposit_currency: Option<String>,
    pub deposit_received_at: Option<NaiveDate>,
    pub deposit_expires_at: Option<NaiveDate>,
    pub money_holder: Option<MoneyHolder>,
    pub company_expected_income: Option<i64>,
    pub planned_contract_signed_at: Option<NaiveDate>,
    pub actual_sale_price: Option<i64>,
    pub company_commission_amount: Option<i64>,
    pub sale_agents: Vec<SaleAgent>,
}

/// Form inputs referenced by validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Comment,
    BuyerFullName,
    BuyerPhone,
    DepositAmount,
    DepositReceivedAt,
    DepositMoneyHolder,
    CompanyExpectedIncome,
    PlannedContractSignedAt,
    ActualSalePrice,
    CompanyCommissionAmount,
    DealMoneyHolder,
    SaleAgents,
}

/// First failing check of a moderation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: FormField,
    pub message: &'static str,
}

impl ValidationError {
    const fn new(field: FormField, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Checks the blocks required by `status`, stopping at the first failure.
pub fn validate(status: ModerationStatus, form: &ModerationForm) -> Result<(), ValidationError> {
    let required = required_field_set(status);

    if required.comment && form.comment.trim().is_empty() {
        return Err(ValidationError::new(
            FormField::Comment,
            "a comment is required for this status",
        ));
    }

    if required.deposit {
        validate_deposit(form)?;
    }

    if required.deal {
        validate_deal(status, form)?;
    }

    Ok(())
}

fn validate_deposit(form: &ModerationForm) -> Result<(), ValidationError> {
    if form.buyer_full_name.trim().is_empty() {
        return Err(ValidationError::new(
            FormField::BuyerFullName,
            "enter the buyer's full name",
        ));
    }
    if form.buyer_phone.trim().is_empty() {
        return Err(ValidationError::new(
            FormField::BuyerPhone,
            "enter the buyer's phone number",
        ));
    }
    if !form.deposit_amount.is_some_and(|amount| amount > 0) {
        return Err(ValidationError::new(
            FormField::DepositAmount,
            "deposit amount must be greater than zero",
        ));
    }
    if form.deposit_received_at.is_none() {
        return Err(ValidationError::new(
            FormField::DepositReceivedAt,
            "select the date the deposit was received",
        ));
    }
    if form.money_holder.is_none() {
        return Err(ValidationError::new(
            FormField::DepositMoneyHolder,
            "select who holds the deposit",
        ));
    }
    if !form.company_expected_income.is_some_and(|income| income >= 0) {
        return Err(ValidationError::new(
            FormField::CompanyExpectedIncome,
            "company expected income cannot be negative",
        ));
    }
    if form.planned_contract_signed_at.is_none() {
        return Err(ValidationError::new(
            FormField::PlannedContractSignedAt,
            "select the planned contract signing date",
        ));
    }

    Ok(())
}

fn validate_deal(status: ModerationStatus, form: &ModerationForm) -> Result<(), ValidationError> {
    if !form.actual_sale_price.is_some_and(|price| price > 0) {
        return Err(ValidationError::new(
            FormField::ActualSalePrice,
            "actual deal price must be greater than zero",
        ));
    }
    if !form
        .company_commission_amount
        .is_some_and(|commission| commission >= 0)
    {
        return Err(ValidationError::new(
            FormField::CompanyCommissionAmount,
            "company commission cannot be negative",
        ));
    }
    if form.money_holder.is_none() {
        return Err(ValidationError::new(
            FormField::DealMoneyHolder,
            "select who holds the money",
        ));
    }
    if status == ModerationStatus::Sold && form.sale_agents.is_empty() {
        return Err(ValidationError::new(
            FormField::SaleAgents,
            "select at least one agent for the sale",
        ));
    }

    Ok(())
}
