//! Monthly payment estimate shown next to a listing's price.

use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: u32 = 12;
const MAX_TERM_YEARS: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MortgageRequest {
    pub price: i64,
    #[serde(default)]
    pub down_payment: i64,
    /// Nominal yearly rate in percent, e.g. `12.5`.
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MortgageQuote {
    pub loan_amount: i64,
    pub months: u32,
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MortgageError {
    #[error("price must be positive")]
    NonPositivePrice,
    #[error("down payment must be between 0 and the price")]
    InvalidDownPayment,
    #[error("interest rate must be a non-negative number")]
    InvalidRate,
    #[error("term must be between 1 and {MAX_TERM_YEARS} years")]
    InvalidTerm,
}

/// Annuity quote: equal monthly payments covering principal and interest.
pub fn quote(request: &MortgageRequest) -> Result<MortgageQuote, MortgageError> {
    if request.price <= 0 {
        return Err(MortgageError::NonPositivePrice);
    }
    if request.down_payment < 0 || request.down_payment > request.price {
        return Err(MortgageError::InvalidDownPayment);
    }
    if !request.annual_rate_percent.is_finite() || request.annual_rate_percent < 0.0 {
        return Err(MortgageError::InvalidRate);
    }
    if request.term_years == 0 || request.term_years > MAX_TERM_YEARS {
        return Err(MortgageError::InvalidTerm);
    }

    let loan_amount = request.price - request.down_payment;
    let months = request.term_years * MONTHS_PER_YEAR;
    let principal = loan_amount as f64;
    let monthly_rate = request.annual_rate_percent / 100.0 / f64::from(MONTHS_PER_YEAR);

    let monthly_payment = if monthly_rate == 0.0 {
        principal / f64::from(months)
    } else {
        let growth = (1.0 + monthly_rate).powi(months as i32);
        principal * monthly_rate * growth / (growth - 1.0)
    };

    let total_payment = monthly_payment * f64::from(months);

    Ok(MortgageQuote {
        loan_amount,
        months,
        monthly_payment: round_cents(monthly_payment),
        total_payment: round_cents(total_payment),
        total_interest: round_cents(total_payment - principal),
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rate: f64) -> MortgageRequest {
        MortgageRequest {
            price: 120_000,
            down_payment: 20_000,
            annual_rate_percent: rate,
            term_years: 10,
        }
    }

    #[test]
    fn annuity_payment_matches_reference_value() {
        let quote = quote(&request(12.0)).expect("valid request");
        assert_eq!(quote.loan_amount, 100_000);
        assert_eq!(quote.months, 120);
        assert!((quote.monthly_payment - 1434.71).abs() < 0.01);
        assert!(quote.total_interest > 0.0);
    }

    #[test]
    fn zero_rate_amortizes_linearly() {
        let quote = quote(&request(0.0)).expect("valid request");
        assert!((quote.monthly_payment - 833.33).abs() < 0.01);
        assert!(quote.total_interest.abs() < 0.01);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let mut bad_down = request(10.0);
        bad_down.down_payment = 130_000;
        assert_eq!(quote(&bad_down), Err(MortgageError::InvalidDownPayment));

        let mut bad_term = request(10.0);
        bad_term.term_years = 0;
        assert_eq!(quote(&bad_term), Err(MortgageError::InvalidTerm));

        assert_eq!(quote(&request(f64::NAN)), Err(MortgageError::InvalidRate));

        let mut free = request(10.0);
        free.price = 0;
        free.down_payment = 0;
        assert_eq!(quote(&free), Err(MortgageError::NonPositivePrice));
    }
}
