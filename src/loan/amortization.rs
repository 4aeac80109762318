//! Installment arithmetic: EMI and the repayment schedule.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Equated monthly installment for a fully amortizing loan.
///
/// `EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r = annual_rate_pct / 12 / 100`
/// and `n = tenure_years * 12`. A zero rate degenerates to `P / n`.
pub fn emi(principal: f64, annual_rate_pct: f64, tenure_years: u32) -> Result<f64, EngineError> {
    if !(principal.is_finite() && principal > 0.0) {
        return Err(EngineError::invalid("loan amount", format!("{principal} must be positive")));
    }
    if !(annual_rate_pct.is_finite() && annual_rate_pct >= 0.0) {
        return Err(EngineError::invalid(
            "interest rate",
            format!("{annual_rate_pct} must be non-negative"),
        ));
    }
    let n = f64::from(month_count(tenure_years)?);
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return Ok(principal / n);
    }
    let growth = (1.0 + r).powf(n);
    let installment = principal * r * growth / (growth - 1.0);
    if !installment.is_finite() {
        return Err(EngineError::NonFinite { what: "EMI" });
    }
    Ok(installment)
}

/// Number of monthly installments in `tenure_years`.
pub fn month_count(tenure_years: u32) -> Result<u32, EngineError> {
    if tenure_years == 0 {
        return Err(EngineError::invalid("tenure", "must be at least 1 year"));
    }
    tenure_years
        .checked_mul(12)
        .ok_or_else(|| EngineError::invalid("tenure", format!("{tenure_years} years overflows the month count")))
}

fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 12.0 / 100.0
}

/// Repayment totals for one loan year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub closing_balance: f64,
}

/// Month-by-month amortization aggregated per year.
///
/// The final installment absorbs rounding so the closing balance ends at zero.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    tenure_years: u32,
) -> Result<Vec<AmortizationYear>, EngineError> {
    let installment = emi(principal, annual_rate_pct, tenure_years)?;
    let r = monthly_rate(annual_rate_pct);
    let months = month_count(tenure_years)?;

    let mut balance = principal;
    let mut years = Vec::with_capacity(tenure_years as usize);
    let mut current = AmortizationYear {
        year: 1,
        principal_paid: 0.0,
        interest_paid: 0.0,
        closing_balance: principal,
    };

    for month in 1..=months {
        let interest = balance * r;
        let principal_part = if month == months { balance } else { installment - interest };
        balance -= principal_part;

        current.interest_paid += interest;
        current.principal_paid += principal_part;
        current.closing_balance = balance.max(0.0);

        if month % 12 == 0 {
            years.push(current);
            current = AmortizationYear {
                year: month / 12 + 1,
                principal_paid: 0.0,
                interest_paid: 0.0,
                closing_balance: balance,
            };
        }
    }
    Ok(years)
}
