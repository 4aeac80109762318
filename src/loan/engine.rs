//! Borrower risk tiering and affordability.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LoanPolicy, RiskTier};
use crate::domain::{Affordability, LoanProfile, RiskCategory};
use crate::error::EngineError;
use crate::loan::amortization::{emi, month_count};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAssessment {
    pub debt_to_income: f64,
    pub loan_to_income: f64,
    pub risk: RiskCategory,
    /// Annual rate in percent.
    pub interest_rate: f64,
    pub emi: f64,
    pub emi_to_income: f64,
    /// Existing plus new installments over monthly income.
    pub total_obligation_ratio: f64,
    pub affordability: Affordability,
    pub total_payable: f64,
    pub total_interest: f64,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoanEngine {
    policy: LoanPolicy,
}

impl LoanEngine {
    pub fn new(policy: LoanPolicy) -> Self {
        Self { policy }
    }

    pub fn evaluate(&self, profile: &LoanProfile) -> Result<LoanAssessment, EngineError> {
        self.validate(profile)?;
        if profile.monthly_income == 0.0 {
            return Err(EngineError::UndefinedRatio { ratio: "debt-to-income" });
        }

        let debt_to_income = profile.existing_emi / profile.monthly_income;
        let loan_to_income = profile.loan_amount / (profile.monthly_income * 12.0);
        let tier = self.tier_for(debt_to_income)?;
        let interest_rate = tier.rate();

        let installment = emi(profile.loan_amount, interest_rate, profile.tenure_years)?;
        let emi_to_income = installment / profile.monthly_income;
        let total_obligation_ratio = (profile.existing_emi + installment) / profile.monthly_income;
        let affordability = self.classify(emi_to_income);

        let months = f64::from(month_count(profile.tenure_years)?);
        let total_payable = installment * months;
        let total_interest = total_payable - profile.loan_amount;

        let mut notes = Vec::new();
        if loan_to_income > self.policy.max_lti {
            notes.push(format!(
                "Loan is {loan_to_income:.1}x annual income, above the {:.1}x guideline.",
                self.policy.max_lti
            ));
        }
        if total_obligation_ratio >= self.policy.manageable_below {
            notes.push(format!(
                "Existing and new installments together take {:.0}% of monthly income.",
                total_obligation_ratio * 100.0
            ));
        }

        debug!(
            debt_to_income,
            risk = tier.category.as_str(),
            interest_rate,
            emi = installment,
            "loan evaluation"
        );
        Ok(LoanAssessment {
            debt_to_income,
            loan_to_income,
            risk: tier.category,
            interest_rate,
            emi: installment,
            emi_to_income,
            total_obligation_ratio,
            affordability,
            total_payable,
            total_interest,
            notes,
        })
    }

    /// First tier whose exclusive `max_dti` bound lies above `dti`.
    pub fn tier_for(&self, dti: f64) -> Result<&RiskTier, EngineError> {
        self.policy
            .tiers
            .iter()
            .find(|t| t.max_dti.is_none_or(|max| dti < max))
            .ok_or_else(|| EngineError::MissingTableEntry {
                table: "risk tier",
                key: format!("dti {dti:.3}"),
            })
    }

    pub fn classify(&self, emi_to_income: f64) -> Affordability {
        if emi_to_income < self.policy.comfortable_below {
            Affordability::Comfortable
        } else if emi_to_income < self.policy.manageable_below {
            Affordability::Manageable
        } else {
            Affordability::Risky
        }
    }

    fn validate(&self, p: &LoanProfile) -> Result<(), EngineError> {
        let policy = &self.policy;
        if !(policy.min_age..=policy.max_age).contains(&p.age) {
            return Err(EngineError::invalid(
                "age",
                format!("{} is outside {}..={}", p.age, policy.min_age, policy.max_age),
            ));
        }
        if !(p.monthly_income.is_finite() && p.monthly_income >= 0.0) {
            return Err(EngineError::invalid("monthly income", "must be a non-negative amount"));
        }
        if !(p.existing_emi.is_finite() && p.existing_emi >= 0.0) {
            return Err(EngineError::invalid("existing EMI", "must be a non-negative amount"));
        }
        if !(p.loan_amount.is_finite() && p.loan_amount > 0.0) {
            return Err(EngineError::invalid("loan amount", "must be positive"));
        }
        if !(policy.min_tenure_years..=policy.max_tenure_years).contains(&p.tenure_years) {
            return Err(EngineError::invalid(
                "tenure",
                format!(
                    "{} years is outside {}..={}",
                    p.tenure_years, policy.min_tenure_years, policy.max_tenure_years
                ),
            ));
        }
        Ok(())
    }
}
