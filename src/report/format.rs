//! Formatted terminal output for each command.
//!
//! We keep formatting code in one place so:
//! - the engines stay free of presentation concerns
//! - output changes are localized

use std::path::Path;

use crate::domain::{LoanProfile, PropertyFeatures, PropertyRecord};
use crate::fit::TrainOutput;
use crate::io::Dataset;
use crate::loan::{AmortizationYear, LoanAssessment};
use crate::models::FeatureImportance;
use crate::valuation::{MarketIndex, Valuation};

const LAKH: f64 = 1e5;
const CRORE: f64 = 1e7;

/// Whole rupees with Indian digit grouping: `₹1,23,45,678`.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("₹{amount}");
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}₹{}", group_indian(&digits))
}

/// Short lakh/crore form for headline figures: `₹1.25 Cr`, `₹48.60 L`.
pub fn format_lakh_crore(amount: f64) -> String {
    let abs = amount.abs();
    if abs >= CRORE {
        format!("₹{:.2} Cr", amount / CRORE)
    } else if abs >= LAKH {
        format!("₹{:.2} L", amount / LAKH)
    } else {
        format_inr(amount)
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub fn format_generate_summary(path: &Path, records: &[PropertyRecord]) -> String {
    let mut out = String::new();
    out.push_str("=== homeworth - dataset generated ===\n");
    out.push_str(&format!("Output: {}\n", path.display()));
    out.push_str(&format!("Rows: {}\n", records.len()));

    let market = MarketIndex::from_records(records);
    out.push_str(&format!("{:<10} {:>6} {:>12} {:>12} {:>12}\n", "city", "n", "min", "mean", "max"));
    for city in market.cities() {
        if let Some(r) = market.range(city) {
            out.push_str(&format!(
                "{:<10} {:>6} {:>12} {:>12} {:>12}\n",
                city.as_str(),
                r.count,
                format_lakh_crore(r.min),
                format_lakh_crore(r.mean),
                format_lakh_crore(r.max),
            ));
        }
    }
    out
}

/// Training summary: data, hold-out metrics, cross-validation, importances.
pub fn format_training_summary(dataset: &Dataset, output: &TrainOutput, model_path: &Path, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str("=== homeworth - price model trained ===\n");
    out.push_str(&format!("Algorithm: {}\n", output.pipeline.algorithm().display_name()));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        dataset.rows_read,
        dataset.records.len(),
        dataset.row_errors.len()
    ));
    let stats = &dataset.stats;
    out.push_str(&format!(
        "Prices: {} - {} (mean {}) across {} cities\n",
        format_lakh_crore(stats.price_min),
        format_lakh_crore(stats.price_max),
        format_lakh_crore(stats.price_mean),
        stats.cities
    ));
    out.push_str(&format!(
        "Split: train={} | test={}\n",
        output.n_train, output.n_test
    ));

    let h = &output.holdout;
    out.push_str("\nHold-out evaluation:\n");
    out.push_str(&format!("- MAE : {}\n", format_inr(h.mae)));
    out.push_str(&format!("- RMSE: {}\n", format_inr(h.rmse)));
    out.push_str(&format!("- R2  : {:.4}\n", h.r2));

    if let Some(cv) = &output.cross_validation {
        out.push_str(&format!("\n{}-fold cross-validation:\n", cv.folds.len()));
        for (i, m) in cv.folds.iter().enumerate() {
            out.push_str(&format!(
                "  fold {:<2} n={:<5} R2={:.4} MAE={}\n",
                i + 1,
                m.n,
                m.r2,
                format_inr(m.mae)
            ));
        }
        out.push_str(&format!("- R2 : {:.4} ± {:.4}\n", cv.r2_mean, cv.r2_std));
        out.push_str(&format!(
            "- MAE: {} ± {}\n",
            format_inr(cv.mae_mean),
            format_inr(cv.mae_std)
        ));
    }

    if let Some(grouped) = &output.grouped_importances {
        out.push_str("\nFeature importance (by column):\n");
        out.push_str(&format_importances(grouped, grouped.len()));
    }
    if let Some(ranked) = &output.importances {
        out.push_str(&format!("\nTop {top_n} encoded features:\n"));
        out.push_str(&format_importances(ranked, top_n));
    }

    out.push_str(&format!("\nModel saved: {}\n", model_path.display()));
    out
}

fn format_importances(items: &[FeatureImportance], top_n: usize) -> String {
    let mut out = String::new();
    for item in items.iter().take(top_n) {
        let bar = "#".repeat((item.importance * 40.0).round() as usize);
        out.push_str(format!("  {:<28} {:>6.2}% {bar}", item.feature, item.importance * 100.0).trim_end());
        out.push('\n');
    }
    out
}

pub fn format_valuation(features: &PropertyFeatures, valuation: &Valuation) -> String {
    let mut out = String::new();

    out.push_str("=== homeworth - property estimate ===\n");
    out.push_str(&format!(
        "{} | {} sqft | {} BHK | {} bath | parking={} | {} | {} yrs | {}\n",
        features.city,
        features.area_sqft,
        features.bhk,
        features.bathrooms,
        if features.parking { "yes" } else { "no" },
        features.location_type,
        features.property_age,
        features.furnishing,
    ));
    out.push_str(&format!(
        "\nEstimated price: {} ({})\n",
        format_inr(valuation.predicted_price),
        format_lakh_crore(valuation.predicted_price)
    ));

    match &valuation.market_range {
        Some(range) => {
            out.push_str(&format!(
                "Market range ({}, n={}): {} - {} (mean {})\n",
                valuation.city,
                range.count,
                format_lakh_crore(range.min),
                format_lakh_crore(range.max),
                format_lakh_crore(range.mean),
            ));
            if valuation.within_market_range == Some(false) {
                out.push_str("Note: estimate lies outside the observed range for this city.\n");
            }
        }
        None => out.push_str(&format!("Market range: no data for {}\n", valuation.city)),
    }

    out.push_str(&format!(
        "\nForecast at {:.1}% annual growth:\n",
        valuation.growth_rate * 100.0
    ));
    for point in &valuation.forecast {
        out.push_str(&format!(
            "  {:>2} years  {:>18}  ({})\n",
            point.years,
            format_inr(point.value),
            format_lakh_crore(point.value)
        ));
    }
    out
}

pub fn format_loan(profile: &LoanProfile, assessment: &LoanAssessment, schedule: Option<&[AmortizationYear]>) -> String {
    let a = assessment;
    let mut out = String::new();

    out.push_str("=== homeworth - loan assessment ===\n");
    out.push_str(&format!(
        "Borrower: age {} | {} | income {}/month | existing EMI {}\n",
        profile.age,
        profile.employment.as_str(),
        format_inr(profile.monthly_income),
        format_inr(profile.existing_emi),
    ));
    out.push_str(&format!(
        "Loan: {} over {} years\n",
        format_inr(profile.loan_amount),
        profile.tenure_years
    ));

    out.push_str("\nRatios:\n");
    out.push_str(&format!("- Debt-to-income : {}\n", pct(a.debt_to_income)));
    out.push_str(&format!("- Loan-to-income : {:.2}x annual\n", a.loan_to_income));
    out.push_str(&format!("- EMI-to-income  : {}\n", pct(a.emi_to_income)));
    out.push_str(&format!("- All EMIs/income: {}\n", pct(a.total_obligation_ratio)));

    out.push_str("\nResult:\n");
    out.push_str(&format!("- Risk category : {}\n", a.risk.as_str()));
    out.push_str(&format!("- Interest rate : {:.2}%\n", a.interest_rate));
    out.push_str(&format!("- Monthly EMI   : {}\n", format_inr(a.emi)));
    out.push_str(&format!("- Affordability : {}\n", a.affordability.as_str()));
    out.push_str(&format!("- Total payable : {}\n", format_inr(a.total_payable)));
    out.push_str(&format!("- Total interest: {}\n", format_inr(a.total_interest)));

    for note in &a.notes {
        out.push_str(&format!("Note: {note}\n"));
    }

    if let Some(rows) = schedule {
        out.push_str("\nRepayment schedule:\n");
        out.push_str(&format!("{:>4} {:>16} {:>16} {:>16}\n", "year", "principal", "interest", "balance"));
        out.push_str(&format!("{:-<4} {:-<16} {:-<16} {:-<16}\n", "", "", "", ""));
        for row in rows {
            out.push_str(&format!(
                "{:>4} {:>16} {:>16} {:>16}\n",
                row.year,
                format_inr(row.principal_paid),
                format_inr(row.interest_paid),
                format_inr(row.closing_balance),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Affordability, City, EmploymentType, Furnishing, LocationType, RiskCategory};
    use crate::valuation::{ForecastPoint, MarketRange};

    #[test]
    fn indian_grouping() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.4), "₹999");
        assert_eq!(format_inr(1_000.0), "₹1,000");
        assert_eq!(format_inr(100_000.0), "₹1,00,000");
        assert_eq!(format_inr(12_345_678.0), "₹1,23,45,678");
        assert_eq!(format_inr(-2_500_000.0), "-₹25,00,000");
        assert_eq!(format_inr(17_356.46), "₹17,356");
    }

    #[test]
    fn lakh_crore_short_form() {
        assert_eq!(format_lakh_crore(12_500_000.0), "₹1.25 Cr");
        assert_eq!(format_lakh_crore(4_860_000.0), "₹48.60 L");
        assert_eq!(format_lakh_crore(75_000.0), "₹75,000");
    }

    #[test]
    fn training_summary_shows_dataset_prices() {
        use crate::config::MarketConfig;
        use crate::data::{SampleConfig, generate_sample};
        use crate::domain::{Algorithm, GeneratorVariant};
        use crate::fit::{TrainConfig, train};
        use crate::io::DatasetStats;
        use crate::models::ModelSettings;

        let sample = SampleConfig {
            count: 120,
            ..SampleConfig::new(GeneratorVariant::Basic)
        };
        let records = generate_sample(&MarketConfig::default(), &sample).unwrap();
        let config = TrainConfig {
            model: ModelSettings {
                algorithm: Algorithm::Linear,
                ..ModelSettings::default()
            },
            cv_folds: 0,
            ..TrainConfig::default()
        };
        let output = train(&records, &config).unwrap();
        let dataset = Dataset {
            rows_read: records.len(),
            row_errors: Vec::new(),
            stats: DatasetStats {
                price_min: 2_500_000.0,
                price_max: 60_000_000.0,
                price_mean: 12_000_000.0,
                cities: 10,
            },
            records,
        };

        let text = format_training_summary(&dataset, &output, Path::new("model.json"), 5);
        assert!(text.contains("Prices: ₹25.00 L - ₹6.00 Cr (mean ₹1.20 Cr) across 10 cities"), "{text}");
        assert!(text.contains("Split: train=96 | test=24"));
        assert!(text.contains("Model saved: model.json"));
    }

    #[test]
    fn valuation_report_lists_forecast() {
        let features = PropertyFeatures {
            city: City::Pune,
            area_sqft: 1000,
            bhk: 2,
            bathrooms: 2,
            parking: true,
            location_type: LocationType::Standard,
            property_age: 5,
            furnishing: Furnishing::Furnished,
        };
        let valuation = Valuation {
            city: City::Pune,
            predicted_price: 9_000_000.0,
            market_range: Some(MarketRange {
                min: 3_000_000.0,
                mean: 9_500_000.0,
                max: 30_000_000.0,
                count: 500,
            }),
            within_market_range: Some(true),
            growth_rate: 0.08,
            forecast: vec![ForecastPoint {
                years: 3,
                value: 11_337_408.0,
            }],
        };
        let text = format_valuation(&features, &valuation);
        assert!(text.contains("₹90,00,000"));
        assert!(text.contains("8.0% annual growth"));
        assert!(text.contains("₹1,13,37,408"));
        assert!(!text.contains("outside the observed range"));
    }

    #[test]
    fn loan_report_includes_schedule_when_requested() {
        let profile = LoanProfile {
            age: 30,
            monthly_income: 50_000.0,
            employment: EmploymentType::Salaried,
            existing_emi: 10_000.0,
            loan_amount: 2_000_000.0,
            tenure_years: 20,
        };
        let assessment = LoanAssessment {
            debt_to_income: 0.2,
            loan_to_income: 3.33,
            risk: RiskCategory::Excellent,
            interest_rate: 8.5,
            emi: 17_356.46,
            emi_to_income: 0.347,
            total_obligation_ratio: 0.547,
            affordability: Affordability::Manageable,
            total_payable: 4_165_550.0,
            total_interest: 2_165_550.0,
            notes: vec![],
        };
        let schedule = [AmortizationYear {
            year: 1,
            principal_paid: 40_000.0,
            interest_paid: 168_000.0,
            closing_balance: 1_960_000.0,
        }];

        let without = format_loan(&profile, &assessment, None);
        assert!(without.contains("Excellent"));
        assert!(without.contains("8.50%"));
        assert!(without.contains("₹17,356"));
        assert!(!without.contains("Repayment schedule"));

        let with = format_loan(&profile, &assessment, Some(&schedule));
        assert!(with.contains("Repayment schedule"));
        assert!(with.contains("₹19,60,000"));
    }
}
