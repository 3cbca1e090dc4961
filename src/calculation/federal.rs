//! Federal income tax withholding.
//!
//! Applies the annual federal bracket table for the employee's filing
//! status to adjusted annual income, halves the result when the W-4
//! multiple-jobs checkbox is set, and de-annualizes it to a per-period
//! amount. Rounding is left to the caller.

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::TaxTables;
use crate::models::{AuditStep, AuditWarning, FilingStatus};

use super::brackets::apply_brackets;

/// The result of a federal withholding calculation.
#[derive(Debug, Clone)]
pub struct FederalWithholdingResult {
    /// Unrounded per-period federal withholding, excluding any additional
    /// amount the employee elected.
    pub per_period_amount: Decimal,
    /// Annual tax before de-annualization.
    pub annual_tax: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Set when no bracket table exists for the year and status.
    pub warning: Option<AuditWarning>,
}

/// Calculates per-period federal withholding.
///
/// # Arguments
///
/// * `tables` - Loaded bracket tables
/// * `tax_year` - Year whose table applies
/// * `adjusted_annual_income` - Annualized income after W-4 adjustments
/// * `filing_status` - Federal filing status
/// * `multiple_jobs` - W-4 step 2 checkbox; halves the annual tax
/// * `periods_per_year` - Pay periods used to de-annualize
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```no_run
/// use payroll_withholding::calculation::calculate_federal_withholding;
/// use payroll_withholding::config::TaxTables;
/// use payroll_withholding::models::FilingStatus;
/// use rust_decimal::Decimal;
///
/// let tables = TaxTables::load("./config/tax_tables").unwrap();
/// let result = calculate_federal_withholding(
///     &tables,
///     2024,
///     Decimal::from(50_000),
///     FilingStatus::Single,
///     false,
///     26,
///     2,
/// );
/// assert_eq!(result.annual_tax, Decimal::from(11_479));
/// ```
pub fn calculate_federal_withholding(
    tables: &TaxTables,
    tax_year: i32,
    adjusted_annual_income: Decimal,
    filing_status: FilingStatus,
    multiple_jobs: bool,
    periods_per_year: u32,
    step_number: u32,
) -> FederalWithholdingResult {
    let rows = tables.federal_brackets(tax_year, filing_status);

    let warning = if rows.is_empty() {
        warn!(
            tax_year,
            filing_status = filing_status.as_str(),
            "No federal bracket table; federal withholding is zero"
        );
        Some(AuditWarning::new(
            "FEDERAL_BRACKETS_MISSING",
            format!(
                "No federal brackets for {} in {}; federal withholding set to zero",
                filing_status, tax_year
            ),
            "high",
        ))
    } else {
        None
    };

    let computation = apply_brackets(adjusted_annual_income, rows);

    let annual_tax = if multiple_jobs {
        computation.annual_tax / Decimal::TWO
    } else {
        computation.annual_tax
    };

    let per_period_amount = if periods_per_year == 0 {
        Decimal::ZERO
    } else {
        annual_tax / Decimal::from(periods_per_year)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "federal_income_tax".to_string(),
        rule_name: "Federal Income Tax Withholding".to_string(),
        authority: format!("IRS Publication 15-T ({})", tax_year),
        input: serde_json::json!({
            "adjusted_annual_income": computation.income.normalize().to_string(),
            "filing_status": filing_status.as_str(),
            "multiple_jobs": multiple_jobs,
            "periods_per_year": periods_per_year,
            "tax_year": tax_year
        }),
        output: serde_json::json!({
            "marginal_tax": computation.marginal_tax.normalize().to_string(),
            "base_tax": computation.base_tax.normalize().to_string(),
            "matched_bracket": computation.matched_bracket,
            "annual_tax": annual_tax.normalize().to_string(),
            "per_period_amount": per_period_amount.normalize().to_string()
        }),
        reasoning: format!(
            "Federal: (marginal ${} + base ${}){} ÷ {} periods = ${}",
            computation.marginal_tax.normalize(),
            computation.base_tax.normalize(),
            if multiple_jobs { " ÷ 2" } else { "" },
            periods_per_year,
            per_period_amount.round_dp(4).normalize()
        ),
    };

    FederalWithholdingResult {
        per_period_amount,
        annual_tax,
        audit_step,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxBracketRow;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn load_tables() -> TaxTables {
        TaxTables::load("./config/tax_tables").expect("Failed to load tax tables")
    }

    #[test]
    fn test_single_filer_biweekly() {
        let tables = load_tables();
        let result = calculate_federal_withholding(
            &tables,
            2024,
            dec("50000"),
            FilingStatus::Single,
            false,
            26,
            2,
        );

        // (6053 + 5426) / 26
        assert_eq!(result.annual_tax, dec("11479"));
        assert_eq!(result.per_period_amount, dec("441.5"));
        assert!(result.warning.is_none());
        assert_eq!(result.audit_step.rule_id, "federal_income_tax");
        assert_eq!(result.audit_step.step_number, 2);
    }

    #[test]
    fn test_multiple_jobs_halves_annual_tax() {
        let tables = load_tables();
        let result = calculate_federal_withholding(
            &tables,
            2024,
            dec("50000"),
            FilingStatus::Single,
            true,
            26,
            2,
        );

        assert_eq!(result.annual_tax, dec("5739.5"));
        assert_eq!(result.per_period_amount, dec("220.75"));
    }

    #[test]
    fn test_zero_income_is_zero() {
        let tables = load_tables();
        let result = calculate_federal_withholding(
            &tables,
            2024,
            Decimal::ZERO,
            FilingStatus::MarriedFilingJointly,
            false,
            12,
            2,
        );

        assert_eq!(result.per_period_amount, Decimal::ZERO);
    }

    #[test]
    fn test_missing_table_yields_zero_with_warning() {
        let result = calculate_federal_withholding(
            &TaxTables::new(),
            2030,
            dec("80000"),
            FilingStatus::Single,
            false,
            26,
            2,
        );

        assert_eq!(result.per_period_amount, Decimal::ZERO);
        let warning = result.warning.expect("expected warning");
        assert_eq!(warning.code, "FEDERAL_BRACKETS_MISSING");
    }

    #[test]
    fn test_uses_inserted_table() {
        let mut tables = TaxTables::new();
        tables.insert_federal(
            2024,
            FilingStatus::HeadOfHousehold,
            vec![TaxBracketRow {
                bracket_min: Decimal::ZERO,
                bracket_max: None,
                tax_rate: dec("0.10"),
                base_tax: Decimal::ZERO,
                standard_deduction: Decimal::ZERO,
                personal_exemption: Decimal::ZERO,
            }],
        )
        .unwrap();

        let result = calculate_federal_withholding(
            &tables,
            2024,
            dec("52000"),
            FilingStatus::HeadOfHousehold,
            false,
            52,
            2,
        );

        assert_eq!(result.per_period_amount, dec("100"));
    }
}
