//! State income tax withholding.
//!
//! The standard deduction and personal exemption carried on the first row
//! of the state table are subtracted from adjusted annual income before the
//! shared bracket walk. The result is annual; the caller de-annualizes it.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::TaxTables;
use crate::models::{AuditStep, AuditWarning, FilingStatus};

use super::brackets::apply_brackets;
use super::common::non_negative;

/// The result of a state withholding calculation.
#[derive(Debug, Clone)]
pub struct StateWithholdingResult {
    /// Annual state tax, unrounded.
    pub annual_tax: Decimal,
    /// Income remaining after deduction and exemption.
    pub taxable_income: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Set when the state has no table for the year and status.
    pub warning: Option<AuditWarning>,
}

/// Calculates annual state income tax for a state and filing status.
///
/// States with no bracket table (including states without an income tax)
/// yield zero.
pub fn calculate_state_withholding(
    tables: &TaxTables,
    tax_year: i32,
    adjusted_annual_income: Decimal,
    state_code: &str,
    filing_status: FilingStatus,
    step_number: u32,
) -> StateWithholdingResult {
    let code = state_code.trim().to_uppercase();
    let rows = tables.state_brackets(tax_year, &code, filing_status);

    let (standard_deduction, personal_exemption) = rows
        .first()
        .map(|row| (row.standard_deduction, row.personal_exemption))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    let taxable_income =
        non_negative(adjusted_annual_income - standard_deduction - personal_exemption);

    let warning = if rows.is_empty() {
        debug!(
            state = %code,
            tax_year,
            filing_status = filing_status.as_str(),
            "No state bracket table; state withholding is zero"
        );
        Some(AuditWarning::new(
            "STATE_BRACKETS_MISSING",
            format!(
                "No {} brackets for {} in {}; state withholding set to zero",
                code, filing_status, tax_year
            ),
            "low",
        ))
    } else {
        None
    };

    let computation = apply_brackets(taxable_income, rows);

    let audit_step = AuditStep {
        step_number,
        rule_id: "state_income_tax".to_string(),
        rule_name: "State Income Tax Withholding".to_string(),
        authority: format!("{} withholding schedule ({})", code, tax_year),
        input: serde_json::json!({
            "adjusted_annual_income": adjusted_annual_income.normalize().to_string(),
            "state_code": code,
            "filing_status": filing_status.as_str(),
            "standard_deduction": standard_deduction.normalize().to_string(),
            "personal_exemption": personal_exemption.normalize().to_string(),
            "tax_year": tax_year
        }),
        output: serde_json::json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "marginal_tax": computation.marginal_tax.normalize().to_string(),
            "base_tax": computation.base_tax.normalize().to_string(),
            "matched_bracket": computation.matched_bracket,
            "annual_tax": computation.annual_tax.normalize().to_string()
        }),
        reasoning: format!(
            "{}: ${} - ${} deduction - ${} exemption = ${} taxable; marginal ${} + base ${} = ${} annual",
            code,
            adjusted_annual_income.normalize(),
            standard_deduction.normalize(),
            personal_exemption.normalize(),
            taxable_income.normalize(),
            computation.marginal_tax.normalize(),
            computation.base_tax.normalize(),
            computation.annual_tax.normalize()
        ),
    };

    StateWithholdingResult {
        annual_tax: computation.annual_tax,
        taxable_income,
        audit_step,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn load_tables() -> TaxTables {
        TaxTables::load("./config/tax_tables").expect("Failed to load tax tables")
    }

    #[test]
    fn test_california_single() {
        let tables = load_tables();
        let result =
            calculate_state_withholding(&tables, 2024, dec("52000"), "CA", FilingStatus::Single, 3);

        // 52000 - 5540 - 149 = 46311
        assert_eq!(result.taxable_income, dec("46311"));
        // walk 1356.22 + base 992.26
        assert_eq!(result.annual_tax, dec("2348.48"));
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_state_code_is_case_insensitive() {
        let tables = load_tables();
        let result =
            calculate_state_withholding(&tables, 2024, dec("52000"), " ca ", FilingStatus::Single, 3);
        assert_eq!(result.annual_tax, dec("2348.48"));
    }

    #[test]
    fn test_income_below_deduction_is_zero() {
        let tables = load_tables();
        let result =
            calculate_state_withholding(&tables, 2024, dec("5000"), "CA", FilingStatus::Single, 3);

        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.annual_tax, Decimal::ZERO);
    }

    #[test]
    fn test_state_without_table_is_zero() {
        let tables = load_tables();
        let result =
            calculate_state_withholding(&tables, 2024, dec("52000"), "NV", FilingStatus::Single, 3);

        assert_eq!(result.annual_tax, Decimal::ZERO);
        assert_eq!(
            result.warning.map(|w| w.code),
            Some("STATE_BRACKETS_MISSING".to_string())
        );
    }

    #[test]
    fn test_missing_filing_status_is_zero() {
        let tables = load_tables();
        let result = calculate_state_withholding(
            &tables,
            2024,
            dec("52000"),
            "CA",
            FilingStatus::MarriedFilingSeparately,
            3,
        );
        assert_eq!(result.annual_tax, Decimal::ZERO);
    }
}
