//! The internal withholding pipeline.
//!
//! Used whenever the external engine is unavailable. The pipeline is a pure
//! function of the profile, the pay event and the loaded tables: it touches
//! no storage and calling it twice with the same inputs gives the same
//! figures.

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::TaxTables;
use crate::models::{AuditStep, AuditWarning, PayEvent, TaxProfile, WithholdingBreakdown};

use super::common::{non_negative, round_to_cent};
use super::federal::calculate_federal_withholding;
use super::fica::{
    calculate_additional_medicare, calculate_medicare, calculate_social_security,
    calculate_state_disability,
};
use super::state::calculate_state_withholding;

/// Output of the internal pipeline.
#[derive(Debug, Clone)]
pub struct InternalCalculation {
    /// Per-category withholdings, each rounded to the cent.
    pub withholdings: WithholdingBreakdown,
    /// `gross × periods-per-year`.
    pub annualized_income: Decimal,
    /// Annualized income after W-4 adjustments, floored at zero.
    pub adjusted_annual_income: Decimal,
    /// Tax year whose tables were applied.
    pub tax_year: i32,
    /// Ordered calculation steps.
    pub audit_steps: Vec<AuditStep>,
    /// Conditions that zeroed or adjusted a category.
    pub warnings: Vec<AuditWarning>,
}

/// Picks the tax year to apply.
///
/// The pay date's year when tables exist for it; otherwise the latest
/// loaded year before it, or the earliest loaded year.
pub fn resolve_tax_year(tables: &TaxTables, pay_year: i32) -> (i32, Option<AuditWarning>) {
    let years = tables.years();

    if years.is_empty() || years.contains(&pay_year) {
        return (pay_year, None);
    }

    let fallback = years
        .iter()
        .copied()
        .filter(|year| *year < pay_year)
        .max()
        .or_else(|| years.iter().copied().min())
        .unwrap_or(pay_year);

    warn!(pay_year, fallback, "No tax tables for pay year; using nearest loaded year");

    (
        fallback,
        Some(AuditWarning::new(
            "TAX_YEAR_FALLBACK",
            format!("No tax tables for {}; applied {} tables", pay_year, fallback),
            "medium",
        )),
    )
}

/// Computes all withholding categories for one pay event.
///
/// Steps: annualize, apply W-4 adjustments, federal, state, Social
/// Security, Medicare, Additional Medicare, state disability, then round
/// each category and cap income taxes so the total never exceeds gross.
///
/// # Examples
///
/// ```no_run
/// use chrono::NaiveDate;
/// use payroll_withholding::calculation::compute_internal_withholding;
/// use payroll_withholding::config::TaxTables;
/// use payroll_withholding::models::{FilingStatus, PayEvent, PayFrequency, TaxProfile};
/// use rust_decimal::Decimal;
///
/// let tables = TaxTables::load("./config/tax_tables").unwrap();
/// let profile = TaxProfile::new("emp_001", FilingStatus::Single, "CA");
/// let event = PayEvent::new(
///     Decimal::from(2000),
///     PayFrequency::Biweekly,
///     NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
/// );
///
/// let result = compute_internal_withholding(&profile, &event, &tables);
/// assert_eq!(result.withholdings.social_security_employee, Decimal::new(12400, 2));
/// ```
pub fn compute_internal_withholding(
    profile: &TaxProfile,
    event: &PayEvent,
    tables: &TaxTables,
) -> InternalCalculation {
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();

    let (tax_year, year_warning) = resolve_tax_year(tables, event.tax_year());
    warnings.extend(year_warning);
    let rates = tables.statutory_rates(tax_year);

    let gross = event.gross_wages;
    let periods = event.pay_frequency.periods_per_year();
    let periods_dec = Decimal::from(periods);

    // Annualization and W-4 adjustments
    let annualized_income = gross * periods_dec;
    let adjusted_annual_income = non_negative(
        annualized_income + profile.w4_other_income
            - profile.w4_deductions
            - profile.w4_dependents_amount,
    );

    audit_steps.push(AuditStep {
        step_number: 1,
        rule_id: "annualization".to_string(),
        rule_name: "Annualize Wages".to_string(),
        authority: "IRS Publication 15-T, Worksheet 1A".to_string(),
        input: serde_json::json!({
            "gross_wages": gross.normalize().to_string(),
            "pay_frequency": event.pay_frequency.as_str(),
            "periods_per_year": periods,
            "w4_other_income": profile.w4_other_income.normalize().to_string(),
            "w4_deductions": profile.w4_deductions.normalize().to_string(),
            "w4_dependents_amount": profile.w4_dependents_amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "annualized_income": annualized_income.normalize().to_string(),
            "adjusted_annual_income": adjusted_annual_income.normalize().to_string()
        }),
        reasoning: format!(
            "${} × {} = ${}; + ${} other income - ${} deductions - ${} dependents = ${}",
            gross.normalize(),
            periods,
            annualized_income.normalize(),
            profile.w4_other_income.normalize(),
            profile.w4_deductions.normalize(),
            profile.w4_dependents_amount.normalize(),
            adjusted_annual_income.normalize()
        ),
    });

    // Federal
    let federal = if profile.is_exempt_federal {
        audit_steps.push(exemption_step(2, "federal", "W-4 exempt from federal withholding"));
        Decimal::ZERO
    } else {
        let result = calculate_federal_withholding(
            tables,
            tax_year,
            adjusted_annual_income,
            profile.filing_status,
            profile.w4_step2_checkbox,
            periods,
            2,
        );
        audit_steps.push(result.audit_step);
        warnings.extend(result.warning);
        result.per_period_amount + profile.additional_federal_withholding
    };

    // State
    let state = if profile.is_exempt_state {
        audit_steps.push(exemption_step(3, "state", "Exempt from state withholding"));
        Decimal::ZERO
    } else if !profile.has_state_withholding() {
        audit_steps.push(exemption_step(3, "state", "No state of residence on file"));
        Decimal::ZERO
    } else {
        let result = calculate_state_withholding(
            tables,
            tax_year,
            adjusted_annual_income,
            &profile.state_code,
            profile.state_filing_status,
            3,
        );
        audit_steps.push(result.audit_step);
        warnings.extend(result.warning);
        result.annual_tax / periods_dec + profile.additional_state_withholding
    };

    // Statutory taxes
    let social_security =
        calculate_social_security(gross, event.ytd_social_security_wages, rates, 4);
    let medicare = calculate_medicare(gross, rates, 5);
    let additional_medicare =
        calculate_additional_medicare(gross, event.ytd_gross_wages, rates, 6);
    let disability =
        calculate_state_disability(gross, event.ytd_gross_wages, &profile.state_code, rates, 7);

    let mut withholdings = WithholdingBreakdown {
        federal_income_tax: federal,
        state_income_tax: state,
        local_income_tax: Decimal::ZERO,
        social_security_employee: social_security.amount,
        medicare_employee: medicare.amount,
        medicare_additional: additional_medicare.amount,
        state_disability_insurance: disability.amount,
    }
    .map(round_to_cent);

    audit_steps.push(social_security.audit_step);
    audit_steps.push(medicare.audit_step);
    audit_steps.push(additional_medicare.audit_step);
    audit_steps.push(disability.audit_step);

    // Never withhold more than gross
    if let Some(warning) = cap_income_taxes(&mut withholdings, gross) {
        warnings.push(warning);
    }

    InternalCalculation {
        withholdings,
        annualized_income,
        adjusted_annual_income,
        tax_year,
        audit_steps,
        warnings,
    }
}

/// Reduces income tax categories so the total does not exceed gross.
///
/// Statutory taxes are left alone. Federal is kept first, then state, then
/// local: the remaining room goes to each in turn, so local is trimmed first.
/// Returns a warning when anything was reduced.
pub fn cap_income_taxes(
    withholdings: &mut WithholdingBreakdown,
    gross_wages: Decimal,
) -> Option<AuditWarning> {
    let total = withholdings.total();
    if total <= gross_wages {
        return None;
    }

    let statutory = withholdings.social_security_employee
        + withholdings.medicare_employee
        + withholdings.medicare_additional
        + withholdings.state_disability_insurance;

    let mut available = non_negative(gross_wages - statutory);

    for amount in [
        &mut withholdings.federal_income_tax,
        &mut withholdings.state_income_tax,
        &mut withholdings.local_income_tax,
    ] {
        *amount = (*amount).min(available);
        available -= *amount;
    }

    warn!(
        gross = %gross_wages,
        requested = %total,
        "Withholding exceeded gross wages; income taxes capped"
    );

    Some(AuditWarning::new(
        "WITHHOLDING_CAPPED_AT_GROSS",
        format!(
            "Computed withholding ${} exceeded gross ${}; income taxes reduced to ${}",
            total,
            gross_wages,
            withholdings.total()
        ),
        "high",
    ))
}

fn exemption_step(step_number: u32, jurisdiction: &str, reasoning: &str) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: format!("{}_income_tax", jurisdiction),
        rule_name: format!("{} Income Tax Exemption", capitalize(jurisdiction)),
        authority: "Employee withholding certificate".to_string(),
        input: serde_json::json!({ "jurisdiction": jurisdiction }),
        output: serde_json::json!({ "amount": "0" }),
        reasoning: reasoning.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilingStatus, PayFrequency};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn load_tables() -> TaxTables {
        TaxTables::load("./config/tax_tables").expect("Failed to load tax tables")
    }

    fn pay_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn biweekly(gross: &str) -> PayEvent {
        PayEvent::new(dec(gross), PayFrequency::Biweekly, pay_date())
    }

    #[test]
    fn test_exempt_federal_california_worker() {
        let tables = load_tables();
        let mut profile = TaxProfile::new("emp_001", FilingStatus::Single, "CA");
        profile.is_exempt_federal = true;

        let result = compute_internal_withholding(&profile, &biweekly("2000"), &tables);
        let w = &result.withholdings;

        assert_eq!(w.federal_income_tax, Decimal::ZERO);
        assert_eq!(w.social_security_employee, dec("124.00"));
        assert_eq!(w.medicare_employee, dec("29.00"));
        assert_eq!(w.medicare_additional, Decimal::ZERO);
        assert_eq!(w.state_disability_insurance, dec("18.00"));
        assert_eq!(w.state_income_tax, dec("90.33"));
        assert_eq!(w.local_income_tax, Decimal::ZERO);
        assert_eq!(result.annualized_income, dec("52000"));
        assert_eq!(result.tax_year, 2024);
    }

    #[test]
    fn test_additional_medicare_applies_above_threshold() {
        let tables = load_tables();
        let profile = TaxProfile::new("emp_002", FilingStatus::Single, "TX");
        let mut event = biweekly("2000");
        event.ytd_gross_wages = dec("250000");

        let result = compute_internal_withholding(&profile, &event, &tables);
        assert_eq!(result.withholdings.medicare_additional, dec("18.00"));
    }

    #[test]
    fn test_additional_medicare_follows_ytd_gross_wages() {
        let tables = load_tables();
        let profile = TaxProfile::new("emp_002", FilingStatus::Single, "TX");

        // 199000 + 3000 - 200000 = 2000 over
        let mut event = biweekly("3000");
        event.ytd_gross_wages = dec("199000");
        let result = compute_internal_withholding(&profile, &event, &tables);
        assert_eq!(result.withholdings.medicare_additional, dec("18.00"));

        // Medicare wages alone never trigger the surtax
        let mut event = biweekly("3000");
        event.ytd_medicare_wages = dec("250000");
        let result = compute_internal_withholding(&profile, &event, &tables);
        assert_eq!(result.withholdings.medicare_additional, Decimal::ZERO);
    }

    #[test]
    fn test_social_security_stops_at_wage_base() {
        let tables = load_tables();
        let profile = TaxProfile::new("emp_003", FilingStatus::Single, "TX");
        let mut event = biweekly("1000");
        event.ytd_social_security_wages = dec("160200");

        let result = compute_internal_withholding(&profile, &event, &tables);
        assert_eq!(result.withholdings.social_security_employee, Decimal::ZERO);
    }

    #[test]
    fn test_federal_includes_additional_withholding() {
        let tables = load_tables();
        let mut profile = TaxProfile::new("emp_004", FilingStatus::Single, "NONE");
        profile.additional_federal_withholding = dec("25");

        // 52000 annual: (6493 + 5426) / 26 = 458.42, plus 25
        let result = compute_internal_withholding(&profile, &biweekly("2000"), &tables);

        assert_eq!(result.withholdings.federal_income_tax, dec("483.42"));
        assert_eq!(result.withholdings.state_income_tax, Decimal::ZERO);
    }

    #[test]
    fn test_w4_adjustments_floor_at_zero() {
        let tables = load_tables();
        let mut profile = TaxProfile::new("emp_005", FilingStatus::Single, "NONE");
        profile.w4_deductions = dec("100000");

        let result = compute_internal_withholding(&profile, &biweekly("1000"), &tables);

        assert_eq!(result.adjusted_annual_income, Decimal::ZERO);
        assert_eq!(result.withholdings.federal_income_tax, Decimal::ZERO);
    }

    #[test]
    fn test_exempt_state_zeroes_state_but_keeps_sdi() {
        let tables = load_tables();
        let mut profile = TaxProfile::new("emp_006", FilingStatus::Single, "CA");
        profile.is_exempt_state = true;
        profile.additional_state_withholding = dec("10");

        let result = compute_internal_withholding(&profile, &biweekly("2000"), &tables);

        assert_eq!(result.withholdings.state_income_tax, Decimal::ZERO);
        assert_eq!(result.withholdings.state_disability_insurance, dec("18.00"));
    }

    #[test]
    fn test_every_category_is_rounded_to_cents() {
        let tables = load_tables();
        let profile = TaxProfile::new("emp_007", FilingStatus::Single, "CA");

        let result = compute_internal_withholding(&profile, &biweekly("1234.57"), &tables);
        let w = &result.withholdings;

        for amount in [
            w.federal_income_tax,
            w.state_income_tax,
            w.local_income_tax,
            w.social_security_employee,
            w.medicare_employee,
            w.medicare_additional,
            w.state_disability_insurance,
        ] {
            assert_eq!(amount, round_to_cent(amount));
        }
    }

    #[test]
    fn test_large_additional_withholding_is_capped_at_gross() {
        let tables = load_tables();
        let mut profile = TaxProfile::new("emp_008", FilingStatus::Single, "CA");
        profile.additional_federal_withholding = dec("5000");

        let result = compute_internal_withholding(&profile, &biweekly("1000"), &tables);

        assert_eq!(result.withholdings.total(), dec("1000"));
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.code == "WITHHOLDING_CAPPED_AT_GROSS")
        );
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let tables = load_tables();
        let profile = TaxProfile::new("emp_009", FilingStatus::MarriedFilingJointly, "CA");
        let event = biweekly("3100.10");

        let first = compute_internal_withholding(&profile, &event, &tables);
        let second = compute_internal_withholding(&profile, &event, &tables);

        assert_eq!(first.withholdings, second.withholdings);
        assert_eq!(first.audit_steps, second.audit_steps);
    }

    #[test]
    fn test_audit_steps_are_sequential() {
        let tables = load_tables();
        let profile = TaxProfile::new("emp_010", FilingStatus::Single, "CA");

        let result = compute_internal_withholding(&profile, &biweekly("2000"), &tables);
        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();

        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_unloaded_year_falls_back_to_latest_prior_year() {
        let tables = load_tables();
        let (year, warning) = resolve_tax_year(&tables, 2031);

        assert_eq!(year, 2025);
        assert_eq!(warning.map(|w| w.code), Some("TAX_YEAR_FALLBACK".to_string()));
    }

    #[test]
    fn test_loaded_year_is_used_directly() {
        let tables = load_tables();
        assert_eq!(resolve_tax_year(&tables, 2024), (2024, None));
    }

    #[test]
    fn test_cap_leaves_statutory_taxes_alone() {
        let mut withholdings = WithholdingBreakdown {
            federal_income_tax: dec("90"),
            state_income_tax: dec("30"),
            social_security_employee: dec("6.20"),
            medicare_employee: dec("1.45"),
            ..Default::default()
        };

        let warning = cap_income_taxes(&mut withholdings, dec("100"));

        assert!(warning.is_some());
        assert_eq!(withholdings.federal_income_tax, dec("90"));
        assert_eq!(withholdings.state_income_tax, dec("2.35"));
        assert_eq!(withholdings.social_security_employee, dec("6.20"));
        assert_eq!(withholdings.total(), dec("100"));
    }

    #[test]
    fn test_cap_is_noop_when_within_gross() {
        let mut withholdings = WithholdingBreakdown {
            federal_income_tax: dec("10"),
            ..Default::default()
        };

        assert!(cap_income_taxes(&mut withholdings, dec("100")).is_none());
        assert_eq!(withholdings.federal_income_tax, dec("10"));
    }
}
