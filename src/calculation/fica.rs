//! Statutory payroll taxes: Social Security, Medicare, Additional Medicare
//! and state disability insurance.
//!
//! All amounts are per period and unrounded.

use rust_decimal::Decimal;

use crate::config::StatutoryRates;
use crate::models::AuditStep;

use super::common::non_negative;

/// The result of a statutory tax calculation.
#[derive(Debug, Clone)]
pub struct StatutoryTaxResult {
    /// The withholding amount for this period.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the employee share of Social Security.
///
/// `min(gross × rate, max(0, wage_base − ytd) × rate)`, so nothing is
/// withheld once year-to-date Social Security wages reach the wage base.
///
/// # Examples
///
/// ```
/// use payroll_withholding::calculation::calculate_social_security;
/// use payroll_withholding::config::StatutoryRates;
/// use rust_decimal::Decimal;
///
/// let rates = StatutoryRates::default();
/// let result = calculate_social_security(Decimal::from(2000), Decimal::ZERO, &rates, 4);
/// assert_eq!(result.amount, Decimal::from(124));
/// ```
pub fn calculate_social_security(
    gross_wages: Decimal,
    ytd_social_security_wages: Decimal,
    rates: &StatutoryRates,
    step_number: u32,
) -> StatutoryTaxResult {
    let rate = rates.social_security.rate;
    let wage_base = rates.social_security.wage_base;

    let remaining_base = non_negative(wage_base - ytd_social_security_wages);
    let amount = (gross_wages * rate).min(remaining_base * rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "social_security".to_string(),
        rule_name: "Social Security (OASDI)".to_string(),
        authority: "26 U.S.C. 3101(a)".to_string(),
        input: serde_json::json!({
            "gross_wages": gross_wages.normalize().to_string(),
            "ytd_social_security_wages": ytd_social_security_wages.normalize().to_string(),
            "rate": rate.normalize().to_string(),
            "wage_base": wage_base.normalize().to_string()
        }),
        output: serde_json::json!({
            "remaining_wage_base": remaining_base.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "Social Security: min(${} × {}, ${} remaining base × {}) = ${}",
            gross_wages.normalize(),
            rate.normalize(),
            remaining_base.normalize(),
            rate.normalize(),
            amount.normalize()
        ),
    };

    StatutoryTaxResult { amount, audit_step }
}

/// Calculates employee Medicare. There is no wage base.
pub fn calculate_medicare(
    gross_wages: Decimal,
    rates: &StatutoryRates,
    step_number: u32,
) -> StatutoryTaxResult {
    let rate = rates.medicare.rate;
    let amount = gross_wages * rate;

    let audit_step = AuditStep {
        step_number,
        rule_id: "medicare".to_string(),
        rule_name: "Medicare (HI)".to_string(),
        authority: "26 U.S.C. 3101(b)(1)".to_string(),
        input: serde_json::json!({
            "gross_wages": gross_wages.normalize().to_string(),
            "rate": rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "Medicare: ${} × {} = ${}",
            gross_wages.normalize(),
            rate.normalize(),
            amount.normalize()
        ),
    };

    StatutoryTaxResult { amount, audit_step }
}

/// Calculates Additional Medicare on wages above the threshold.
///
/// Only the part of this period's wages that pushes year-to-date gross
/// wages past the threshold is taxed: `min(max(0, ytd + gross − threshold),
/// gross) × rate`. The threshold does not depend on filing status.
pub fn calculate_additional_medicare(
    gross_wages: Decimal,
    ytd_gross_wages: Decimal,
    rates: &StatutoryRates,
    step_number: u32,
) -> StatutoryTaxResult {
    let rate = rates.additional_medicare.rate;
    let threshold = rates.additional_medicare.threshold;

    let total_wages = ytd_gross_wages + gross_wages;
    let excess = non_negative(total_wages - threshold).min(non_negative(gross_wages));
    let amount = excess * rate;

    let audit_step = AuditStep {
        step_number,
        rule_id: "additional_medicare".to_string(),
        rule_name: "Additional Medicare Tax".to_string(),
        authority: "26 U.S.C. 3101(b)(2)".to_string(),
        input: serde_json::json!({
            "gross_wages": gross_wages.normalize().to_string(),
            "ytd_gross_wages": ytd_gross_wages.normalize().to_string(),
            "threshold": threshold.normalize().to_string(),
            "rate": rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "wages_over_threshold": excess.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "Additional Medicare: ${} over ${} threshold × {} = ${}",
            excess.normalize(),
            threshold.normalize(),
            rate.normalize(),
            amount.normalize()
        ),
    };

    StatutoryTaxResult { amount, audit_step }
}

/// Calculates state disability insurance for the worker's state.
///
/// States without a configured program withhold nothing. Programs without a
/// wage base tax the full gross; otherwise only the wages below the base,
/// measured against year-to-date gross, are taxed.
pub fn calculate_state_disability(
    gross_wages: Decimal,
    ytd_gross_wages: Decimal,
    state_code: &str,
    rates: &StatutoryRates,
    step_number: u32,
) -> StatutoryTaxResult {
    let code = state_code.trim().to_uppercase();
    let program = rates.disability_program(&code);

    let (rate, wage_base, taxable) = match program {
        Some(program) => {
            let taxable = match program.wage_base {
                Some(base) => gross_wages.min(non_negative(base - ytd_gross_wages)),
                None => gross_wages,
            };
            (program.rate, program.wage_base, taxable)
        }
        None => (Decimal::ZERO, None, Decimal::ZERO),
    };

    let amount = taxable * rate;

    let reasoning = if program.is_some() {
        format!(
            "{} SDI: ${} taxable × {} = ${}",
            code,
            taxable.normalize(),
            rate.normalize(),
            amount.normalize()
        )
    } else {
        format!("{} has no state disability program", code)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "state_disability_insurance".to_string(),
        rule_name: "State Disability Insurance".to_string(),
        authority: format!("{} disability insurance program", code),
        input: serde_json::json!({
            "gross_wages": gross_wages.normalize().to_string(),
            "ytd_gross_wages": ytd_gross_wages.normalize().to_string(),
            "state_code": code,
            "rate": rate.normalize().to_string(),
            "wage_base": wage_base.map(|b| b.normalize().to_string())
        }),
        output: serde_json::json!({
            "taxable_wages": taxable.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    StatutoryTaxResult { amount, audit_step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisabilityProgram;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates() -> StatutoryRates {
        StatutoryRates::default()
    }

    #[test]
    fn test_social_security_below_base() {
        let result = calculate_social_security(dec("2000"), Decimal::ZERO, &rates(), 4);
        assert_eq!(result.amount, dec("124"));
        assert_eq!(result.audit_step.rule_id, "social_security");
    }

    #[test]
    fn test_social_security_at_wage_base_is_zero() {
        let result = calculate_social_security(dec("1000"), dec("160200"), &rates(), 4);
        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn test_social_security_above_wage_base_is_zero() {
        let result = calculate_social_security(dec("1000"), dec("170000"), &rates(), 4);
        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn test_social_security_crossing_wage_base() {
        // only 500 of the 1000 remains under the base
        let result = calculate_social_security(dec("1000"), dec("159700"), &rates(), 4);
        assert_eq!(result.amount, dec("31"));
    }

    #[test]
    fn test_medicare_has_no_cap() {
        let result = calculate_medicare(dec("2000"), &rates(), 5);
        assert_eq!(result.amount, dec("29"));

        let result = calculate_medicare(dec("500000"), &rates(), 5);
        assert_eq!(result.amount, dec("7250"));
    }

    #[test]
    fn test_additional_medicare_below_threshold() {
        let result = calculate_additional_medicare(dec("5000"), dec("150000"), &rates(), 6);
        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn test_additional_medicare_entirely_above_threshold() {
        let result = calculate_additional_medicare(dec("2000"), dec("250000"), &rates(), 6);
        assert_eq!(result.amount, dec("18"));
    }

    #[test]
    fn test_additional_medicare_crossing_threshold() {
        // 198000 + 5000 - 200000 = 3000 over
        let result = calculate_additional_medicare(dec("5000"), dec("198000"), &rates(), 6);
        assert_eq!(result.amount, dec("27"));
    }

    #[test]
    fn test_california_sdi_below_base() {
        let result = calculate_state_disability(dec("2000"), Decimal::ZERO, "CA", &rates(), 7);
        assert_eq!(result.amount, dec("18"));
    }

    #[test]
    fn test_california_sdi_crossing_base() {
        // 153164 - 152664 = 500 taxable
        let result = calculate_state_disability(dec("2000"), dec("152664"), "ca", &rates(), 7);
        assert_eq!(result.amount, dec("4.5"));
    }

    #[test]
    fn test_sdi_above_base_is_zero() {
        let result = calculate_state_disability(dec("2000"), dec("200000"), "CA", &rates(), 7);
        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn test_sdi_without_wage_base_is_uncapped() {
        let mut rates = rates();
        rates.state_disability.insert(
            "CA".to_string(),
            DisabilityProgram {
                rate: dec("0.012"),
                wage_base: None,
            },
        );

        let result = calculate_state_disability(dec("2000"), dec("500000"), "CA", &rates, 7);
        assert_eq!(result.amount, dec("24"));
    }

    #[test]
    fn test_state_without_program_is_zero() {
        let result = calculate_state_disability(dec("2000"), Decimal::ZERO, "TX", &rates(), 7);
        assert_eq!(result.amount, Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("no state disability"));
    }
}
