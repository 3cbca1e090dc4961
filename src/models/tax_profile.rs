//! Tax profile model and filing status.
//!
//! A [`TaxProfile`] holds a worker's federal and state withholding elections
//! as captured from their W-4 (and state equivalent).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pay_event::MAX_CURRENCY_AMOUNT;
use crate::error::{EngineError, EngineResult};

/// Sentinel state code meaning the worker has no state withholding.
pub const NO_STATE: &str = "NONE";

/// Filing status used to select a bracket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    /// Single or married filing separately under the W-4 2020+ model.
    Single,
    /// Married filing jointly (or qualifying surviving spouse).
    MarriedFilingJointly,
    /// Married filing separately.
    MarriedFilingSeparately,
    /// Head of household.
    HeadOfHousehold,
}

impl FilingStatus {
    /// Returns the snake_case key used in bracket table files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married_filing_jointly",
            FilingStatus::MarriedFilingSeparately => "married_filing_separately",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A worker's withholding elections.
///
/// Exemption flags short-circuit income tax withholding for their
/// jurisdiction. They never affect Social Security, Medicare or SDI.
///
/// # Example
///
/// ```
/// use payroll_withholding::models::{FilingStatus, TaxProfile};
///
/// let profile = TaxProfile::new("emp_001", FilingStatus::Single, "CA");
/// assert!(profile.has_state_withholding());
/// assert!(!profile.is_exempt_federal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxProfile {
    /// The worker this profile belongs to.
    pub employee_id: String,
    /// Federal filing status.
    pub filing_status: FilingStatus,
    /// State filing status, which may differ from federal.
    pub state_filing_status: FilingStatus,
    /// Legacy federal allowances (zero under W-4 Step elections).
    #[serde(default)]
    pub federal_allowances: u32,
    /// Legacy state allowances.
    #[serde(default)]
    pub state_allowances: u32,
    /// Flat amount added to computed federal withholding each period.
    #[serde(default)]
    pub additional_federal_withholding: Decimal,
    /// Flat amount added to computed state withholding each period.
    #[serde(default)]
    pub additional_state_withholding: Decimal,
    /// Forces federal income tax withholding to zero.
    #[serde(default)]
    pub is_exempt_federal: bool,
    /// Forces state income tax withholding to zero.
    #[serde(default)]
    pub is_exempt_state: bool,
    /// Two-letter state code, or `"NONE"`.
    pub state_code: String,
    /// W-4 Step 2: multiple jobs or spouse works.
    #[serde(default)]
    pub w4_step2_checkbox: bool,
    /// W-4 Step 3: annual dependents credit amount.
    #[serde(default)]
    pub w4_dependents_amount: Decimal,
    /// W-4 Step 4(a): other annual income.
    #[serde(default)]
    pub w4_other_income: Decimal,
    /// W-4 Step 4(b): annual deductions.
    #[serde(default)]
    pub w4_deductions: Decimal,
}

impl TaxProfile {
    /// Creates a profile with no elections and matching federal/state status.
    pub fn new(
        employee_id: impl Into<String>,
        filing_status: FilingStatus,
        state_code: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            filing_status,
            state_filing_status: filing_status,
            federal_allowances: 0,
            state_allowances: 0,
            additional_federal_withholding: Decimal::ZERO,
            additional_state_withholding: Decimal::ZERO,
            is_exempt_federal: false,
            is_exempt_state: false,
            state_code: state_code.into(),
            w4_step2_checkbox: false,
            w4_dependents_amount: Decimal::ZERO,
            w4_other_income: Decimal::ZERO,
            w4_deductions: Decimal::ZERO,
        }
    }

    /// Returns the normalized (upper-case, trimmed) state code.
    pub fn normalized_state_code(&self) -> String {
        self.state_code.trim().to_uppercase()
    }

    /// Returns false when the state code is empty or the `"NONE"` sentinel.
    pub fn has_state_withholding(&self) -> bool {
        let code = self.normalized_state_code();
        !code.is_empty() && code != NO_STATE
    }

    /// Checks that every stored election amount is within
    /// `0..=MAX_CURRENCY_AMOUNT`.
    /// Out-of-range amounts are a `CalculationError`.
    pub fn validate(&self) -> EngineResult<()> {
        let max = Decimal::from(MAX_CURRENCY_AMOUNT);
        let amounts = [
            ("additional_federal_withholding", self.additional_federal_withholding),
            ("additional_state_withholding", self.additional_state_withholding),
            ("w4_dependents_amount", self.w4_dependents_amount),
            ("w4_other_income", self.w4_other_income),
            ("w4_deductions", self.w4_deductions),
        ];

        for (field, value) in amounts {
            if value < Decimal::ZERO || value > max {
                return Err(EngineError::CalculationError {
                    message: format!(
                        "tax profile for {} has out-of-range {}: {}",
                        self.employee_id, field, value
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_profile_with_defaults() {
        let json = r#"{
            "employee_id": "emp_001",
            "filing_status": "married_filing_jointly",
            "state_filing_status": "single",
            "state_code": "CA"
        }"#;

        let profile: TaxProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.filing_status, FilingStatus::MarriedFilingJointly);
        assert_eq!(profile.state_filing_status, FilingStatus::Single);
        assert_eq!(profile.additional_federal_withholding, Decimal::ZERO);
        assert!(!profile.w4_step2_checkbox);
        assert!(!profile.is_exempt_state);
    }

    #[test]
    fn test_none_sentinel_disables_state_withholding() {
        let profile = TaxProfile::new("emp_001", FilingStatus::Single, "NONE");
        assert!(!profile.has_state_withholding());

        let profile = TaxProfile::new("emp_001", FilingStatus::Single, " none ");
        assert!(!profile.has_state_withholding());

        let profile = TaxProfile::new("emp_001", FilingStatus::Single, "");
        assert!(!profile.has_state_withholding());
    }

    #[test]
    fn test_validate_rejects_out_of_range_elections() {
        let profile = TaxProfile::new("emp_001", FilingStatus::Single, "CA");
        assert!(profile.validate().is_ok());

        let mut profile = TaxProfile::new("emp_001", FilingStatus::Single, "CA");
        profile.w4_other_income = Decimal::from_scientific("7e28").unwrap();
        match profile.validate() {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("w4_other_income"))
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }

        let mut profile = TaxProfile::new("emp_001", FilingStatus::Single, "CA");
        profile.additional_federal_withholding = Decimal::NEGATIVE_ONE;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_state_code_is_normalized() {
        let profile = TaxProfile::new("emp_001", FilingStatus::Single, "ca");
        assert_eq!(profile.normalized_state_code(), "CA");
        assert!(profile.has_state_withholding());
    }

    #[test]
    fn test_filing_status_serialization() {
        assert_eq!(
            serde_json::to_string(&FilingStatus::HeadOfHousehold).unwrap(),
            "\"head_of_household\""
        );
        assert_eq!(FilingStatus::MarriedFilingJointly.to_string(), "married_filing_jointly");
    }
}
