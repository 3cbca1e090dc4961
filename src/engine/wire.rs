//! Request and response bodies for the Symmetry payroll calculation API.
//!
//! Amounts are sent as JSON numbers. Responses are parsed leniently: every
//! withholding field is optional, `null` and missing both mean zero, and
//! both camelCase and snake_case keys are accepted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Address, WithholdingBreakdown};

use super::{EngineRequest, ExternalWithholding};

/// A postal address on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetryAddress {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Postal code.
    pub zip: String,
}

impl From<&Address> for SymmetryAddress {
    fn from(address: &Address) -> Self {
        Self {
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
        }
    }
}

/// Worker identity on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetryEmployee {
    /// Worker id.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Residence.
    pub residence_address: SymmetryAddress,
    /// Work location; the residence when none is on file.
    pub work_address: SymmetryAddress,
}

/// Withholding elections on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SymmetryTaxElections {
    pub filing_status: String,
    pub state_filing_status: String,
    pub federal_allowances: u32,
    pub state_allowances: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub additional_federal_withholding: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub additional_state_withholding: Decimal,
    pub exempt_federal: bool,
    pub exempt_state: bool,
    pub state_code: String,
    pub multiple_jobs: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub dependents_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub other_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub deductions: Decimal,
}

/// Wages and period on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SymmetryPay {
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_wages: Decimal,
    /// Capitalized frequency label, e.g. `"Biweekly"`.
    pub pay_frequency: String,
    pub pay_date: NaiveDate,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub ytd_gross_wages: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ytd_federal_withheld: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ytd_state_withheld: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ytd_social_security_wages: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ytd_medicare_wages: Decimal,
}

/// The calculation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SymmetryRequest {
    pub company_id: String,
    pub employee: SymmetryEmployee,
    pub tax_elections: SymmetryTaxElections,
    pub pay: SymmetryPay,
}

impl SymmetryRequest {
    /// Builds the body for a company from an engine request.
    pub fn new(company_id: &str, request: &EngineRequest) -> Self {
        let employee = &request.employee;
        let profile = &request.profile;
        let event = &request.pay_event;

        Self {
            company_id: company_id.to_string(),
            employee: SymmetryEmployee {
                id: employee.id.clone(),
                first_name: employee.first_name.clone(),
                last_name: employee.last_name.clone(),
                residence_address: SymmetryAddress::from(&employee.address),
                work_address: SymmetryAddress::from(employee.work_location()),
            },
            tax_elections: SymmetryTaxElections {
                filing_status: profile.filing_status.as_str().to_string(),
                state_filing_status: profile.state_filing_status.as_str().to_string(),
                federal_allowances: profile.federal_allowances,
                state_allowances: profile.state_allowances,
                additional_federal_withholding: profile.additional_federal_withholding,
                additional_state_withholding: profile.additional_state_withholding,
                exempt_federal: profile.is_exempt_federal,
                exempt_state: profile.is_exempt_state,
                state_code: profile.normalized_state_code(),
                multiple_jobs: profile.w4_step2_checkbox,
                dependents_amount: profile.w4_dependents_amount,
                other_income: profile.w4_other_income,
                deductions: profile.w4_deductions,
            },
            pay: SymmetryPay {
                gross_wages: event.gross_wages,
                pay_frequency: event.pay_frequency.engine_label().to_string(),
                pay_date: event.pay_date,
                pay_period_start: request.period.start_date,
                pay_period_end: request.period.end_date,
                ytd_gross_wages: event.ytd_gross_wages,
                ytd_federal_withheld: event.ytd_federal_withheld,
                ytd_state_withheld: event.ytd_state_withheld,
                ytd_social_security_wages: event.ytd_social_security_wages,
                ytd_medicare_wages: event.ytd_medicare_wages,
            },
        }
    }
}

/// The calculation response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct SymmetryResponse {
    #[serde(alias = "federal_income_tax")]
    pub federal_income_tax: Option<Decimal>,
    #[serde(alias = "state_income_tax")]
    pub state_income_tax: Option<Decimal>,
    #[serde(alias = "local_income_tax")]
    pub local_income_tax: Option<Decimal>,
    #[serde(alias = "social_security_employee")]
    pub social_security_employee: Option<Decimal>,
    #[serde(alias = "medicare_employee")]
    pub medicare_employee: Option<Decimal>,
    #[serde(alias = "medicare_additional")]
    pub medicare_additional: Option<Decimal>,
    #[serde(alias = "state_disability_insurance")]
    pub state_disability_insurance: Option<Decimal>,
    #[serde(alias = "calculation_id")]
    pub calculation_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SymmetryResponse {
    /// Normalizes the body, rejecting negative amounts.
    ///
    /// Missing categories become zero. A missing id is replaced with a
    /// fresh UUID and a missing timestamp with the current time.
    pub fn into_external(self) -> Result<ExternalWithholding, String> {
        let fields = [
            ("federalIncomeTax", self.federal_income_tax),
            ("stateIncomeTax", self.state_income_tax),
            ("localIncomeTax", self.local_income_tax),
            ("socialSecurityEmployee", self.social_security_employee),
            ("medicareEmployee", self.medicare_employee),
            ("medicareAdditional", self.medicare_additional),
            ("stateDisabilityInsurance", self.state_disability_insurance),
        ];

        for (name, value) in fields {
            if let Some(amount) = value {
                if amount < Decimal::ZERO {
                    return Err(format!("engine returned negative {}: {}", name, amount));
                }
            }
        }

        let or_zero = |value: Option<Decimal>| value.unwrap_or(Decimal::ZERO);

        Ok(ExternalWithholding {
            withholdings: WithholdingBreakdown {
                federal_income_tax: or_zero(self.federal_income_tax),
                state_income_tax: or_zero(self.state_income_tax),
                local_income_tax: or_zero(self.local_income_tax),
                social_security_employee: or_zero(self.social_security_employee),
                medicare_employee: or_zero(self.medicare_employee),
                medicare_additional: or_zero(self.medicare_additional),
                state_disability_insurance: or_zero(self.state_disability_insurance),
            },
            calculation_id: self
                .calculation_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, FilingStatus, PayEvent, PayFrequency, TaxProfile};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_request() -> EngineRequest {
        let home = Address {
            street: "1 Main St".to_string(),
            city: "Oakland".to_string(),
            state: "CA".to_string(),
            zip: "94612".to_string(),
        };
        let employee = Employee {
            id: "emp_001".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address: home,
            work_address: None,
        };
        let mut profile = TaxProfile::new("emp_001", FilingStatus::Single, "ca");
        profile.additional_federal_withholding = dec("12.5");

        let pay_date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let pay_event = PayEvent::new(dec("2000"), PayFrequency::Biweekly, pay_date);
        let period = pay_event.resolved_period();

        EngineRequest {
            employee,
            profile,
            pay_event,
            period,
        }
    }

    #[test]
    fn test_request_serialization_shape() {
        let body = SymmetryRequest::new("acme", &create_request());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["companyId"], "acme");
        assert_eq!(json["pay"]["payFrequency"], "Biweekly");
        assert_eq!(json["pay"]["grossWages"], 2000.0);
        assert_eq!(json["pay"]["payPeriodStart"], "2024-05-31");
        assert_eq!(json["pay"]["payPeriodEnd"], "2024-06-14");
        assert_eq!(json["taxElections"]["filingStatus"], "single");
        assert_eq!(json["taxElections"]["stateCode"], "CA");
        assert_eq!(json["taxElections"]["additionalFederalWithholding"], 12.5);
        assert_eq!(json["employee"]["workAddress"]["city"], "Oakland");
    }

    #[test]
    fn test_response_missing_fields_default_to_zero() {
        let response: SymmetryResponse =
            serde_json::from_str(r#"{"federalIncomeTax": 210.5, "calculationId": "sym_1"}"#)
                .unwrap();
        let external = response.into_external().unwrap();

        assert_eq!(external.withholdings.federal_income_tax, dec("210.5"));
        assert_eq!(external.withholdings.state_income_tax, Decimal::ZERO);
        assert_eq!(external.calculation_id, "sym_1");
    }

    #[test]
    fn test_response_accepts_snake_case_and_nulls() {
        let response: SymmetryResponse = serde_json::from_str(
            r#"{"social_security_employee": "124.00", "medicareEmployee": null}"#,
        )
        .unwrap();
        let external = response.into_external().unwrap();

        assert_eq!(external.withholdings.social_security_employee, dec("124"));
        assert_eq!(external.withholdings.medicare_employee, Decimal::ZERO);
        assert!(!external.calculation_id.is_empty());
    }

    #[test]
    fn test_response_negative_amount_is_rejected() {
        let response: SymmetryResponse =
            serde_json::from_str(r#"{"stateIncomeTax": -3}"#).unwrap();
        let err = response.into_external().unwrap_err();
        assert!(err.contains("stateIncomeTax"));
    }
}
