//! Request types for the payroll withholding API.
//!
//! Bodies use camelCase keys. Amounts may be JSON numbers or strings.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{DEFAULT_PERIOD_LOOKBACK_DAYS, PayEvent, PayFrequency, PayPeriodDates};
use crate::withholding::WithholdingRequest;

/// Request body for `POST /calculate-tax-withholdings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithholdingCalculationRequest {
    /// The worker being paid.
    pub employee_id: String,
    /// Gross wages for this pay period.
    pub gross_pay: Decimal,
    /// `weekly`, `biweekly`, `semimonthly` or `monthly`.
    pub pay_period: String,
    /// Gross wages paid earlier in the year.
    #[serde(default)]
    pub ytd_gross_pay: Decimal,
    /// Federal income tax withheld earlier in the year.
    #[serde(default)]
    pub ytd_federal_withheld: Decimal,
    /// State income tax withheld earlier in the year.
    #[serde(default)]
    pub ytd_state_withheld: Decimal,
    /// Social Security wages paid earlier in the year.
    #[serde(default)]
    pub ytd_social_security: Decimal,
    /// Medicare wages paid earlier in the year.
    #[serde(default)]
    pub ytd_medicare: Decimal,
    /// Date the wages are paid. Defaults to `periodEnd`, then today.
    #[serde(default)]
    pub pay_date: Option<NaiveDate>,
    /// First day of the pay period.
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    /// Last day of the pay period.
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
}

impl WithholdingCalculationRequest {
    /// Converts to the domain request, using today when no date is given.
    pub fn into_domain(self) -> EngineResult<WithholdingRequest> {
        self.into_domain_on(Utc::now().date_naive())
    }

    /// Converts to the domain request with an explicit "today".
    ///
    /// `periodStart` alone is rejected; `periodEnd` alone gets the default
    /// look-back.
    pub fn into_domain_on(self, today: NaiveDate) -> EngineResult<WithholdingRequest> {
        let pay_frequency: PayFrequency = self.pay_period.parse()?;

        let period = match (self.period_start, self.period_end) {
            (Some(start_date), Some(end_date)) => Some(PayPeriodDates {
                start_date,
                end_date,
            }),
            (None, Some(end_date)) => {
                Some(PayPeriodDates::trailing(end_date, DEFAULT_PERIOD_LOOKBACK_DAYS))
            }
            (Some(_), None) => {
                return Err(EngineError::InvalidPayEvent {
                    field: "periodEnd".to_string(),
                    message: "required when periodStart is supplied".to_string(),
                });
            }
            (None, None) => None,
        };

        let pay_date = self
            .pay_date
            .or(self.period_end)
            .unwrap_or(today);

        let pay_event = PayEvent {
            gross_wages: self.gross_pay,
            pay_frequency,
            ytd_gross_wages: self.ytd_gross_pay,
            ytd_federal_withheld: self.ytd_federal_withheld,
            ytd_state_withheld: self.ytd_state_withheld,
            ytd_social_security_wages: self.ytd_social_security,
            ytd_medicare_wages: self.ytd_medicare,
            pay_date,
            period,
        };

        Ok(WithholdingRequest {
            employee_id: self.employee_id,
            pay_event,
        })
    }
}

/// Request body for `POST /calculate-tax-withholdings/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCalculationRequest {
    /// One entry per worker.
    pub requests: Vec<WithholdingCalculationRequest>,
}
