//! Pay event and pay frequency models.
//!
//! A [`PayEvent`] is the ephemeral input to one withholding calculation:
//! the gross wages for a single pay period plus the year-to-date
//! accumulators the capped taxes depend on.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Number of days the pay-period window reaches back from the pay date
/// when the caller does not supply explicit period dates.
pub const DEFAULT_PERIOD_LOOKBACK_DAYS: i64 = 14;

/// Largest currency amount accepted on a pay event or tax profile.
///
/// Annualized wages and bracket math stay well inside `Decimal` range for
/// amounts up to this bound.
pub const MAX_CURRENCY_AMOUNT: i64 = 1_000_000_000_000;

/// How often a worker is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    /// 52 periods per year.
    Weekly,
    /// 26 periods per year.
    Biweekly,
    /// 24 periods per year.
    Semimonthly,
    /// 12 periods per year.
    Monthly,
}

impl PayFrequency {
    /// Returns the number of pay periods in a year.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_withholding::models::PayFrequency;
    ///
    /// assert_eq!(PayFrequency::Weekly.periods_per_year(), 52);
    /// assert_eq!(PayFrequency::Biweekly.periods_per_year(), 26);
    /// assert_eq!(PayFrequency::Semimonthly.periods_per_year(), 24);
    /// assert_eq!(PayFrequency::Monthly.periods_per_year(), 12);
    /// ```
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::Semimonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }

    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::Biweekly => "biweekly",
            PayFrequency::Semimonthly => "semimonthly",
            PayFrequency::Monthly => "monthly",
        }
    }

    /// Returns the capitalized form the external tax engine expects.
    pub fn engine_label(&self) -> &'static str {
        match self {
            PayFrequency::Weekly => "Weekly",
            PayFrequency::Biweekly => "Biweekly",
            PayFrequency::Semimonthly => "Semimonthly",
            PayFrequency::Monthly => "Monthly",
        }
    }
}

impl FromStr for PayFrequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(PayFrequency::Weekly),
            "biweekly" => Ok(PayFrequency::Biweekly),
            "semimonthly" => Ok(PayFrequency::Semimonthly),
            "monthly" => Ok(PayFrequency::Monthly),
            _ => Err(EngineError::UnknownPayFrequency {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive start and end dates of a pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriodDates {
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriodDates {
    /// Builds a window ending on `end_date` and starting `lookback_days` earlier.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_withholding::models::PayPeriodDates;
    /// use chrono::NaiveDate;
    ///
    /// let end = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let period = PayPeriodDates::trailing(end, 14);
    /// assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    /// ```
    pub fn trailing(end_date: NaiveDate, lookback_days: i64) -> Self {
        Self {
            start_date: end_date - Duration::days(lookback_days),
            end_date,
        }
    }
}

/// One pay event for one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayEvent {
    /// Gross wages for this pay period.
    pub gross_wages: Decimal,
    /// Pay frequency, which fixes periods-per-year.
    pub pay_frequency: PayFrequency,
    /// Gross wages paid earlier in the year.
    #[serde(default)]
    pub ytd_gross_wages: Decimal,
    /// Federal income tax withheld earlier in the year.
    #[serde(default)]
    pub ytd_federal_withheld: Decimal,
    /// State income tax withheld earlier in the year.
    #[serde(default)]
    pub ytd_state_withheld: Decimal,
    /// Social Security wages paid earlier in the year.
    #[serde(default)]
    pub ytd_social_security_wages: Decimal,
    /// Medicare wages paid earlier in the year.
    #[serde(default)]
    pub ytd_medicare_wages: Decimal,
    /// Date the wages are paid; selects the tax year.
    pub pay_date: NaiveDate,
    /// Explicit period dates, when the payroll run knows them.
    #[serde(default)]
    pub period: Option<PayPeriodDates>,
}

impl PayEvent {
    /// Creates a pay event with zero year-to-date accumulators.
    pub fn new(gross_wages: Decimal, pay_frequency: PayFrequency, pay_date: NaiveDate) -> Self {
        Self {
            gross_wages,
            pay_frequency,
            ytd_gross_wages: Decimal::ZERO,
            ytd_federal_withheld: Decimal::ZERO,
            ytd_state_withheld: Decimal::ZERO,
            ytd_social_security_wages: Decimal::ZERO,
            ytd_medicare_wages: Decimal::ZERO,
            pay_date,
            period: None,
        }
    }

    /// Returns the tax year the pay date falls in.
    pub fn tax_year(&self) -> i32 {
        self.pay_date.year()
    }

    /// Returns the explicit period, or a trailing window ending on the pay date.
    pub fn resolved_period(&self) -> PayPeriodDates {
        self.period
            .unwrap_or_else(|| PayPeriodDates::trailing(self.pay_date, DEFAULT_PERIOD_LOOKBACK_DAYS))
    }

    /// Checks that every currency amount is within `0..=MAX_CURRENCY_AMOUNT`
    /// and the period is ordered.
    pub fn validate(&self) -> EngineResult<()> {
        let max = Decimal::from(MAX_CURRENCY_AMOUNT);

        let amounts = [
            ("grossPay", self.gross_wages),
            ("ytdGrossPay", self.ytd_gross_wages),
            ("ytdFederalWithheld", self.ytd_federal_withheld),
            ("ytdStateWithheld", self.ytd_state_withheld),
            ("ytdSocialSecurity", self.ytd_social_security_wages),
            ("ytdMedicare", self.ytd_medicare_wages),
        ];

        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(EngineError::InvalidPayEvent {
                    field: field.to_string(),
                    message: format!("must not be negative (got {})", value),
                });
            }
            if value > max {
                return Err(EngineError::InvalidPayEvent {
                    field: field.to_string(),
                    message: format!("must not exceed {} (got {})", max, value),
                });
            }
        }

        if let Some(period) = self.period {
            if period.end_date < period.start_date {
                return Err(EngineError::InvalidPayEvent {
                    field: "periodEnd".to_string(),
                    message: "period end date is before period start date".to_string(),
                });
            }
        }

        Ok(())
    }
}
