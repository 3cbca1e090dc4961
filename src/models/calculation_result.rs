//! Calculation result models for the payroll withholding engine.
//!
//! This module contains the [`CalculationResult`] type and its associated structures
//! that capture all outputs from a withholding calculation, including the per-category
//! breakdown, totals, engine provenance and audit trace.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FilingStatus, PayFrequency};

/// Identifies which engine produced a calculation.
///
/// # Example
///
/// ```
/// use payroll_withholding::models::EngineUsed;
///
/// assert_eq!(
///     serde_json::to_string(&EngineUsed::InternalFallback).unwrap(),
///     "\"internal-fallback\""
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineUsed {
    /// The external Symmetry tax engine served the request.
    #[serde(rename = "symmetry")]
    Symmetry,
    /// The internal bracket-based calculator served the request.
    #[serde(rename = "internal-fallback")]
    InternalFallback,
}

impl EngineUsed {
    /// Returns the tag recorded in the audit log.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineUsed::Symmetry => "symmetry",
            EngineUsed::InternalFallback => "internal-fallback",
        }
    }
}

impl std::fmt::Display for EngineUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category employee withholdings for one pay event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingBreakdown {
    /// Federal income tax.
    pub federal_income_tax: Decimal,
    /// State income tax.
    pub state_income_tax: Decimal,
    /// Local (city/county) income tax.
    pub local_income_tax: Decimal,
    /// Employee share of Social Security (OASDI).
    pub social_security_employee: Decimal,
    /// Employee share of Medicare.
    pub medicare_employee: Decimal,
    /// Additional Medicare surtax.
    pub medicare_additional: Decimal,
    /// State disability insurance.
    pub state_disability_insurance: Decimal,
}

impl WithholdingBreakdown {
    /// Returns the sum of all seven categories.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_withholding::models::WithholdingBreakdown;
    /// use rust_decimal::Decimal;
    ///
    /// let breakdown = WithholdingBreakdown {
    ///     social_security_employee: Decimal::new(12400, 2),
    ///     medicare_employee: Decimal::new(2900, 2),
    ///     ..Default::default()
    /// };
    /// assert_eq!(breakdown.total(), Decimal::new(15300, 2));
    /// ```
    pub fn total(&self) -> Decimal {
        self.federal_income_tax
            + self.state_income_tax
            + self.local_income_tax
            + self.social_security_employee
            + self.medicare_employee
            + self.medicare_additional
            + self.state_disability_insurance
    }

    /// Returns a copy with `f` applied to every category.
    pub fn map(&self, f: impl Fn(Decimal) -> Decimal) -> Self {
        Self {
            federal_income_tax: f(self.federal_income_tax),
            state_income_tax: f(self.state_income_tax),
            local_income_tax: f(self.local_income_tax),
            social_security_employee: f(self.social_security_employee),
            medicare_employee: f(self.medicare_employee),
            medicare_additional: f(self.medicare_additional),
            state_disability_insurance: f(self.state_disability_insurance),
        }
    }
}

/// Context describing how a result was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationDetails {
    /// Which engine produced the numbers.
    pub engine: EngineUsed,
    /// `gross × periods-per-year` (internal path only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annualized_income: Option<Decimal>,
    /// Annualized income after W-4 adjustments (internal path only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_annual_income: Option<Decimal>,
    /// Pay frequency of the event.
    pub pay_frequency: PayFrequency,
    /// Federal filing status used.
    pub filing_status: FilingStatus,
    /// Tax year the bracket tables were selected for.
    pub tax_year: i32,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The statute or publication the rule implements.
    pub authority: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that degraded a category to zero or
/// otherwise adjusted the result without failing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a withholding calculation.
///
/// The seven categories are flattened into the top level of the JSON
/// object, alongside the totals and provenance.
///
/// Invariants: `total_withholdings` is the sum of the (already rounded)
/// categories and `net_pay = gross_wages - total_withholdings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation (the engine's id when external).
    pub calculation_id: String,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of this crate that performed the calculation.
    pub engine_version: String,
    /// The worker the calculation is for.
    pub employee_id: String,
    /// Gross wages for the pay event.
    pub gross_wages: Decimal,
    /// Per-category withholdings, rounded to the cent.
    #[serde(flatten)]
    pub withholdings: WithholdingBreakdown,
    /// Sum of all categories.
    pub total_withholdings: Decimal,
    /// Gross wages less total withholdings.
    pub net_pay: Decimal,
    /// How the result was produced.
    pub calculation_details: CalculationDetails,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// Returns the engine that produced this result.
    pub fn engine_used(&self) -> EngineUsed {
        self.calculation_details.engine
    }
}

/// An immutable audit-log entry for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The calculation this record describes.
    pub calculation_id: String,
    /// The worker the calculation is for.
    pub employee_id: String,
    /// Which engine produced the numbers.
    pub engine: EngineUsed,
    /// Gross wages for the pay event.
    pub gross_wages: Decimal,
    /// Per-category withholdings.
    pub withholdings: WithholdingBreakdown,
    /// Sum of all categories.
    pub total_withholdings: Decimal,
    /// Gross wages less total withholdings.
    pub net_pay: Decimal,
    /// Calculation context.
    pub calculation_details: CalculationDetails,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
}

impl From<&CalculationResult> for AuditRecord {
    fn from(result: &CalculationResult) -> Self {
        Self {
            calculation_id: result.calculation_id.clone(),
            employee_id: result.employee_id.clone(),
            engine: result.engine_used(),
            gross_wages: result.gross_wages,
            withholdings: result.withholdings.clone(),
            total_withholdings: result.total_withholdings,
            net_pay: result.net_pay,
            calculation_details: result.calculation_details.clone(),
            timestamp: result.timestamp,
        }
    }
}
