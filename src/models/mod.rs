//! Core data models for the payroll withholding engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod employee;
mod pay_event;
mod tax_bracket;
mod tax_profile;

pub use calculation_result::{
    AuditRecord, AuditStep, AuditTrace, AuditWarning, CalculationDetails, CalculationResult,
    EngineUsed, WithholdingBreakdown,
};
pub use employee::{Address, Employee};
pub use pay_event::{
    DEFAULT_PERIOD_LOOKBACK_DAYS, MAX_CURRENCY_AMOUNT, PayEvent, PayFrequency, PayPeriodDates,
};
pub use tax_bracket::TaxBracketRow;
pub use tax_profile::{FilingStatus, NO_STATE, TaxProfile};
