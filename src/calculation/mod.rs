//! Calculation logic for the internal withholding engine.
//!
//! This module contains the calculators used when the external engine is
//! unavailable: the shared bracket walk, federal and state income tax,
//! the statutory payroll taxes, and the pipeline that combines them into a
//! rounded per-period breakdown.

mod brackets;
mod common;
mod federal;
mod fica;
mod internal;
mod state;

pub use brackets::{BracketComputation, apply_brackets};
pub use common::{non_negative, round_to_cent};
pub use federal::{FederalWithholdingResult, calculate_federal_withholding};
pub use fica::{
    StatutoryTaxResult, calculate_additional_medicare, calculate_medicare,
    calculate_social_security, calculate_state_disability,
};
pub use internal::{
    InternalCalculation, cap_income_taxes, compute_internal_withholding, resolve_tax_year,
};
pub use state::{StateWithholdingResult, calculate_state_withholding};
