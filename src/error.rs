//! Error types for the payroll withholding engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for the error conditions that terminate a withholding request. Degraded
//! conditions (external engine unavailable, missing bracket tables) are not
//! errors: they change which numbers are produced, never whether a result is.

use thiserror::Error;

/// The main error type for the payroll withholding engine.
///
/// # Example
///
/// ```
/// use payroll_withholding::error::EngineError;
///
/// let error = EngineError::TaxProfileNotFound {
///     employee_id: "emp_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee tax profile not found: emp_001");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reference data file or directory was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Reference data could not be parsed or violated a table invariant.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No tax profile exists for the worker.
    #[error("Employee tax profile not found: {employee_id}")]
    TaxProfileNotFound {
        /// The worker the profile was requested for.
        employee_id: String,
    },

    /// No worker record exists for the id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The worker id that was not found.
        employee_id: String,
    },

    /// The pay frequency does not map to a known periods-per-year constant.
    #[error("Unknown pay frequency: {value}")]
    UnknownPayFrequency {
        /// The value that was supplied.
        value: String,
    },

    /// A pay event field was invalid.
    #[error("Invalid pay event field '{field}': {message}")]
    InvalidPayEvent {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A backing store failed to answer a read.
    #[error("Store error: {message}")]
    StoreError {
        /// A description of the store failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Returns true for the missing-record class of errors (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TaxProfileNotFound { .. } | EngineError::EmployeeNotFound { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
