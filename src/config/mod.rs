//! Configuration loading and management for the payroll withholding engine.
//!
//! This module provides the reference data the internal calculators read
//! (bracket tables and statutory rates, loaded from YAML) and the credentials
//! for the external tax engine.
//!
//! # Example
//!
//! ```no_run
//! use payroll_withholding::config::{EngineConfig, TaxTables};
//!
//! let tables = TaxTables::load("./config/tax_tables").unwrap();
//! let engine = EngineConfig::from_env();
//! println!("Loaded years {:?}, engine configured: {}", tables.years(), engine.is_configured());
//! ```

mod engine;
mod loader;
mod types;

pub use engine::{
    ENV_API_KEY, ENV_BASE_URL, ENV_COMPANY_ID, ENV_ENVIRONMENT, EngineConfig, EngineEnvironment,
};
pub use loader::TaxTables;
pub use types::{
    AdditionalMedicareRates, BracketTableFile, DisabilityProgram, MedicareRates,
    SocialSecurityRates, StatutoryRates, TaxYearTables,
};
