//! External tax engine integration.
//!
//! The orchestrator talks to the external engine through
//! [`ExternalTaxEngine`]. An engine never returns an error to the caller:
//! every call yields an [`EngineOutcome`], and anything other than
//! [`EngineOutcome::Success`] routes the calculation to the internal
//! calculators.

mod symmetry;
mod wire;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Employee, PayEvent, PayPeriodDates, TaxProfile, WithholdingBreakdown};

pub use symmetry::SymmetryEngine;
pub use wire::{
    SymmetryAddress, SymmetryEmployee, SymmetryPay, SymmetryRequest, SymmetryResponse,
    SymmetryTaxElections,
};

/// Everything an external engine needs for one calculation.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Worker identity and addresses.
    pub employee: Employee,
    /// Withholding elections.
    pub profile: TaxProfile,
    /// Wages and year-to-date accumulators.
    pub pay_event: PayEvent,
    /// Resolved pay period.
    pub period: PayPeriodDates,
}

/// Normalized withholdings returned by an external engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalWithholding {
    /// Per-category amounts, missing categories defaulted to zero.
    pub withholdings: WithholdingBreakdown,
    /// The engine's identifier for the calculation.
    pub calculation_id: String,
    /// When the engine performed the calculation.
    pub timestamp: DateTime<Utc>,
}

/// The result of one external engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    /// The engine returned a usable result.
    Success(ExternalWithholding),
    /// Credentials are missing; no call was attempted.
    NotConfigured,
    /// The call failed (transport, HTTP status, or malformed body).
    Failed(String),
}

/// An external service that computes withholdings.
#[async_trait]
pub trait ExternalTaxEngine: Send + Sync {
    /// Computes withholdings for one pay event.
    async fn calculate(&self, request: &EngineRequest) -> EngineOutcome;

    /// Identifies the engine in logs.
    fn engine_id(&self) -> &str;
}

/// An engine that is never configured.
///
/// Useful when the service should run on internal calculators only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEngine;

#[async_trait]
impl ExternalTaxEngine for DisabledEngine {
    async fn calculate(&self, _request: &EngineRequest) -> EngineOutcome {
        EngineOutcome::NotConfigured
    }

    fn engine_id(&self) -> &str {
        "disabled"
    }
}
