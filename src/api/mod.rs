//! HTTP API module for the payroll withholding engine.
//!
//! This module provides the REST endpoints for calculating withholdings
//! (singly or in batches) and reading the audit log.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchCalculationRequest, WithholdingCalculationRequest};
pub use response::{
    ApiError, ApiErrorResponse, BatchCalculationResponse, BatchEntryResponse, BatchEntryStatus,
};
pub use state::AppState;
