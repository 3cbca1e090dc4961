//! Storage for worker records, tax profiles and the audit log.
//!
//! The orchestrator depends only on the traits here; [`InMemoryStore`]
//! implements all three and is what the binary and the tests run against.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::EngineError;
use crate::models::{AuditRecord, Employee, TaxProfile};

pub use memory::{InMemoryStore, SeedFile};

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or is in a bad state.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected a write.
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        EngineError::StoreError {
            message: error.to_string(),
        }
    }
}

/// Reads and writes withholding elections.
#[async_trait]
pub trait TaxProfileStore: Send + Sync {
    /// Returns the profile for a worker, if one exists.
    async fn get_tax_profile(&self, employee_id: &str) -> Result<Option<TaxProfile>, StoreError>;

    /// Inserts or replaces a profile.
    async fn upsert_tax_profile(&self, profile: TaxProfile) -> Result<(), StoreError>;
}

/// Reads and writes worker records.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Returns the worker record, if one exists.
    async fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError>;

    /// Inserts or replaces a worker record.
    async fn upsert_employee(&self, employee: Employee) -> Result<(), StoreError>;
}

/// Append-only log of completed calculations.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Appends one record.
    async fn append(&self, record: AuditRecord) -> Result<(), StoreError>;

    /// Returns a worker's records, oldest first.
    async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<AuditRecord>, StoreError>;
}
