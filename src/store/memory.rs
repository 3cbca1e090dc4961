//! In-process store backed by `RwLock`-guarded maps.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditRecord, Employee, TaxProfile};

use super::{AuditLogStore, EmployeeStore, StoreError, TaxProfileStore};

/// Worker and profile records loaded at startup.
///
/// ```yaml
/// employees:
///   - id: emp_001
///     first_name: Ada
///     last_name: Lovelace
///     address: { street: 1 Main St, city: Oakland, state: CA, zip: "94612" }
/// tax_profiles:
///   - employee_id: emp_001
///     filing_status: single
///     state_filing_status: single
///     state_code: CA
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    /// Worker records.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Withholding elections.
    #[serde(default)]
    pub tax_profiles: Vec<TaxProfile>,
}

/// A store that keeps everything in memory.
///
/// # Example
///
/// ```
/// use payroll_withholding::models::{FilingStatus, TaxProfile};
/// use payroll_withholding::store::{InMemoryStore, TaxProfileStore};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let store = InMemoryStore::new();
///     store
///         .upsert_tax_profile(TaxProfile::new("emp_001", FilingStatus::Single, "CA"))
///         .await
///         .unwrap();
///     assert!(store.get_tax_profile("emp_001").await.unwrap().is_some());
/// });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    employees: RwLock<HashMap<String, Employee>>,
    profiles: RwLock<HashMap<String, TaxProfile>>,
    audit_log: RwLock<Vec<AuditRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the records of a seed.
    pub fn from_seed(seed: SeedFile) -> Self {
        let employees = seed
            .employees
            .into_iter()
            .map(|employee| (employee.id.clone(), employee))
            .collect();
        let profiles = seed
            .tax_profiles
            .into_iter()
            .map(|profile| (profile.employee_id.clone(), profile))
            .collect();

        Self {
            employees: RwLock::new(employees),
            profiles: RwLock::new(profiles),
            audit_log: RwLock::new(Vec::new()),
        }
    }

    /// Loads a YAML seed file.
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.exists() {
            return Err(EngineError::ConfigNotFound { path: path_str });
        }

        let content = fs::read_to_string(path).map_err(|e| EngineError::ConfigParseError {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        let seed: SeedFile =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        info!(
            path = %path_str,
            employees = seed.employees.len(),
            tax_profiles = seed.tax_profiles.len(),
            "Loaded seed file"
        );

        Ok(Self::from_seed(seed))
    }
}

fn poisoned(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{} lock poisoned", what))
}

#[async_trait]
impl TaxProfileStore for InMemoryStore {
    async fn get_tax_profile(&self, employee_id: &str) -> Result<Option<TaxProfile>, StoreError> {
        let profiles = self.profiles.read().map_err(|_| poisoned("profiles"))?;
        Ok(profiles.get(employee_id).cloned())
    }

    async fn upsert_tax_profile(&self, profile: TaxProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().map_err(|_| poisoned("profiles"))?;
        profiles.insert(profile.employee_id.clone(), profile);
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for InMemoryStore {
    async fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        let employees = self.employees.read().map_err(|_| poisoned("employees"))?;
        Ok(employees.get(employee_id).cloned())
    }

    async fn upsert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        let mut employees = self.employees.write().map_err(|_| poisoned("employees"))?;
        employees.insert(employee.id.clone(), employee);
        Ok(())
    }
}

#[async_trait]
impl AuditLogStore for InMemoryStore {
    async fn append(&self, record: AuditRecord) -> Result<(), StoreError> {
        let mut log = self
            .audit_log
            .write()
            .map_err(|_| StoreError::WriteFailed("audit log lock poisoned".to_string()))?;
        log.push(record);
        Ok(())
    }

    async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<AuditRecord>, StoreError> {
        let log = self.audit_log.read().map_err(|_| poisoned("audit log"))?;
        Ok(log
            .iter()
            .filter(|record| record.employee_id == employee_id)
            .cloned()
            .collect())
    }
}
