//! Worker identity model.
//!
//! The withholding engine only needs enough of the worker record to address
//! the external tax engine: id, name, home address and (optionally) a
//! distinct work location.

use serde::{Deserialize, Serialize};

/// A postal address used for tax jurisdiction resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Postal code.
    pub zip: String,
}

/// Represents a worker whose pay is being withheld on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the worker.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Residence address.
    pub address: Address,
    /// Work location, when different from the residence.
    #[serde(default)]
    pub work_address: Option<Address>,
}

impl Employee {
    /// Returns the address wages are earned at.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_withholding::models::{Address, Employee};
    ///
    /// let home = Address {
    ///     street: "1 Main St".to_string(),
    ///     city: "Oakland".to_string(),
    ///     state: "CA".to_string(),
    ///     zip: "94612".to_string(),
    /// };
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     first_name: "Ada".to_string(),
    ///     last_name: "Lovelace".to_string(),
    ///     address: home.clone(),
    ///     work_address: None,
    /// };
    /// assert_eq!(employee.work_location(), &home);
    /// ```
    pub fn work_location(&self) -> &Address {
        self.work_address.as_ref().unwrap_or(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(city: &str, state: &str) -> Address {
        Address {
            street: "100 Market St".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: "94105".to_string(),
        }
    }

    #[test]
    fn test_deserialize_employee_without_work_address() {
        let json = r#"{
            "id": "emp_001",
            "first_name": "Grace",
            "last_name": "Hopper",
            "address": {"street": "1 Main St", "city": "Reno", "state": "NV", "zip": "89501"}
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert!(employee.work_address.is_none());
        assert_eq!(employee.work_location().state, "NV");
    }

    #[test]
    fn test_work_location_prefers_distinct_work_address() {
        let employee = Employee {
            id: "emp_002".to_string(),
            first_name: "Alan".to_string(),
            last_name: "Turing".to_string(),
            address: address("Reno", "NV"),
            work_address: Some(address("San Francisco", "CA")),
        };

        assert_eq!(employee.work_location().state, "CA");
    }
}
