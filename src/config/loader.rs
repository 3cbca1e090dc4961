//! Tax table loading functionality.
//!
//! This module provides the [`TaxTables`] type for loading bracket tables
//! and statutory rates from YAML files and answering lookups against them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{FilingStatus, TaxBracketRow};

use super::types::{BracketTableFile, StatutoryRates, TaxYearTables};

/// Read-only bracket tables and statutory rates, versioned by tax year.
///
/// # Directory Structure
///
/// ```text
/// config/tax_tables/
/// └── 2024/
///     ├── federal.yaml     # Federal brackets per filing status
///     ├── statutory.yaml   # Optional; defaults apply when absent
///     └── states/
///         └── CA.yaml      # State brackets with deduction/exemption
/// ```
///
/// Lookups never fail: a missing year, jurisdiction or filing status yields
/// an empty slice, which the calculators treat as "no tax".
///
/// # Example
///
/// ```no_run
/// use payroll_withholding::config::TaxTables;
/// use payroll_withholding::models::FilingStatus;
///
/// let tables = TaxTables::load("./config/tax_tables").unwrap();
/// let rows = tables.federal_brackets(2024, FilingStatus::Single);
/// println!("{} federal brackets", rows.len());
/// ```
#[derive(Debug, Clone)]
pub struct TaxTables {
    years: BTreeMap<i32, TaxYearTables>,
    default_statutory: StatutoryRates,
}

impl Default for TaxTables {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxTables {
    /// Creates an empty set of tables with default statutory rates.
    pub fn new() -> Self {
        Self {
            years: BTreeMap::new(),
            default_statutory: StatutoryRates::default(),
        }
    }

    /// Loads every tax year directory under `path`.
    ///
    /// Returns an error if the directory is missing, contains no year
    /// directories, or any file fails to parse or violates the bracket
    /// invariants (sorted, contiguous, last row unbounded).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.exists() {
            return Err(EngineError::ConfigNotFound { path: path_str });
        }

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let mut tables = Self::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: path_str.clone(),
            })?;

            let year_path = entry.path();
            let year = match year_path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.parse::<i32>().ok())
            {
                Some(year) if year_path.is_dir() => year,
                _ => continue,
            };

            let year_tables = Self::load_year(&year_path, year)?;
            tables.years.insert(year, year_tables);
        }

        if tables.years.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax year directories found)", path_str),
            });
        }

        debug!(
            years = ?tables.years.keys().collect::<Vec<_>>(),
            "Loaded tax tables"
        );

        Ok(tables)
    }

    /// Loads one `<year>/` directory.
    fn load_year(year_path: &Path, year: i32) -> EngineResult<TaxYearTables> {
        let mut year_tables = TaxYearTables::default();

        let federal_path = year_path.join("federal.yaml");
        if federal_path.exists() {
            let file = Self::load_table_file(&federal_path, year)?;
            year_tables.federal = file.brackets;
        }

        let statutory_path = year_path.join("statutory.yaml");
        if statutory_path.exists() {
            year_tables.statutory = Some(Self::load_yaml::<StatutoryRates>(&statutory_path)?);
        }

        let states_dir = year_path.join("states");
        if states_dir.is_dir() {
            let states_dir_str = states_dir.display().to_string();
            let entries = fs::read_dir(&states_dir).map_err(|_| EngineError::ConfigNotFound {
                path: states_dir_str.clone(),
            })?;

            for entry in entries {
                let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                    path: states_dir_str.clone(),
                })?;

                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "yaml") {
                    let file = Self::load_table_file(&path, year)?;
                    year_tables
                        .states
                        .insert(file.jurisdiction.trim().to_uppercase(), file.brackets);
                }
            }
        }

        Ok(year_tables)
    }

    /// Loads a bracket table file and checks it against its year directory.
    fn load_table_file(path: &Path, year: i32) -> EngineResult<BracketTableFile> {
        let mut file = Self::load_yaml::<BracketTableFile>(path)?;
        let path_str = path.display().to_string();

        if file.tax_year != year {
            return Err(EngineError::ConfigParseError {
                path: path_str,
                message: format!(
                    "tax_year {} does not match directory year {}",
                    file.tax_year, year
                ),
            });
        }

        for (status, rows) in file.brackets.iter_mut() {
            validate_rows(rows).map_err(|message| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: format!("{}: {}", status, message),
            })?;
        }

        Ok(file)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Adds (or replaces) federal rows for a year and filing status.
    pub fn insert_federal(
        &mut self,
        year: i32,
        status: FilingStatus,
        mut rows: Vec<TaxBracketRow>,
    ) -> EngineResult<()> {
        validate_rows(&mut rows).map_err(|message| EngineError::ConfigParseError {
            path: format!("{}/federal/{}", year, status),
            message,
        })?;
        self.years.entry(year).or_default().federal.insert(status, rows);
        Ok(())
    }

    /// Adds (or replaces) state rows for a year, state and filing status.
    pub fn insert_state(
        &mut self,
        year: i32,
        state_code: &str,
        status: FilingStatus,
        mut rows: Vec<TaxBracketRow>,
    ) -> EngineResult<()> {
        let code = state_code.trim().to_uppercase();
        validate_rows(&mut rows).map_err(|message| EngineError::ConfigParseError {
            path: format!("{}/states/{}/{}", year, code, status),
            message,
        })?;
        self.years
            .entry(year)
            .or_default()
            .states
            .entry(code)
            .or_default()
            .insert(status, rows);
        Ok(())
    }

    /// Sets the statutory rates for a year.
    pub fn insert_statutory(&mut self, year: i32, rates: StatutoryRates) {
        self.years.entry(year).or_default().statutory = Some(rates);
    }

    /// Returns the tax years that have tables loaded.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    /// Returns federal rows for a year and filing status (empty when absent).
    pub fn federal_brackets(&self, year: i32, status: FilingStatus) -> &[TaxBracketRow] {
        self.years
            .get(&year)
            .and_then(|tables| tables.federal.get(&status))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns state rows for a year, state and filing status (empty when absent).
    pub fn state_brackets(
        &self,
        year: i32,
        state_code: &str,
        status: FilingStatus,
    ) -> &[TaxBracketRow] {
        let code = state_code.trim().to_uppercase();
        self.years
            .get(&year)
            .and_then(|tables| tables.states.get(&code))
            .and_then(|by_status| by_status.get(&status))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the statutory rates for a year, falling back to the defaults.
    pub fn statutory_rates(&self, year: i32) -> &StatutoryRates {
        self.years
            .get(&year)
            .and_then(|tables| tables.statutory.as_ref())
            .unwrap_or(&self.default_statutory)
    }
}

/// Sorts rows by `bracket_min` and checks the table invariants.
fn validate_rows(rows: &mut [TaxBracketRow]) -> Result<(), String> {
    if rows.is_empty() {
        return Err("bracket table is empty".to_string());
    }

    rows.sort_by(|a, b| a.bracket_min.cmp(&b.bracket_min));

    if rows[0].bracket_min != Decimal::ZERO {
        return Err(format!(
            "first bracket must start at 0 (starts at {})",
            rows[0].bracket_min
        ));
    }

    for row in rows.iter() {
        if row.tax_rate < Decimal::ZERO || row.tax_rate > Decimal::ONE {
            return Err(format!(
                "tax_rate {} at bracket {} is outside 0..=1",
                row.tax_rate, row.bracket_min
            ));
        }
    }

    for pair in rows.windows(2) {
        match pair[0].bracket_max {
            Some(max) if max == pair[1].bracket_min => {}
            Some(max) => {
                return Err(format!(
                    "bracket ending at {} is not contiguous with bracket starting at {}",
                    max, pair[1].bracket_min
                ));
            }
            None => {
                return Err(format!(
                    "only the last bracket may be unbounded (bracket at {})",
                    pair[0].bracket_min
                ));
            }
        }
    }

    if let Some(last) = rows.last() {
        if last.bracket_max.is_some() {
            return Err("last bracket must be unbounded (bracket_max: null)".to_string());
        }
    }

    Ok(())
}
