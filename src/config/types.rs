//! Configuration types for withholding reference data.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML tax table files.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{FilingStatus, TaxBracketRow};

/// Bracket table file structure (`federal.yaml`, `states/<CODE>.yaml`).
///
/// ```yaml
/// tax_year: 2024
/// jurisdiction: federal
/// source: IRS Rev. Proc. 2023-34
/// brackets:
///   single:
///     - { bracket_min: 0, bracket_max: 11600, tax_rate: 0.10, base_tax: 0 }
///     - { bracket_min: 11600, bracket_max: null, tax_rate: 0.12, base_tax: 1160 }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BracketTableFile {
    /// The tax year these tables apply to.
    pub tax_year: i32,
    /// `federal` or a two-letter state code.
    pub jurisdiction: String,
    /// Where the figures were taken from.
    #[serde(default)]
    pub source: Option<String>,
    /// Bracket rows per filing status.
    pub brackets: HashMap<FilingStatus, Vec<TaxBracketRow>>,
}

/// Social Security (OASDI) employee rate and annual wage base.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SocialSecurityRates {
    /// Employee rate as a fraction.
    pub rate: Decimal,
    /// Annual wage base above which no tax is due.
    pub wage_base: Decimal,
}

/// Medicare employee rate (uncapped).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MedicareRates {
    /// Employee rate as a fraction.
    pub rate: Decimal,
}

/// Additional Medicare surtax rate and annual threshold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdditionalMedicareRates {
    /// Surtax rate as a fraction.
    pub rate: Decimal,
    /// Annual wages above which the surtax applies.
    pub threshold: Decimal,
}

/// A state disability insurance program.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisabilityProgram {
    /// Employee rate as a fraction.
    pub rate: Decimal,
    /// Annual wage base; `None` when the program is uncapped.
    #[serde(default)]
    pub wage_base: Option<Decimal>,
}

/// Statutory flat-rate withholdings for a tax year (`statutory.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatutoryRates {
    /// Social Security.
    pub social_security: SocialSecurityRates,
    /// Medicare.
    pub medicare: MedicareRates,
    /// Additional Medicare surtax.
    pub additional_medicare: AdditionalMedicareRates,
    /// Disability programs keyed by upper-case state code.
    #[serde(default)]
    pub state_disability: HashMap<String, DisabilityProgram>,
}

impl StatutoryRates {
    /// Returns the disability program for a state, if it has one.
    pub fn disability_program(&self, state_code: &str) -> Option<&DisabilityProgram> {
        self.state_disability.get(&state_code.trim().to_uppercase())
    }
}

impl Default for StatutoryRates {
    /// 6.2% up to $160,200; 1.45%; 0.9% over $200,000; CA SDI 0.9% up to $153,164.
    fn default() -> Self {
        let mut state_disability = HashMap::new();
        state_disability.insert(
            "CA".to_string(),
            DisabilityProgram {
                rate: Decimal::new(9, 3),
                wage_base: Some(Decimal::from(153_164)),
            },
        );

        Self {
            social_security: SocialSecurityRates {
                rate: Decimal::new(62, 3),
                wage_base: Decimal::from(160_200),
            },
            medicare: MedicareRates {
                rate: Decimal::new(145, 4),
            },
            additional_medicare: AdditionalMedicareRates {
                rate: Decimal::new(9, 3),
                threshold: Decimal::from(200_000),
            },
            state_disability,
        }
    }
}

/// Bracket tables and statutory rates for one tax year.
#[derive(Debug, Clone, Default)]
pub struct TaxYearTables {
    /// Federal rows per filing status.
    pub federal: HashMap<FilingStatus, Vec<TaxBracketRow>>,
    /// State rows keyed by upper-case state code, then filing status.
    pub states: HashMap<String, HashMap<FilingStatus, Vec<TaxBracketRow>>>,
    /// Statutory rates; `None` means the defaults apply.
    pub statutory: Option<StatutoryRates>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_statutory_rates() {
        let rates = StatutoryRates::default();
        assert_eq!(rates.social_security.rate.to_string(), "0.062");
        assert_eq!(rates.social_security.wage_base, Decimal::from(160_200));
        assert_eq!(rates.medicare.rate.to_string(), "0.0145");
        assert_eq!(rates.additional_medicare.rate.to_string(), "0.009");
        assert_eq!(rates.additional_medicare.threshold, Decimal::from(200_000));

        let ca = rates.disability_program("ca").unwrap();
        assert_eq!(ca.rate.to_string(), "0.009");
        assert_eq!(ca.wage_base, Some(Decimal::from(153_164)));
        assert!(rates.disability_program("TX").is_none());
    }

    #[test]
    fn test_deserialize_statutory_rates() {
        let yaml = r#"
social_security: { rate: 0.062, wage_base: 176100 }
medicare: { rate: 0.0145 }
additional_medicare: { rate: 0.009, threshold: 200000 }
state_disability:
  CA: { rate: 0.012 }
  NJ: { rate: 0.0023, wage_base: 165400 }
"#;
        let rates: StatutoryRates = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rates.social_security.wage_base, Decimal::from(176_100));
        assert_eq!(rates.disability_program("CA").unwrap().wage_base, None);
        assert_eq!(
            rates.disability_program("NJ").unwrap().wage_base,
            Some(Decimal::from(165_400))
        );
    }

    #[test]
    fn test_deserialize_bracket_table_file() {
        let yaml = r#"
tax_year: 2024
jurisdiction: federal
brackets:
  single:
    - { bracket_min: 0, bracket_max: 11600, tax_rate: 0.10, base_tax: 0 }
    - { bracket_min: 11600, bracket_max: null, tax_rate: 0.12, base_tax: 1160 }
"#;
        let file: BracketTableFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.tax_year, 2024);
        assert!(file.source.is_none());
        let single = &file.brackets[&FilingStatus::Single];
        assert_eq!(single.len(), 2);
        assert_eq!(single[1].bracket_max, None);
    }
}
