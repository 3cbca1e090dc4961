//! Marginal tax bracket rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a marginal bracket table.
///
/// `base_tax` is the cumulative tax owed at `bracket_min`, precomputed when
/// the table is built. State rows also carry the standard deduction and
/// personal exemption for their table; federal rows leave them at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracketRow {
    /// Lower bound of the bracket.
    pub bracket_min: Decimal,
    /// Upper bound of the bracket; `None` for the unbounded top bracket.
    #[serde(default)]
    pub bracket_max: Option<Decimal>,
    /// Marginal rate as a fraction (0.22 for 22%).
    pub tax_rate: Decimal,
    /// Cumulative tax at `bracket_min`.
    #[serde(default)]
    pub base_tax: Decimal,
    /// Annual standard deduction (state tables only).
    #[serde(default)]
    pub standard_deduction: Decimal,
    /// Annual personal exemption (state tables only).
    #[serde(default)]
    pub personal_exemption: Decimal,
}

impl TaxBracketRow {
    /// Returns the width of the bracket, or `None` for the top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.bracket_max.map(|max| max - self.bracket_min)
    }

    /// Returns true if `income` lies within `[bracket_min, bracket_max]`.
    pub fn contains(&self, income: Decimal) -> bool {
        income >= self.bracket_min && self.bracket_max.is_none_or(|max| income <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(min: &str, max: Option<&str>) -> TaxBracketRow {
        TaxBracketRow {
            bracket_min: dec(min),
            bracket_max: max.map(dec),
            tax_rate: dec("0.12"),
            base_tax: dec("1160"),
            standard_deduction: Decimal::ZERO,
            personal_exemption: Decimal::ZERO,
        }
    }

    #[test]
    fn test_width_of_bounded_bracket() {
        assert_eq!(row("11600", Some("47150")).width(), Some(dec("35550")));
    }

    #[test]
    fn test_top_bracket_has_no_width() {
        assert_eq!(row("609350", None).width(), None);
    }

    #[test]
    fn test_contains_is_inclusive_on_both_ends() {
        let bracket = row("11600", Some("47150"));
        assert!(bracket.contains(dec("11600")));
        assert!(bracket.contains(dec("47150")));
        assert!(!bracket.contains(dec("47150.01")));
        assert!(!bracket.contains(dec("11599.99")));
    }

    #[test]
    fn test_top_bracket_contains_everything_above_floor() {
        assert!(row("609350", None).contains(dec("10000000")));
    }

    #[test]
    fn test_deserialize_federal_row_defaults_state_fields() {
        let yaml = "bracket_min: 0\nbracket_max: 11600\ntax_rate: 0.10\n";
        let parsed: TaxBracketRow = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.bracket_max, Some(dec("11600")));
        assert_eq!(parsed.base_tax, Decimal::ZERO);
        assert_eq!(parsed.standard_deduction, Decimal::ZERO);
    }
}
