//! Marginal bracket walk shared by the federal and state calculators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TaxBracketRow;

/// The pieces of an annual bracket computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketComputation {
    /// Income the brackets were applied to.
    pub income: Decimal,
    /// Tax accumulated by walking every bracket from zero.
    pub marginal_tax: Decimal,
    /// `base_tax` of the bracket containing `income`.
    pub base_tax: Decimal,
    /// Index of the bracket containing `income`, if any.
    pub matched_bracket: Option<usize>,
    /// `marginal_tax + base_tax`.
    pub annual_tax: Decimal,
}

/// Applies a bracket table to an annual income.
///
/// The walk accumulates `min(remaining, width) × rate` from the lowest
/// bracket up. The precomputed `base_tax` of the bracket that contains the
/// full income is then added once on top. Because `base_tax` already equals
/// the tax on every lower bracket, the lower brackets are counted twice;
/// this matches the payroll figures the system has always produced.
///
/// `rows` must be sorted ascending; an empty table yields zero.
///
/// # Examples
///
/// ```
/// use payroll_withholding::calculation::apply_brackets;
/// use payroll_withholding::models::TaxBracketRow;
/// use rust_decimal::Decimal;
///
/// let rows = vec![
///     TaxBracketRow {
///         bracket_min: Decimal::ZERO,
///         bracket_max: Some(Decimal::from(1000)),
///         tax_rate: Decimal::new(10, 2),
///         base_tax: Decimal::ZERO,
///         standard_deduction: Decimal::ZERO,
///         personal_exemption: Decimal::ZERO,
///     },
///     TaxBracketRow {
///         bracket_min: Decimal::from(1000),
///         bracket_max: None,
///         tax_rate: Decimal::new(20, 2),
///         base_tax: Decimal::from(100),
///         standard_deduction: Decimal::ZERO,
///         personal_exemption: Decimal::ZERO,
///     },
/// ];
///
/// let result = apply_brackets(Decimal::from(1500), &rows);
/// assert_eq!(result.marginal_tax, Decimal::from(200));
/// assert_eq!(result.base_tax, Decimal::from(100));
/// assert_eq!(result.annual_tax, Decimal::from(300));
/// ```
pub fn apply_brackets(income: Decimal, rows: &[TaxBracketRow]) -> BracketComputation {
    let income = income.max(Decimal::ZERO);
    let mut remaining = income;
    let mut marginal_tax = Decimal::ZERO;

    for row in rows {
        if remaining <= Decimal::ZERO {
            break;
        }

        let taxable = match row.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };

        marginal_tax += taxable * row.tax_rate;
        remaining -= taxable;
    }

    let matched_bracket = rows.iter().position(|row| row.contains(income));
    let base_tax = matched_bracket
        .map(|index| rows[index].base_tax)
        .unwrap_or(Decimal::ZERO);

    BracketComputation {
        income,
        marginal_tax,
        base_tax,
        matched_bracket,
        annual_tax: marginal_tax + base_tax,
    }
}
