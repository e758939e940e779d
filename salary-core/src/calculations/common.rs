//! Common utility functions for salary calculations.
//!
//! This module provides shared functionality used across the payroll and
//! budget calculations, including rounding, percentages and the
//! monthly/annual projection used by every result table.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of salary payments in a year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero). The result always carries
/// two decimal places, so `2000` becomes `2000.00`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// assert_eq!(round_half_up(dec!(2000)).to_string(), "2000.00");
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Converts a percentage (e.g. `5` for 5%) to a rate (`0.05`).
pub fn rate_from_percent(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

/// Expresses `part` as a percentage of `whole`.
///
/// Returns zero when `whole` is zero so that an empty salary never
/// produces a division error, and `None` when the percentage does not fit
/// in a decimal.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(5), dec!(200)), Some(dec!(2.5)));
/// assert_eq!(percent_of(dec!(5), dec!(0)), Some(dec!(0)));
/// assert_eq!(percent_of(Decimal::MAX, dec!(0.01)), None);
/// ```
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// A monthly figure together with its annual projection.
///
/// Both values are derived from the same unrounded monthly amount and
/// rounded independently, so `annual` is not always exactly
/// `monthly × 12` after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAnnual {
    pub monthly: Decimal,
    pub annual: Decimal,
}

impl MonthlyAnnual {
    /// Builds the pair from an unrounded monthly amount.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::calculations::common::MonthlyAnnual;
    ///
    /// let amount = MonthlyAnnual::from_monthly(dec!(1000.004));
    /// assert_eq!(amount.monthly, dec!(1000.00));
    /// assert_eq!(amount.annual, dec!(12000.05));
    /// ```
    pub fn from_monthly(monthly: Decimal) -> Self {
        Self {
            monthly: round_half_up(monthly),
            annual: round_half_up(monthly * Decimal::from(MONTHS_PER_YEAR)),
        }
    }

    /// Like [`MonthlyAnnual::from_monthly`], but returns `None` when the
    /// annual amount does not fit in a decimal.
    pub fn checked_from_monthly(monthly: Decimal) -> Option<Self> {
        let annual = monthly.checked_mul(Decimal::from(MONTHS_PER_YEAR))?;
        Some(Self {
            monthly: round_half_up(monthly),
            annual: round_half_up(annual),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(8035.425));

        assert_eq!(result, dec!(8035.43));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_small_values() {
        let result = round_half_up(dec!(0.001));

        assert_eq!(result, dec!(0.00));
    }

    #[test]
    fn round_half_up_pads_to_two_places() {
        assert_eq!(round_half_up(dec!(2676)).to_string(), "2676.00");
        assert_eq!(round_half_up(dec!(1473.8)).to_string(), "1473.80");
    }

    #[test]
    fn round_half_up_handles_long_fractions() {
        let result = round_half_up(dec!(103736.9207772795216741405082));

        assert_eq!(result, dec!(103736.92));
    }

    // =========================================================================
    // max / min tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }

    #[test]
    fn max_clamps_negative_to_zero() {
        assert_eq!(max(dec!(-50.00), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn min_returns_smaller_value() {
        assert_eq!(min(dec!(8775), dec!(10190)), dec!(8775));
        assert_eq!(min(dec!(10190), dec!(8775)), dec!(8775));
    }

    // =========================================================================
    // percentage tests
    // =========================================================================

    #[test]
    fn rate_from_percent_divides_by_hundred() {
        assert_eq!(rate_from_percent(dec!(2)), dec!(0.02));
        assert_eq!(rate_from_percent(dec!(33.8)), dec!(0.338));
    }

    #[test]
    fn percent_of_returns_share() {
        assert_eq!(percent_of(dec!(6690), dec!(133800)), Some(dec!(5)));
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(percent_of(dec!(100), Decimal::ZERO), Some(Decimal::ZERO));
    }

    #[test]
    fn percent_of_overflow_is_none() {
        assert_eq!(percent_of(Decimal::MAX, dec!(0.5)), None);
    }

    // =========================================================================
    // MonthlyAnnual tests
    // =========================================================================

    #[test]
    fn monthly_annual_projects_twelve_months() {
        let amount = MonthlyAnnual::from_monthly(dec!(2676));

        assert_eq!(
            amount,
            MonthlyAnnual {
                monthly: dec!(2676.00),
                annual: dec!(32112.00),
            }
        );
    }

    #[test]
    fn monthly_annual_rounds_annual_from_unrounded_monthly() {
        let amount = MonthlyAnnual::from_monthly(dec!(103736.9207772795216741405082));

        assert_eq!(amount.monthly, dec!(103736.92));
        assert_eq!(amount.annual, dec!(1244843.05));
    }

    #[test]
    fn checked_monthly_annual_matches_unchecked() {
        assert_eq!(
            MonthlyAnnual::checked_from_monthly(dec!(1000.004)),
            Some(MonthlyAnnual::from_monthly(dec!(1000.004)))
        );
    }

    #[test]
    fn checked_monthly_annual_rejects_annual_overflow() {
        assert_eq!(MonthlyAnnual::checked_from_monthly(Decimal::MAX / dec!(6)), None);
    }
}
