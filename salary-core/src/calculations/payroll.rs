//! Gross↔net salary calculations for one country profile.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Employee contributions: gross × each employee rate |
//! | 2    | Funded pension: gross × chosen pension rate |
//! | 3    | Exemption for this gross (flat, or tapered above a threshold) |
//! | 4    | Tax base: gross, less steps 1 and 2 where social contributions are deductible |
//! | 5    | Taxable income: tax base − exemption, never below zero |
//! | 6    | Income tax: progressive sum over the profile's bands |
//! | 7    | Net: gross − steps 1, 2 and 6 |
//! | 8    | Employer cost: gross + gross × each employer rate |
//!
//! Every step is computed at full precision; the figures in
//! [`SalaryBreakdown`] are then rounded half-up to cents independently.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use salary_core::CountryProfile;
//! use salary_core::calculations::PayrollCalculator;
//!
//! let profile = CountryProfile::estonia_2026();
//! let calculator = PayrollCalculator::new(&profile)
//!     .unwrap()
//!     .with_pension_rate(dec!(0.02))
//!     .unwrap();
//!
//! let result = calculator.gross_to_net(dec!(2000)).unwrap();
//!
//! assert_eq!(result.income_tax, dec!(286.00));
//! assert_eq!(result.employee_contributions[0].amount, dec!(32.00));
//! assert_eq!(result.pension_contribution, dec!(40.00));
//! assert_eq!(result.net, dec!(1642.00));
//! assert_eq!(result.employer_cost, dec!(2676.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{MONTHS_PER_YEAR, max, round_half_up};
use crate::calculations::solver::solve_gross;
use crate::models::{ContributionRate, CountryCode, CountryProfile, ProfileError};

/// Errors that can occur during salary calculations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SalaryError {
    /// Salaries must be strictly positive.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The chosen pension rate is not offered in this country.
    #[error("pension rate {rate} is not available in {country}")]
    UnsupportedPensionRate { country: CountryCode, rate: Decimal },

    /// The rate profile failed validation.
    #[error("invalid rate profile: {0}")]
    Profile(#[from] ProfileError),

    /// No gross amount produces the requested net.
    #[error("no gross salary produces a net of {0}")]
    Unsolvable(Decimal),

    /// The employer cost, or its annual projection, does not fit in a decimal.
    #[error("amount {0} is too large to calculate")]
    Overflow(Decimal),
}

/// A contribution line of a salary breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionAmount {
    pub name: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Monthly salary breakdown, rounded to cents for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub country: CountryCode,
    pub gross: Decimal,

    /// Employee-side statutory contributions, one line per rate.
    pub employee_contributions: Vec<ContributionAmount>,

    pub pension_rate: Decimal,
    pub pension_contribution: Decimal,

    /// Exemption actually applied for this gross.
    pub tax_exempt_amount: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,

    /// Everything withheld from gross: contributions, pension and tax.
    pub total_deductions: Decimal,
    pub net: Decimal,

    /// Employer-side contributions paid on top of gross.
    pub employer_contributions: Vec<ContributionAmount>,
    pub employer_cost: Decimal,
}

impl SalaryBreakdown {
    pub fn employee_contributions_total(&self) -> Decimal {
        self.employee_contributions.iter().map(|c| c.amount).sum()
    }

    pub fn employer_contributions_total(&self) -> Decimal {
        self.employer_contributions.iter().map(|c| c.amount).sum()
    }
}

/// Result of a net→gross calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetToGross {
    /// Breakdown of the solved gross salary.
    pub breakdown: SalaryBreakdown,
    /// Net amount that was asked for.
    pub target_net: Decimal,
    pub iterations: u32,
    pub converged: bool,
}

/// Unrounded intermediate values of one calculation.
#[derive(Debug, Clone)]
struct Exact {
    employee_contributions: Vec<Decimal>,
    pension: Decimal,
    exemption: Decimal,
    taxable: Decimal,
    income_tax: Decimal,
    net: Decimal,
    employer_contributions: Vec<Decimal>,
}

/// Salary calculator bound to one country profile and pension choice.
#[derive(Debug, Clone)]
pub struct PayrollCalculator<'a> {
    profile: &'a CountryProfile,
    pension_rate: Decimal,
}

impl<'a> PayrollCalculator<'a> {
    /// Creates a calculator using the profile's default pension rate.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError::Profile`] if the profile is invalid.
    pub fn new(profile: &'a CountryProfile) -> Result<Self, SalaryError> {
        profile.validate()?;
        Ok(Self {
            profile,
            pension_rate: profile.default_pension_rate,
        })
    }

    /// Selects a funded pension rate (e.g. `0.02` for 2%).
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError::UnsupportedPensionRate`] if the profile does not
    /// offer this rate.
    pub fn with_pension_rate(
        self,
        rate: Decimal,
    ) -> Result<Self, SalaryError> {
        if !self.profile.allows_pension_rate(rate) {
            return Err(SalaryError::UnsupportedPensionRate {
                country: self.profile.country,
                rate,
            });
        }
        Ok(Self {
            pension_rate: rate,
            ..self
        })
    }

    pub fn profile(&self) -> &CountryProfile {
        self.profile
    }

    pub fn pension_rate(&self) -> Decimal {
        self.pension_rate
    }

    /// Calculates net pay and employer cost for a monthly gross salary.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError::NonPositiveAmount`] if `gross` is zero or negative,
    /// or [`SalaryError::Overflow`] if the employer cost is too large to represent.
    pub fn gross_to_net(
        &self,
        gross: Decimal,
    ) -> Result<SalaryBreakdown, SalaryError> {
        if gross <= Decimal::ZERO {
            return Err(SalaryError::NonPositiveAmount(gross));
        }
        let exact = self.exact(gross);
        debug!(
            country = %self.profile.country,
            %gross,
            net = %exact.net,
            "gross-to-net"
        );
        self.breakdown(gross, &exact)
    }

    /// Finds the monthly gross salary that yields `net` take-home pay.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError::NonPositiveAmount`] if `net` is zero or negative,
    /// [`SalaryError::Unsolvable`] if no gross amount can be bracketed, or
    /// [`SalaryError::Overflow`] if the solved gross costs too much to represent.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::CountryProfile;
    /// use salary_core::calculations::PayrollCalculator;
    ///
    /// let profile = CountryProfile::latvia_2026();
    /// let calculator = PayrollCalculator::new(&profile).unwrap();
    ///
    /// let result = calculator.net_to_gross(dec!(1473.80)).unwrap();
    ///
    /// assert!(result.converged);
    /// assert_eq!(result.breakdown.gross, dec!(2000.00));
    /// assert_eq!(result.breakdown.net, dec!(1473.80));
    /// ```
    pub fn net_to_gross(
        &self,
        net: Decimal,
    ) -> Result<NetToGross, SalaryError> {
        if net <= Decimal::ZERO {
            return Err(SalaryError::NonPositiveAmount(net));
        }
        let solution =
            solve_gross(net, |gross| self.exact(gross).net).ok_or(SalaryError::Unsolvable(net))?;
        if !solution.converged {
            warn!(
                country = %self.profile.country,
                target_net = %net,
                gross = %solution.gross,
                "net-to-gross result is approximate"
            );
        }
        let breakdown = self.breakdown(solution.gross, &self.exact(solution.gross))?;
        Ok(NetToGross {
            breakdown,
            target_net: net,
            iterations: solution.iterations,
            converged: solution.converged,
        })
    }

    /// Employer cost of a monthly gross salary, unrounded.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError::Overflow`] if the cost does not fit in a decimal.
    pub fn employer_cost(
        &self,
        gross: Decimal,
    ) -> Result<Decimal, SalaryError> {
        gross
            .checked_mul(Decimal::ONE + self.profile.employer_rate())
            .ok_or(SalaryError::Overflow(gross))
    }

    fn exact(
        &self,
        gross: Decimal,
    ) -> Exact {
        let profile = self.profile;
        let employee_contributions = apply_rates(gross, &profile.employee_contributions);
        let pension = gross * self.pension_rate;
        let social: Decimal = employee_contributions.iter().copied().sum::<Decimal>() + pension;

        let exemption = profile.exemption.amount_for(gross);
        let tax_base = if profile.social_deductible {
            gross - social
        } else {
            gross
        };
        let taxable = max(Decimal::ZERO, tax_base - exemption);
        let income_tax = profile.income_tax(taxable);

        Exact {
            employee_contributions,
            pension,
            exemption,
            taxable,
            income_tax,
            net: gross - social - income_tax,
            employer_contributions: apply_rates(gross, &profile.employer_contributions),
        }
    }

    /// Rounds the exact figures for presentation.
    ///
    /// Every other figure is bounded by the employer cost, so checking that
    /// twelve months of it fit keeps annual projections of the breakdown safe.
    fn breakdown(
        &self,
        gross: Decimal,
        exact: &Exact,
    ) -> Result<SalaryBreakdown, SalaryError> {
        let employer_cost = exact
            .employer_contributions
            .iter()
            .try_fold(gross, |total, amount| total.checked_add(*amount))
            .filter(|cost| cost.checked_mul(Decimal::from(MONTHS_PER_YEAR)).is_some())
            .ok_or(SalaryError::Overflow(gross))?;

        Ok(SalaryBreakdown {
            country: self.profile.country,
            gross: round_half_up(gross),
            employee_contributions: rounded_lines(
                &self.profile.employee_contributions,
                &exact.employee_contributions,
            ),
            pension_rate: self.pension_rate,
            pension_contribution: round_half_up(exact.pension),
            tax_exempt_amount: round_half_up(exact.exemption),
            taxable_income: round_half_up(exact.taxable),
            income_tax: round_half_up(exact.income_tax),
            total_deductions: round_half_up(gross - exact.net),
            net: round_half_up(exact.net),
            employer_contributions: rounded_lines(
                &self.profile.employer_contributions,
                &exact.employer_contributions,
            ),
            employer_cost: round_half_up(employer_cost),
        })
    }
}

fn apply_rates(
    gross: Decimal,
    rates: &[ContributionRate],
) -> Vec<Decimal> {
    rates.iter().map(|c| gross * c.rate).collect()
}

fn rounded_lines(
    rates: &[ContributionRate],
    amounts: &[Decimal],
) -> Vec<ContributionAmount> {
    rates
        .iter()
        .zip(amounts)
        .map(|(rate, amount)| ContributionAmount {
            name: rate.name.clone(),
            rate: rate.rate,
            amount: round_half_up(*amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn estonia_with_pension(profile: &CountryProfile) -> PayrollCalculator<'_> {
        PayrollCalculator::new(profile)
            .unwrap()
            .with_pension_rate(dec!(0.02))
            .unwrap()
    }

    // =========================================================================
    // construction tests
    // =========================================================================

    #[test]
    fn new_uses_default_pension_rate() {
        let profile = CountryProfile::estonia_2026();

        let calculator = PayrollCalculator::new(&profile).unwrap();

        assert_eq!(calculator.pension_rate(), dec!(0.02));
    }

    #[test]
    fn new_rejects_invalid_profile() {
        let mut profile = CountryProfile::estonia_2026();
        profile.tax_bands.clear();

        let result = PayrollCalculator::new(&profile);

        assert_eq!(
            result.unwrap_err(),
            SalaryError::Profile(ProfileError::NoTaxBands)
        );
    }

    #[test]
    fn with_pension_rate_rejects_unavailable_rate() {
        let profile = CountryProfile::latvia_2026();

        let result = PayrollCalculator::new(&profile)
            .unwrap()
            .with_pension_rate(dec!(0.02));

        assert_eq!(
            result.unwrap_err(),
            SalaryError::UnsupportedPensionRate {
                country: CountryCode::Latvia,
                rate: dec!(0.02),
            }
        );
    }

    // =========================================================================
    // Estonia
    // =========================================================================

    #[test]
    fn estonia_reference_example() {
        let profile = CountryProfile::estonia_2026();
        let calculator = estonia_with_pension(&profile);

        let result = calculator.gross_to_net(dec!(2000)).unwrap();

        assert_eq!(result.employee_contributions[0].amount, dec!(32.00));
        assert_eq!(result.pension_contribution, dec!(40.00));
        assert_eq!(result.tax_exempt_amount, dec!(700.00));
        assert_eq!(result.taxable_income, dec!(1300.00));
        assert_eq!(result.income_tax, dec!(286.00));
        assert_eq!(result.total_deductions, dec!(358.00));
        assert_eq!(result.net, dec!(1642.00));
        assert_eq!(result.employer_contributions[0].amount, dec!(660.00));
        assert_eq!(result.employer_contributions[1].amount, dec!(16.00));
        assert_eq!(result.employer_cost, dec!(2676.00));
    }

    #[test]
    fn estonia_below_exemption_has_no_income_tax() {
        let profile = CountryProfile::estonia_2026();
        let calculator = estonia_with_pension(&profile);

        let result = calculator.gross_to_net(dec!(500)).unwrap();

        assert_eq!(result.taxable_income, dec!(0.00));
        assert_eq!(result.income_tax, dec!(0.00));
        assert_eq!(result.net, dec!(482.00));
        assert_eq!(result.employer_cost, dec!(669.00));
    }

    #[test]
    fn estonia_without_pension() {
        let profile = CountryProfile::estonia_2026();
        let calculator = PayrollCalculator::new(&profile)
            .unwrap()
            .with_pension_rate(Decimal::ZERO)
            .unwrap();

        let result = calculator.gross_to_net(dec!(700)).unwrap();

        assert_eq!(result.pension_contribution, dec!(0.00));
        assert_eq!(result.net, dec!(688.80));
        assert_eq!(result.employer_cost, dec!(936.60));
    }

    // =========================================================================
    // Latvia
    // =========================================================================

    #[test]
    fn latvia_deducts_social_insurance_before_tax() {
        let profile = CountryProfile::latvia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        let result = calculator.gross_to_net(dec!(2000)).unwrap();

        assert_eq!(result.employee_contributions_total(), dec!(210.00));
        assert_eq!(result.taxable_income, dec!(1240.00));
        assert_eq!(result.income_tax, dec!(316.20));
        assert_eq!(result.net, dec!(1473.80));
        assert_eq!(result.employer_cost, dec!(2471.80));
    }

    #[test]
    fn latvia_applies_upper_band() {
        let profile = CountryProfile::latvia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        let result = calculator.gross_to_net(dec!(12000)).unwrap();

        assert_eq!(result.taxable_income, dec!(10190.00));
        assert_eq!(result.income_tax, dec!(2704.58));
        assert_eq!(result.net, dec!(8035.43));
        assert_eq!(result.employer_cost, dec!(14830.80));
    }

    // =========================================================================
    // Lithuania
    // =========================================================================

    #[test]
    fn lithuania_full_exemption_below_taper() {
        let profile = CountryProfile::lithuania_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        let result = calculator.gross_to_net(dec!(1000)).unwrap();

        assert_eq!(result.employee_contributions_total(), dec!(195.00));
        assert_eq!(result.tax_exempt_amount, dec!(747.00));
        assert_eq!(result.income_tax, dec!(50.60));
        assert_eq!(result.net, dec!(754.40));
        assert_eq!(result.employer_cost, dec!(1017.70));
    }

    #[test]
    fn lithuania_tapers_exemption() {
        let profile = CountryProfile::lithuania_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        let result = calculator.gross_to_net(dec!(2000)).unwrap();

        assert_eq!(result.tax_exempt_amount, dec!(331.97));
        assert_eq!(result.taxable_income, dec!(1668.03));
        assert_eq!(result.income_tax, dec!(333.61));
        assert_eq!(result.net, dec!(1276.39));
        assert_eq!(result.employer_cost, dec!(2035.40));
    }

    #[test]
    fn lithuania_pension_is_not_tax_deductible() {
        let profile = CountryProfile::lithuania_2026();
        let calculator = PayrollCalculator::new(&profile)
            .unwrap()
            .with_pension_rate(dec!(0.03))
            .unwrap();

        let result = calculator.gross_to_net(dec!(3000)).unwrap();

        assert_eq!(result.pension_contribution, dec!(90.00));
        assert_eq!(result.tax_exempt_amount, dec!(0.00));
        assert_eq!(result.income_tax, dec!(600.00));
        assert_eq!(result.net, dec!(1725.00));
    }

    // =========================================================================
    // guard tests
    // =========================================================================

    #[test]
    fn gross_to_net_rejects_zero() {
        let profile = CountryProfile::estonia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        assert_eq!(
            calculator.gross_to_net(Decimal::ZERO),
            Err(SalaryError::NonPositiveAmount(Decimal::ZERO))
        );
    }

    #[test]
    fn net_to_gross_rejects_negative() {
        let profile = CountryProfile::estonia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        assert_eq!(
            calculator.net_to_gross(dec!(-10)),
            Err(SalaryError::NonPositiveAmount(dec!(-10)))
        );
    }

    // =========================================================================
    // net-to-gross tests
    // =========================================================================

    #[test]
    fn net_to_gross_recovers_estonia_reference() {
        let profile = CountryProfile::estonia_2026();
        let calculator = estonia_with_pension(&profile);

        let result = calculator.net_to_gross(dec!(1642.00)).unwrap();

        assert!(result.converged);
        assert_eq!(result.target_net, dec!(1642.00));
        assert_eq!(result.breakdown.gross, dec!(2000.00));
        assert_eq!(result.breakdown.employer_cost, dec!(2676.00));
    }

    #[test]
    fn net_to_gross_recovers_lithuania_taper_region() {
        let profile = CountryProfile::lithuania_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        let result = calculator.net_to_gross(dec!(754.40)).unwrap();

        assert!(result.converged);
        assert_eq!(result.breakdown.gross, dec!(1000.00));
    }

    #[test]
    fn net_to_gross_is_within_one_cent_for_rounded_net() {
        let profile = CountryProfile::lithuania_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        // Forward net 1276.394 is shown as 1276.39.
        let result = calculator.net_to_gross(dec!(1276.39)).unwrap();

        assert!((result.breakdown.gross - dec!(2000)).abs() <= dec!(0.01));
        assert_eq!(result.breakdown.net, dec!(1276.39));
    }

    #[test]
    fn employer_cost_is_unrounded() {
        let profile = CountryProfile::latvia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        assert_eq!(calculator.employer_cost(dec!(1000.01)), Ok(dec!(1235.912359)));
    }

    // =========================================================================
    // overflow tests
    // =========================================================================

    #[test]
    fn gross_to_net_rejects_largest_decimal() {
        let profile = CountryProfile::estonia_2026();
        let calculator = estonia_with_pension(&profile);

        assert_eq!(
            calculator.gross_to_net(Decimal::MAX),
            Err(SalaryError::Overflow(Decimal::MAX))
        );
    }

    #[test]
    fn gross_to_net_rejects_gross_whose_annual_cost_overflows() {
        let profile = CountryProfile::lithuania_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();
        let gross = Decimal::MAX / dec!(12);

        assert_eq!(
            calculator.gross_to_net(gross),
            Err(SalaryError::Overflow(gross))
        );
    }

    #[test]
    fn net_to_gross_rejects_net_beyond_representable_cost() {
        let profile = CountryProfile::latvia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        let result = calculator.net_to_gross(Decimal::MAX / dec!(4));

        assert!(matches!(
            result,
            Err(SalaryError::Overflow(_) | SalaryError::Unsolvable(_))
        ));
    }

    #[test]
    fn employer_cost_rejects_overflow() {
        let profile = CountryProfile::estonia_2026();
        let calculator = PayrollCalculator::new(&profile).unwrap();

        assert_eq!(
            calculator.employer_cost(Decimal::MAX),
            Err(SalaryError::Overflow(Decimal::MAX))
        );
    }
}
