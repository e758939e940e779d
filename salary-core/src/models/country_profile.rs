//! Statutory rate profiles for the supported countries.
//!
//! A [`CountryProfile`] bundles every rate needed to turn a monthly gross
//! salary into net pay and employer cost. The built-in profiles carry the
//! 2026 rates; `salary-data` can replace them from CSV or TOML files, in
//! which case [`CountryProfile::validate`] guards the invariants the
//! calculations rely on.
//!
//! | | EE | LV | LT |
//! |---|---|---|---|
//! | Employee | unemployment 1.6% | social insurance 10.5% | social 12.52%, health 6.98% |
//! | Employer | social tax 33%, unemployment 0.8% | social insurance 23.59% | social insurance 1.77% |
//! | Pension | 0 / 2 / 4 / 6% | none | 0 / 3% |
//! | Exemption | €700 | €550 | €747, tapered above €1 153 |
//! | Bands | 22% | 25.5%, 33% above €8 775 | 20%, 25% above €6 936.45, 32% above €11 560.75 |

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{max, min};
use crate::models::CountryCode;

/// Tax year of the built-in profiles.
pub const BUILTIN_TAX_YEAR: i32 = 2026;

/// Errors raised when a profile breaks one of its invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// A contribution or tax rate is outside [0, 1).
    #[error("rate for {name} must be between 0 and 1, got {rate}")]
    InvalidRate { name: String, rate: Decimal },

    /// The basic exemption cannot be negative.
    #[error("exemption amount must be non-negative, got {0}")]
    NegativeExemption(Decimal),

    /// The exemption taper must be a non-negative rate.
    #[error("exemption taper rate must be non-negative, got {0}")]
    InvalidTaperRate(Decimal),

    /// A profile without any income tax band.
    #[error("at least one income tax band is required")]
    NoTaxBands,

    /// The lowest band must start at zero.
    #[error("first income tax band must start at 0, got {0}")]
    FirstBandNotZero(Decimal),

    /// A band does not start where the previous one ended.
    #[error("income tax band starting at {found} does not follow the previous band ending at {expected}")]
    BandGap { expected: Decimal, found: Decimal },

    /// A band whose upper bound is not above its lower bound.
    #[error("income tax band upper bound {max} must exceed lower bound {min}")]
    InvalidBandRange { min: Decimal, max: Decimal },

    /// Only the last band may be open-ended, and it must be.
    #[error("only the last income tax band may be open-ended")]
    MisplacedOpenBand,

    /// The last band has an upper bound, leaving high incomes untaxed.
    #[error("last income tax band must be open-ended, got upper bound {0}")]
    ClosedTopBand(Decimal),

    /// The default pension rate is not among the allowed rates.
    #[error("default pension rate {0} is not one of the allowed rates")]
    DefaultPensionNotAllowed(Decimal),

    /// Deductions at the top of the scale would consume the whole salary.
    #[error("combined marginal deduction rate must stay below 100%, got {0}")]
    MarginalRateTooHigh(Decimal),
}

/// A named contribution rate, e.g. "unemployment insurance" at 1.6%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRate {
    pub name: String,
    pub rate: Decimal,
}

impl ContributionRate {
    pub fn new(
        name: &str,
        rate: Decimal,
    ) -> Self {
        Self {
            name: name.to_string(),
            rate,
        }
    }
}

/// Monthly tax-free amount subtracted from the income tax base.
///
/// When `taper_start` is set, the amount shrinks by `taper_rate` for every
/// euro of gross salary above it and never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemption {
    pub amount: Decimal,
    #[serde(default)]
    pub taper_start: Option<Decimal>,
    #[serde(default)]
    pub taper_rate: Decimal,
}

impl Exemption {
    pub fn flat(amount: Decimal) -> Self {
        Self {
            amount,
            taper_start: None,
            taper_rate: Decimal::ZERO,
        }
    }

    pub fn tapered(
        amount: Decimal,
        taper_start: Decimal,
        taper_rate: Decimal,
    ) -> Self {
        Self {
            amount,
            taper_start: Some(taper_start),
            taper_rate,
        }
    }

    /// Exemption available for the given monthly gross salary.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::Exemption;
    ///
    /// let exemption = Exemption::tapered(dec!(747), dec!(1153), dec!(0.49));
    ///
    /// assert_eq!(exemption.amount_for(dec!(1000)), dec!(747));
    /// assert_eq!(exemption.amount_for(dec!(2000)), dec!(331.97));
    /// assert_eq!(exemption.amount_for(dec!(3000)), dec!(0));
    /// ```
    pub fn amount_for(
        &self,
        gross: Decimal,
    ) -> Decimal {
        match self.taper_start {
            Some(start) if gross > start => gross
                .checked_sub(start)
                .and_then(|excess| self.taper_rate.checked_mul(excess))
                .map_or(Decimal::ZERO, |cut| max(Decimal::ZERO, self.amount - cut)),
            _ => self.amount,
        }
    }
}

/// One progressive income tax band.
///
/// `max_income` of `None` marks the open-ended top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBand {
    pub min_income: Decimal,
    #[serde(default)]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBand {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            rate,
        }
    }

    /// Tax due on the slice of `taxable` that falls inside this band.
    fn tax_on(
        &self,
        taxable: Decimal,
    ) -> Decimal {
        if taxable <= self.min_income {
            return Decimal::ZERO;
        }
        let top = match self.max_income {
            Some(upper) => min(taxable, upper),
            None => taxable,
        };
        (top - self.min_income) * self.rate
    }
}

/// Every statutory rate needed to calculate one country's payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub country: CountryCode,
    pub tax_year: i32,
    /// Rates withheld from the employee's gross salary.
    pub employee_contributions: Vec<ContributionRate>,
    /// Rates paid by the employer on top of gross salary.
    pub employer_contributions: Vec<ContributionRate>,
    /// Funded pension rates the employee may choose between.
    #[serde(default)]
    pub pension_rates: Vec<Decimal>,
    #[serde(default)]
    pub default_pension_rate: Decimal,
    /// Whether employee contributions reduce the income tax base.
    #[serde(default)]
    pub social_deductible: bool,
    pub exemption: Exemption,
    pub tax_bands: Vec<TaxBand>,
}

impl CountryProfile {
    /// Returns the built-in 2026 profile for `country`.
    pub fn builtin(country: CountryCode) -> Self {
        match country {
            CountryCode::Estonia => Self::estonia_2026(),
            CountryCode::Latvia => Self::latvia_2026(),
            CountryCode::Lithuania => Self::lithuania_2026(),
        }
    }

    pub fn estonia_2026() -> Self {
        Self {
            country: CountryCode::Estonia,
            tax_year: BUILTIN_TAX_YEAR,
            employee_contributions: vec![ContributionRate::new(
                "unemployment insurance",
                Decimal::new(16, 3),
            )],
            employer_contributions: vec![
                ContributionRate::new("social tax", Decimal::new(33, 2)),
                ContributionRate::new("unemployment insurance", Decimal::new(8, 3)),
            ],
            pension_rates: vec![
                Decimal::ZERO,
                Decimal::new(2, 2),
                Decimal::new(4, 2),
                Decimal::new(6, 2),
            ],
            default_pension_rate: Decimal::new(2, 2),
            social_deductible: false,
            exemption: Exemption::flat(Decimal::new(700, 0)),
            tax_bands: vec![TaxBand::new(Decimal::ZERO, None, Decimal::new(22, 2))],
        }
    }

    pub fn latvia_2026() -> Self {
        let upper_threshold = Decimal::new(8775, 0);
        Self {
            country: CountryCode::Latvia,
            tax_year: BUILTIN_TAX_YEAR,
            employee_contributions: vec![ContributionRate::new(
                "social insurance",
                Decimal::new(105, 3),
            )],
            employer_contributions: vec![ContributionRate::new(
                "social insurance",
                Decimal::new(2359, 4),
            )],
            pension_rates: vec![Decimal::ZERO],
            default_pension_rate: Decimal::ZERO,
            social_deductible: true,
            exemption: Exemption::flat(Decimal::new(550, 0)),
            tax_bands: vec![
                TaxBand::new(Decimal::ZERO, Some(upper_threshold), Decimal::new(255, 3)),
                TaxBand::new(upper_threshold, None, Decimal::new(33, 2)),
            ],
        }
    }

    pub fn lithuania_2026() -> Self {
        let middle_threshold = Decimal::new(693645, 2);
        let upper_threshold = Decimal::new(1156075, 2);
        Self {
            country: CountryCode::Lithuania,
            tax_year: BUILTIN_TAX_YEAR,
            employee_contributions: vec![
                ContributionRate::new("social insurance", Decimal::new(1252, 4)),
                ContributionRate::new("health insurance", Decimal::new(698, 4)),
            ],
            employer_contributions: vec![ContributionRate::new(
                "social insurance",
                Decimal::new(177, 4),
            )],
            pension_rates: vec![Decimal::ZERO, Decimal::new(3, 2)],
            default_pension_rate: Decimal::ZERO,
            social_deductible: false,
            exemption: Exemption::tapered(
                Decimal::new(747, 0),
                Decimal::new(1153, 0),
                Decimal::new(49, 2),
            ),
            tax_bands: vec![
                TaxBand::new(Decimal::ZERO, Some(middle_threshold), Decimal::new(20, 2)),
                TaxBand::new(middle_threshold, Some(upper_threshold), Decimal::new(25, 2)),
                TaxBand::new(upper_threshold, None, Decimal::new(32, 2)),
            ],
        }
    }

    /// Sum of all employee-side contribution rates, excluding pension.
    pub fn employee_rate(&self) -> Decimal {
        self.employee_contributions.iter().map(|c| c.rate).sum()
    }

    /// Sum of all employer-side contribution rates.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::CountryProfile;
    ///
    /// assert_eq!(CountryProfile::estonia_2026().employer_rate(), dec!(0.338));
    /// assert_eq!(CountryProfile::latvia_2026().employer_rate(), dec!(0.2359));
    /// assert_eq!(CountryProfile::lithuania_2026().employer_rate(), dec!(0.0177));
    /// ```
    pub fn employer_rate(&self) -> Decimal {
        self.employer_contributions.iter().map(|c| c.rate).sum()
    }

    /// Highest funded pension rate the employee may choose.
    pub fn max_pension_rate(&self) -> Decimal {
        self.pension_rates
            .iter()
            .copied()
            .fold(self.default_pension_rate, max)
    }

    pub fn allows_pension_rate(
        &self,
        rate: Decimal,
    ) -> bool {
        rate == self.default_pension_rate || self.pension_rates.contains(&rate)
    }

    /// Progressive income tax on a monthly taxable amount.
    pub fn income_tax(
        &self,
        taxable: Decimal,
    ) -> Decimal {
        self.tax_bands.iter().map(|band| band.tax_on(taxable)).sum()
    }

    /// Rate of the open-ended top band.
    pub fn top_band_rate(&self) -> Decimal {
        self.tax_bands
            .last()
            .map(|band| band.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Share of an extra euro of gross salary lost to deductions in the
    /// worst case: highest pension, top band and a tapering exemption.
    pub fn max_marginal_rate(&self) -> Decimal {
        let social = self.employee_rate() + self.max_pension_rate();
        let base_share = if self.social_deductible {
            Decimal::ONE - social
        } else {
            Decimal::ONE
        };
        social + self.top_band_rate() * base_share * (Decimal::ONE + self.exemption.taper_rate)
    }

    /// Validates the profile values.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if:
    /// - any contribution, pension or band rate is not in [0, 1)
    /// - the exemption amount or taper rate is negative
    /// - the bands are empty, do not start at 0, leave gaps, or the top band is closed
    /// - the default pension rate is not one of the allowed rates
    /// - the combined marginal deduction rate reaches 100%
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::{CountryProfile, ProfileError};
    ///
    /// let mut profile = CountryProfile::latvia_2026();
    /// profile.exemption.amount = dec!(-1);
    ///
    /// assert_eq!(profile.validate(), Err(ProfileError::NegativeExemption(dec!(-1))));
    /// ```
    pub fn validate(&self) -> Result<(), ProfileError> {
        let contributions = self
            .employee_contributions
            .iter()
            .chain(self.employer_contributions.iter());
        for contribution in contributions {
            check_rate(&contribution.name, contribution.rate)?;
        }
        for rate in &self.pension_rates {
            check_rate("pension", *rate)?;
        }
        check_rate("pension", self.default_pension_rate)?;
        if !self.pension_rates.is_empty() && !self.pension_rates.contains(&self.default_pension_rate)
        {
            return Err(ProfileError::DefaultPensionNotAllowed(
                self.default_pension_rate,
            ));
        }

        if self.exemption.amount < Decimal::ZERO {
            return Err(ProfileError::NegativeExemption(self.exemption.amount));
        }
        if self.exemption.taper_rate < Decimal::ZERO {
            return Err(ProfileError::InvalidTaperRate(self.exemption.taper_rate));
        }

        self.validate_bands()?;

        let marginal = self.max_marginal_rate();
        if marginal >= Decimal::ONE {
            return Err(ProfileError::MarginalRateTooHigh(marginal));
        }
        Ok(())
    }

    fn validate_bands(&self) -> Result<(), ProfileError> {
        let first = self.tax_bands.first().ok_or(ProfileError::NoTaxBands)?;
        if !first.min_income.is_zero() {
            return Err(ProfileError::FirstBandNotZero(first.min_income));
        }

        let last_index = self.tax_bands.len() - 1;
        for (index, band) in self.tax_bands.iter().enumerate() {
            check_rate("income tax", band.rate)?;
            match band.max_income {
                Some(upper) if index == last_index => {
                    return Err(ProfileError::ClosedTopBand(upper));
                }
                Some(upper) if upper <= band.min_income => {
                    return Err(ProfileError::InvalidBandRange {
                        min: band.min_income,
                        max: upper,
                    });
                }
                Some(upper) => {
                    let next = &self.tax_bands[index + 1];
                    if next.min_income != upper {
                        return Err(ProfileError::BandGap {
                            expected: upper,
                            found: next.min_income,
                        });
                    }
                }
                None if index != last_index => return Err(ProfileError::MisplacedOpenBand),
                None => {}
            }
        }
        Ok(())
    }
}

fn percent(rate: Decimal) -> String {
    format!("{:.2}%", rate * Decimal::ONE_HUNDRED)
}

impl fmt::Display for CountryProfile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{} ({}), tax year {}",
            self.country.name(),
            self.country,
            self.tax_year
        )?;
        writeln!(f, "  Employee contributions:")?;
        for c in &self.employee_contributions {
            writeln!(f, "    {:<28}{:>8}", c.name, percent(c.rate))?;
        }
        writeln!(f, "  Employer contributions:")?;
        for c in &self.employer_contributions {
            writeln!(f, "    {:<28}{:>8}", c.name, percent(c.rate))?;
        }
        let pension: Vec<String> = self.pension_rates.iter().map(|r| percent(*r)).collect();
        writeln!(
            f,
            "  Funded pension: {} (default {})",
            pension.join(", "),
            percent(self.default_pension_rate)
        )?;
        writeln!(
            f,
            "  Social contributions deductible: {}",
            if self.social_deductible { "yes" } else { "no" }
        )?;
        match self.exemption.taper_start {
            Some(start) => writeln!(
                f,
                "  Exemption: \u{20ac}{:.2} per month, reduced by {} above \u{20ac}{:.2}",
                self.exemption.amount,
                percent(self.exemption.taper_rate),
                start
            )?,
            None => writeln!(f, "  Exemption: \u{20ac}{:.2} per month", self.exemption.amount)?,
        }
        writeln!(f, "  Income tax bands:")?;
        for band in &self.tax_bands {
            let range = match band.max_income {
                Some(upper) => format!("\u{20ac}{:.2} to \u{20ac}{:.2}", band.min_income, upper),
                None => format!("above \u{20ac}{:.2}", band.min_income),
            };
            writeln!(f, "    {:<28}{:>8}", range, percent(band.rate))?;
        }
        Ok(())
    }
}

fn check_rate(
    name: &str,
    rate: Decimal,
) -> Result<(), ProfileError> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(ProfileError::InvalidRate {
            name: name.to_string(),
            rate,
        });
    }
    Ok(())
}
