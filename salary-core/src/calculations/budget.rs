//! Raise and budget planning on employer cost.
//!
//! Employer cost is linear in gross salary, `cost = salary × (1 + rate)`,
//! so both directions are closed-form:
//!
//! - **Raise → cost**: a planned raise percentage gives the new salary and
//!   the extra employer cost it consumes.
//! - **Budget → raise**: an extra employer budget gives the highest new
//!   salary it pays for, `salary = (cost + budget) / (1 + rate)`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use salary_core::calculations::BudgetPlanner;
//!
//! let planner = BudgetPlanner::new(dec!(0.338));
//!
//! let impact = planner.raise_to_cost(dec!(100000), dec!(5)).unwrap();
//! assert_eq!(impact.cost_increase.monthly, dec!(6690.00));
//!
//! let raise = planner.budget_to_raise(dec!(100000), dec!(5000)).unwrap();
//! assert_eq!(raise.new_salary.monthly, dec!(103736.92));
//! assert_eq!(raise.raise_percent, dec!(3.74));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{MonthlyAnnual, percent_of, rate_from_percent, round_half_up};
use crate::models::CountryProfile;

/// Errors that can occur during budget planning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// The current salary cannot be negative.
    #[error("current salary must be non-negative, got {0}")]
    NegativeSalary(Decimal),

    /// A raise or budget cut that would take the salary below zero.
    #[error("resulting salary would be negative: {0}")]
    NegativeResult(Decimal),

    /// A figure or its annual projection does not fit in a decimal.
    #[error("amount {0} is too large to calculate")]
    Overflow(Decimal),
}

/// Cost impact of a planned raise percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseImpact {
    pub raise_percent: Decimal,
    pub current_salary: MonthlyAnnual,
    pub new_salary: MonthlyAnnual,
    pub salary_increase: MonthlyAnnual,
    pub current_cost: MonthlyAnnual,
    pub new_cost: MonthlyAnnual,
    pub cost_increase: MonthlyAnnual,
    /// Cost increase as a share of current employer cost.
    pub budget_impact_percent: Decimal,
    pub employer_rate_percent: Decimal,
}

/// Highest raise an extra employer budget pays for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordableRaise {
    pub budget: MonthlyAnnual,
    /// Budget as a share of current employer cost.
    pub budget_percent: Decimal,
    pub current_salary: MonthlyAnnual,
    pub new_salary: MonthlyAnnual,
    pub salary_increase: MonthlyAnnual,
    pub raise_percent: Decimal,
    pub current_cost: MonthlyAnnual,
    pub max_new_cost: MonthlyAnnual,
    pub employer_rate_percent: Decimal,
}

/// Converts between salary raises and employer budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetPlanner {
    employer_rate: Decimal,
}

impl BudgetPlanner {
    pub fn new(employer_rate: Decimal) -> Self {
        Self { employer_rate }
    }

    pub fn for_profile(profile: &CountryProfile) -> Self {
        Self::new(profile.employer_rate())
    }

    pub fn employer_rate(&self) -> Decimal {
        self.employer_rate
    }

    pub fn employer_cost(
        &self,
        salary: Decimal,
    ) -> Result<Decimal, BudgetError> {
        salary
            .checked_mul(Decimal::ONE + self.employer_rate)
            .ok_or(BudgetError::Overflow(salary))
    }

    pub fn salary_for_cost(
        &self,
        cost: Decimal,
    ) -> Result<Decimal, BudgetError> {
        cost.checked_div(Decimal::ONE + self.employer_rate)
            .ok_or(BudgetError::Overflow(cost))
    }

    /// Calculates the employer cost impact of raising `salary` by
    /// `raise_percent` (e.g. `5` for 5%).
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] if `salary` is negative, the raise would
    /// make the salary negative, or a figure is too large to represent.
    pub fn raise_to_cost(
        &self,
        salary: Decimal,
        raise_percent: Decimal,
    ) -> Result<RaiseImpact, BudgetError> {
        check_salary(salary)?;
        let new_salary = salary
            .checked_mul(Decimal::ONE + rate_from_percent(raise_percent))
            .ok_or(BudgetError::Overflow(salary))?;
        if new_salary < Decimal::ZERO {
            return Err(BudgetError::NegativeResult(round_half_up(new_salary)));
        }

        let current_cost = self.employer_cost(salary)?;
        let new_cost = self.employer_cost(new_salary)?;
        let cost_increase = new_cost - current_cost;
        let budget_impact =
            percent_of(cost_increase, current_cost).ok_or(BudgetError::Overflow(cost_increase))?;

        Ok(RaiseImpact {
            raise_percent,
            current_salary: projected(salary)?,
            new_salary: projected(new_salary)?,
            salary_increase: projected(new_salary - salary)?,
            current_cost: projected(current_cost)?,
            new_cost: projected(new_cost)?,
            cost_increase: projected(cost_increase)?,
            budget_impact_percent: round_half_up(budget_impact),
            employer_rate_percent: self.employer_rate_percent(),
        })
    }

    /// Calculates the largest raise an extra monthly employer `budget`
    /// covers for `salary`.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] if `salary` is negative, a negative budget
    /// exceeds the current cost, or a figure is too large to represent.
    pub fn budget_to_raise(
        &self,
        salary: Decimal,
        budget: Decimal,
    ) -> Result<AffordableRaise, BudgetError> {
        check_salary(salary)?;
        let current_cost = self.employer_cost(salary)?;
        let target_cost = current_cost
            .checked_add(budget)
            .ok_or(BudgetError::Overflow(budget))?;
        let new_salary = self.salary_for_cost(target_cost)?;
        if new_salary < Decimal::ZERO {
            return Err(BudgetError::NegativeResult(round_half_up(new_salary)));
        }
        let increase = new_salary - salary;
        if salary.is_zero() {
            warn!(%budget, "current salary is zero; raise percentage reported as 0");
        }

        let budget_percent =
            percent_of(budget, current_cost).ok_or(BudgetError::Overflow(budget))?;
        let raise_percent = percent_of(increase, salary).ok_or(BudgetError::Overflow(increase))?;

        Ok(AffordableRaise {
            budget: projected(budget)?,
            budget_percent: round_half_up(budget_percent),
            current_salary: projected(salary)?,
            new_salary: projected(new_salary)?,
            salary_increase: projected(increase)?,
            raise_percent: round_half_up(raise_percent),
            current_cost: projected(current_cost)?,
            max_new_cost: projected(target_cost)?,
            employer_rate_percent: self.employer_rate_percent(),
        })
    }

    fn employer_rate_percent(&self) -> Decimal {
        round_half_up(self.employer_rate * Decimal::ONE_HUNDRED)
    }
}

fn projected(monthly: Decimal) -> Result<MonthlyAnnual, BudgetError> {
    MonthlyAnnual::checked_from_monthly(monthly).ok_or(BudgetError::Overflow(monthly))
}

fn check_salary(salary: Decimal) -> Result<(), BudgetError> {
    if salary < Decimal::ZERO {
        return Err(BudgetError::NegativeSalary(salary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn estonia() -> BudgetPlanner {
        BudgetPlanner::for_profile(&CountryProfile::estonia_2026())
    }

    // =========================================================================
    // raise_to_cost tests
    // =========================================================================

    #[test]
    fn raise_to_cost_estonia_defaults() {
        let impact = estonia().raise_to_cost(dec!(100000), dec!(5)).unwrap();

        assert_eq!(impact.new_salary.monthly, dec!(105000.00));
        assert_eq!(impact.salary_increase.monthly, dec!(5000.00));
        assert_eq!(impact.salary_increase.annual, dec!(60000.00));
        assert_eq!(impact.current_cost.monthly, dec!(133800.00));
        assert_eq!(impact.new_cost.monthly, dec!(140490.00));
        assert_eq!(impact.cost_increase.monthly, dec!(6690.00));
        assert_eq!(impact.cost_increase.annual, dec!(80280.00));
        assert_eq!(impact.budget_impact_percent, dec!(5.00));
        assert_eq!(impact.employer_rate_percent, dec!(33.80));
    }

    #[test]
    fn raise_to_cost_zero_salary_has_zero_impact() {
        let impact = estonia().raise_to_cost(Decimal::ZERO, dec!(5)).unwrap();

        assert_eq!(impact.cost_increase.monthly, dec!(0.00));
        assert_eq!(impact.budget_impact_percent, dec!(0.00));
    }

    #[test]
    fn raise_to_cost_allows_pay_cut() {
        let impact = estonia().raise_to_cost(dec!(2000), dec!(-10)).unwrap();

        assert_eq!(impact.new_salary.monthly, dec!(1800.00));
        assert_eq!(impact.cost_increase.monthly, dec!(-267.60));
    }

    #[test]
    fn raise_to_cost_rejects_cut_beyond_salary() {
        let result = estonia().raise_to_cost(dec!(2000), dec!(-150));

        assert_eq!(result, Err(BudgetError::NegativeResult(dec!(-1000.00))));
    }

    #[test]
    fn raise_to_cost_rejects_negative_salary() {
        let result = estonia().raise_to_cost(dec!(-1), dec!(5));

        assert_eq!(result, Err(BudgetError::NegativeSalary(dec!(-1))));
    }

    // =========================================================================
    // budget_to_raise tests
    // =========================================================================

    #[test]
    fn budget_to_raise_estonia_defaults() {
        let raise = estonia().budget_to_raise(dec!(100000), dec!(5000)).unwrap();

        assert_eq!(raise.max_new_cost.monthly, dec!(138800.00));
        assert_eq!(raise.new_salary.monthly, dec!(103736.92));
        assert_eq!(raise.new_salary.annual, dec!(1244843.05));
        assert_eq!(raise.salary_increase.monthly, dec!(3736.92));
        assert_eq!(raise.raise_percent, dec!(3.74));
        assert_eq!(raise.budget_percent, dec!(3.74));
        assert_eq!(raise.budget.annual, dec!(60000.00));
    }

    #[test]
    fn budget_to_raise_latvia() {
        let planner = BudgetPlanner::for_profile(&CountryProfile::latvia_2026());

        let raise = planner.budget_to_raise(dec!(2000), dec!(300)).unwrap();

        assert_eq!(raise.new_salary.monthly, dec!(2242.74));
        assert_eq!(raise.raise_percent, dec!(12.14));
        assert_eq!(raise.employer_rate_percent, dec!(23.59));
    }

    #[test]
    fn budget_to_raise_zero_salary_reports_zero_percent() {
        let raise = estonia().budget_to_raise(Decimal::ZERO, dec!(1338)).unwrap();

        assert_eq!(raise.new_salary.monthly, dec!(1000.00));
        assert_eq!(raise.raise_percent, dec!(0.00));
        assert_eq!(raise.budget_percent, dec!(0.00));
    }

    #[test]
    fn budget_to_raise_rejects_cut_beyond_cost() {
        let result = estonia().budget_to_raise(dec!(1000), dec!(-2676));

        assert_eq!(result, Err(BudgetError::NegativeResult(dec!(-1000.00))));
    }

    #[test]
    fn budget_to_raise_inverts_raise_to_cost() {
        let planner = BudgetPlanner::for_profile(&CountryProfile::lithuania_2026());

        let impact = planner.raise_to_cost(dec!(2500), dec!(8)).unwrap();
        let raise = planner
            .budget_to_raise(dec!(2500), impact.cost_increase.monthly)
            .unwrap();

        assert_eq!(raise.new_salary.monthly, impact.new_salary.monthly);
        assert_eq!(raise.raise_percent, dec!(8.00));
    }

    // =========================================================================
    // overflow tests
    // =========================================================================

    #[test]
    fn raise_to_cost_rejects_largest_salary() {
        let result = estonia().raise_to_cost(Decimal::MAX, dec!(5));

        assert_eq!(result, Err(BudgetError::Overflow(Decimal::MAX)));
    }

    #[test]
    fn raise_to_cost_rejects_salary_whose_annual_cost_overflows() {
        let salary = Decimal::MAX / dec!(12);

        let result = estonia().raise_to_cost(salary, Decimal::ZERO);

        assert!(matches!(result, Err(BudgetError::Overflow(_))));
    }

    #[test]
    fn budget_to_raise_rejects_largest_salary() {
        let result = estonia().budget_to_raise(Decimal::MAX, dec!(5000));

        assert_eq!(result, Err(BudgetError::Overflow(Decimal::MAX)));
    }

    #[test]
    fn budget_to_raise_rejects_budget_beyond_range() {
        let result = estonia().budget_to_raise(dec!(100000), Decimal::MAX);

        assert_eq!(result, Err(BudgetError::Overflow(Decimal::MAX)));
    }

    #[test]
    fn budget_to_raise_rejects_raise_percent_beyond_range() {
        let result = estonia().budget_to_raise(dec!(0.01), Decimal::MAX / dec!(100));

        assert!(matches!(result, Err(BudgetError::Overflow(_))));
    }
}
