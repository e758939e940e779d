//! Calculator form state.
//!
//! Inputs are kept as typed text and every call to
//! [`CalculatorForm::compute`] recomputes the result from scratch. Input
//! that is empty, unparseable or out of range leaves the result blank
//! instead of producing an error.

use std::fmt;

use clap::ValueEnum;
use rust_decimal::Decimal;
use salary_core::calculations::common::rate_from_percent;
use salary_core::calculations::{
    AffordableRaise, BudgetPlanner, NetToGross, PayrollCalculator, RaiseImpact, SalaryBreakdown,
};
use salary_core::{CountryCode, CountryProfile, RateTables};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::parse_optional_decimal;

/// What the form calculates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorMode {
    GrossToNet,
    NetToGross,
    #[default]
    RaiseToCost,
    BudgetToRaise,
}

impl CalculatorMode {
    pub fn all() -> &'static [CalculatorMode] {
        &[
            CalculatorMode::GrossToNet,
            CalculatorMode::NetToGross,
            CalculatorMode::RaiseToCost,
            CalculatorMode::BudgetToRaise,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CalculatorMode::GrossToNet => "Gross € → Net Salary",
            CalculatorMode::NetToGross => "Net € → Gross Salary",
            CalculatorMode::RaiseToCost => "Raise % → Cost Impact",
            CalculatorMode::BudgetToRaise => "Budget € → Affordable Raise",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CalculatorMode::GrossToNet => "Calculate take-home pay and employer cost from gross salary",
            CalculatorMode::NetToGross => "Calculate the gross salary needed for a take-home pay",
            CalculatorMode::RaiseToCost => "Calculate budget impact from planned raise %",
            CalculatorMode::BudgetToRaise => "Calculate max raise from budget limit",
        }
    }
}

impl fmt::Display for CalculatorMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one form computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "kebab-case")]
pub enum FormOutcome {
    /// Inputs are missing or invalid; nothing to show.
    Blank,
    GrossToNet(SalaryBreakdown),
    NetToGross(NetToGross),
    RaiseToCost(RaiseImpact),
    BudgetToRaise(AffordableRaise),
}

impl FormOutcome {
    pub fn is_blank(&self) -> bool {
        matches!(self, FormOutcome::Blank)
    }
}

/// Typed inputs of the calculator.
///
/// `salary` is the gross salary in [`CalculatorMode::GrossToNet`], the
/// desired net in [`CalculatorMode::NetToGross`] and the current salary in
/// the budget modes. An empty `pension_rate` selects the country default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorForm {
    pub country: CountryCode,
    pub mode: CalculatorMode,
    pub salary: String,
    pub raise_percent: String,
    pub budget: String,
    /// Funded pension contribution in percent.
    pub pension_rate: String,
}

impl Default for CalculatorForm {
    fn default() -> Self {
        Self {
            country: CountryCode::Estonia,
            mode: CalculatorMode::RaiseToCost,
            salary: "100000".to_string(),
            raise_percent: "5".to_string(),
            budget: "5000".to_string(),
            pension_rate: String::new(),
        }
    }
}

impl CalculatorForm {
    pub fn new(
        country: CountryCode,
        mode: CalculatorMode,
    ) -> Self {
        Self {
            country,
            mode,
            ..Default::default()
        }
    }

    /// Recomputes the result for the current inputs.
    pub fn compute(
        &self,
        tables: &RateTables,
    ) -> FormOutcome {
        let profile = tables.get(self.country);
        let outcome = match self.mode {
            CalculatorMode::GrossToNet => self.gross_to_net(profile),
            CalculatorMode::NetToGross => self.net_to_gross(profile),
            CalculatorMode::RaiseToCost => self.raise_to_cost(profile),
            CalculatorMode::BudgetToRaise => self.budget_to_raise(profile),
        };
        outcome.unwrap_or_else(|| {
            debug!(country = %self.country, mode = ?self.mode, "result left blank");
            FormOutcome::Blank
        })
    }

    fn gross_to_net(
        &self,
        profile: &CountryProfile,
    ) -> Option<FormOutcome> {
        let gross = parse_optional_decimal(&self.salary)?;
        let breakdown = self
            .calculator(profile)?
            .gross_to_net(gross)
            .map_err(log_rejected)
            .ok()?;
        Some(FormOutcome::GrossToNet(breakdown))
    }

    fn net_to_gross(
        &self,
        profile: &CountryProfile,
    ) -> Option<FormOutcome> {
        let net = parse_optional_decimal(&self.salary)?;
        let result = self
            .calculator(profile)?
            .net_to_gross(net)
            .map_err(log_rejected)
            .ok()?;
        Some(FormOutcome::NetToGross(result))
    }

    fn raise_to_cost(
        &self,
        profile: &CountryProfile,
    ) -> Option<FormOutcome> {
        let salary = parse_optional_decimal(&self.salary)?;
        let raise = parse_optional_decimal(&self.raise_percent)?;
        let impact = BudgetPlanner::for_profile(profile)
            .raise_to_cost(salary, raise)
            .map_err(log_rejected)
            .ok()?;
        Some(FormOutcome::RaiseToCost(impact))
    }

    fn budget_to_raise(
        &self,
        profile: &CountryProfile,
    ) -> Option<FormOutcome> {
        let salary = parse_optional_decimal(&self.salary)?;
        let budget = parse_optional_decimal(&self.budget)?;
        let raise = BudgetPlanner::for_profile(profile)
            .budget_to_raise(salary, budget)
            .map_err(log_rejected)
            .ok()?;
        Some(FormOutcome::BudgetToRaise(raise))
    }

    fn calculator<'a>(
        &self,
        profile: &'a CountryProfile,
    ) -> Option<PayrollCalculator<'a>> {
        let calculator = PayrollCalculator::new(profile).map_err(log_rejected).ok()?;
        if self.pension_rate.trim().is_empty() {
            return Some(calculator);
        }
        let percent: Decimal = parse_optional_decimal(&self.pension_rate)?;
        calculator
            .with_pension_rate(rate_from_percent(percent))
            .map_err(log_rejected)
            .ok()
    }
}

fn log_rejected<E: fmt::Display>(error: E) -> E {
    warn!(%error, "input rejected");
    error
}
