//! Salary calculation modules.
//!
//! This module provides the calculation logic for the salary calculator:
//! gross↔net payroll per country, the net→gross solver behind it, and
//! raise/budget planning on employer cost.

pub mod budget;
pub mod common;
pub mod payroll;
pub mod solver;

pub use budget::{AffordableRaise, BudgetError, BudgetPlanner, RaiseImpact};
pub use common::MonthlyAnnual;
pub use payroll::{ContributionAmount, NetToGross, PayrollCalculator, SalaryBreakdown, SalaryError};
