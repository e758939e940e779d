//! Plain-text result tables.
//!
//! Every table has a monthly and an annual column. Highlighted rows (the
//! figures a reader is looking for) are marked with `*` in the margin.

use std::fmt::Write;

use rust_decimal::Decimal;
use salary_core::calculations::{
    AffordableRaise, ContributionAmount, MonthlyAnnual, NetToGross, RaiseImpact, SalaryBreakdown,
};
use salary_core::{CountryCode, RateTables};

use crate::form::{CalculatorForm, FormOutcome};
use crate::utils::{format_eur, format_percent};

const LABEL_WIDTH: usize = 32;
const AMOUNT_WIDTH: usize = 16;
const TABLE_WIDTH: usize = 2 + LABEL_WIDTH + 2 * AMOUNT_WIDTH;

/// One line of a result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Amount {
        label: String,
        amount: MonthlyAnnual,
        highlight: bool,
    },
    Separator,
}

impl Row {
    pub fn amount(
        label: impl Into<String>,
        amount: MonthlyAnnual,
    ) -> Self {
        Row::Amount {
            label: label.into(),
            amount,
            highlight: false,
        }
    }

    pub fn highlighted(
        label: impl Into<String>,
        amount: MonthlyAnnual,
    ) -> Self {
        Row::Amount {
            label: label.into(),
            amount,
            highlight: true,
        }
    }

    /// A row for an amount that is already a rounded monthly figure.
    fn monthly(
        label: impl Into<String>,
        monthly: Decimal,
    ) -> Self {
        Self::amount(label, MonthlyAnnual::from_monthly(monthly))
    }
}

/// Renders rows under a `Monthly` / `Annual` header.
pub fn render_table(rows: &[Row]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}",
        "", "Monthly", "Annual"
    );
    for row in rows {
        match row {
            Row::Amount {
                label,
                amount,
                highlight,
            } => {
                let marker = if *highlight { "* " } else { "  " };
                let _ = writeln!(
                    out,
                    "{marker}{label:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}{:>AMOUNT_WIDTH$}",
                    format_eur(amount.monthly),
                    format_eur(amount.annual)
                );
            }
            Row::Separator => {
                let _ = writeln!(out, "{}", "-".repeat(TABLE_WIDTH));
            }
        }
    }
    out
}

/// Gross-to-net breakdown table.
pub fn render_breakdown(breakdown: &SalaryBreakdown) -> String {
    let mut rows = vec![Row::monthly("Gross salary", breakdown.gross)];
    rows.extend(breakdown.employee_contributions.iter().map(contribution_row));
    if !breakdown.pension_rate.is_zero() {
        rows.push(Row::monthly(
            format!("Funded pension ({})", rate_label(breakdown.pension_rate)),
            breakdown.pension_contribution,
        ));
    }
    rows.push(Row::monthly("Tax-exempt amount", breakdown.tax_exempt_amount));
    rows.push(Row::monthly("Taxable income", breakdown.taxable_income));
    rows.push(Row::monthly("Income tax", breakdown.income_tax));
    rows.push(Row::highlighted(
        "Total deductions",
        MonthlyAnnual::from_monthly(breakdown.total_deductions),
    ));
    rows.push(Row::highlighted(
        "Net salary",
        MonthlyAnnual::from_monthly(breakdown.net),
    ));
    rows.push(Row::Separator);
    rows.extend(breakdown.employer_contributions.iter().map(contribution_row));
    rows.push(Row::highlighted(
        "Employer cost",
        MonthlyAnnual::from_monthly(breakdown.employer_cost),
    ));
    render_table(&rows)
}

/// Net-to-gross result: the solved gross followed by its breakdown.
pub fn render_net_to_gross(result: &NetToGross) -> String {
    let mut out = format!(
        "Gross salary for a net of {}: {}\n",
        format_eur(result.target_net),
        format_eur(result.breakdown.gross)
    );
    if !result.converged {
        let _ = writeln!(
            out,
            "Approximate result after {} iterations.",
            result.iterations
        );
    }
    out.push('\n');
    out.push_str(&render_breakdown(&result.breakdown));
    out
}

/// Raise-to-cost table.
pub fn render_raise(impact: &RaiseImpact) -> String {
    let rows = [
        Row::amount("Current salaries", impact.current_salary),
        Row::amount(
            format!("New salaries ({})", signed_percent(impact.raise_percent)),
            impact.new_salary,
        ),
        Row::highlighted("Salary increase", impact.salary_increase),
        Row::Separator,
        Row::amount("Current employer cost", impact.current_cost),
        Row::amount("New employer cost", impact.new_cost),
        Row::highlighted("Total cost increase", impact.cost_increase),
    ];
    let mut out = render_table(&rows);
    let _ = writeln!(
        out,
        "\nBudget impact: {} of current employer cost",
        format_percent(impact.budget_impact_percent)
    );
    let _ = writeln!(
        out,
        "Employer contributions: {}",
        format_percent(impact.employer_rate_percent)
    );
    out
}

/// Budget-to-raise table.
pub fn render_affordable(raise: &AffordableRaise) -> String {
    let mut out = format!(
        "With {} additional budget ({} of current employer cost) you can afford a {} salary increase.\n\n",
        format_eur(raise.budget.monthly),
        format_percent(raise.budget_percent),
        format_percent(raise.raise_percent)
    );
    let rows = [
        Row::amount("Current salaries", raise.current_salary),
        Row::amount("Affordable new salaries", raise.new_salary),
        Row::highlighted("Affordable increase", raise.salary_increase),
        Row::Separator,
        Row::amount("Current employer cost", raise.current_cost),
        Row::amount("Maximum new cost", raise.max_new_cost),
        Row::highlighted("Cost increase (at limit)", raise.budget),
    ];
    out.push_str(&render_table(&rows));
    let _ = writeln!(
        out,
        "\nEmployer contributions: {}",
        format_percent(raise.employer_rate_percent)
    );
    out
}

/// Full report for a form: title, description and the result.
pub fn render_outcome(
    form: &CalculatorForm,
    outcome: &FormOutcome,
) -> String {
    let mut out = format!(
        "{} ({})\n{}\n\n",
        form.mode.label(),
        form.country.name(),
        form.mode.description()
    );
    match outcome {
        FormOutcome::Blank => out.push_str("—\nEnter valid amounts to see a result.\n"),
        FormOutcome::GrossToNet(breakdown) => out.push_str(&render_breakdown(breakdown)),
        FormOutcome::NetToGross(result) => out.push_str(&render_net_to_gross(result)),
        FormOutcome::RaiseToCost(impact) => out.push_str(&render_raise(impact)),
        FormOutcome::BudgetToRaise(raise) => out.push_str(&render_affordable(raise)),
    }
    out
}

/// Summary of the active rate tables, optionally for a single country.
pub fn render_rates(
    tables: &RateTables,
    country: Option<CountryCode>,
) -> String {
    tables
        .iter()
        .filter(|profile| country.is_none_or(|c| c == profile.country))
        .map(|profile| profile.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn contribution_row(contribution: &ContributionAmount) -> Row {
    Row::monthly(
        format!(
            "{} ({})",
            capitalize(&contribution.name),
            rate_label(contribution.rate)
        ),
        contribution.amount,
    )
}

/// Percentage with an explicit sign, so a pay cut reads `-5.00%`.
fn signed_percent(percent: Decimal) -> String {
    if percent.is_sign_negative() && !percent.is_zero() {
        format_percent(percent)
    } else {
        format!("+{}", format_percent(percent))
    }
}

fn rate_label(rate: Decimal) -> String {
    format_percent(rate * Decimal::ONE_HUNDRED)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use salary_core::CountryProfile;
    use salary_core::calculations::{BudgetPlanner, PayrollCalculator};

    use super::*;
    use crate::form::CalculatorMode;

    fn line(
        marker: &str,
        label: &str,
        monthly: &str,
        annual: &str,
    ) -> String {
        format!("{marker}{label:<32}{monthly:>16}{annual:>16}")
    }

    #[test]
    fn render_table_marks_highlighted_rows() {
        let rows = [
            Row::amount("Gross salary", MonthlyAnnual::from_monthly(dec!(2000))),
            Row::Separator,
            Row::highlighted("Net salary", MonthlyAnnual::from_monthly(dec!(1642))),
        ];

        let text = render_table(&rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], line("  ", "", "Monthly", "Annual"));
        assert_eq!(lines[1], line("  ", "Gross salary", "€2000.00", "€24000.00"));
        assert_eq!(lines[2], "-".repeat(66));
        assert_eq!(lines[3], line("* ", "Net salary", "€1642.00", "€19704.00"));
    }

    #[test]
    fn render_breakdown_lists_every_contribution() {
        let profile = CountryProfile::estonia_2026();
        let breakdown = PayrollCalculator::new(&profile)
            .unwrap()
            .gross_to_net(dec!(2000))
            .unwrap();

        let text = render_breakdown(&breakdown);

        assert!(text.contains(&line(
            "  ",
            "Unemployment insurance (1.60%)",
            "€32.00",
            "€384.00"
        )));
        assert!(text.contains(&line("  ", "Funded pension (2.00%)", "€40.00", "€480.00")));
        assert!(text.contains(&line("  ", "Income tax", "€286.00", "€3432.00")));
        assert!(text.contains(&line("* ", "Net salary", "€1642.00", "€19704.00")));
        assert!(text.contains(&line("  ", "Social tax (33.00%)", "€660.00", "€7920.00")));
        assert!(text.contains(&line("* ", "Employer cost", "€2676.00", "€32112.00")));
    }

    #[test]
    fn render_breakdown_omits_zero_pension() {
        let profile = CountryProfile::latvia_2026();
        let breakdown = PayrollCalculator::new(&profile)
            .unwrap()
            .gross_to_net(dec!(2000))
            .unwrap();

        let text = render_breakdown(&breakdown);

        assert!(!text.contains("Funded pension"));
        assert!(text.contains(&line("* ", "Net salary", "€1473.80", "€17685.60")));
    }

    #[test]
    fn render_raise_reports_budget_impact() {
        let impact = BudgetPlanner::new(dec!(0.338))
            .raise_to_cost(dec!(100000), dec!(5))
            .unwrap();

        let text = render_raise(&impact);

        assert!(text.contains(&line(
            "* ",
            "Total cost increase",
            "€6690.00",
            "€80280.00"
        )));
        assert!(text.contains("New salaries (+5.00%)"));
        assert!(text.contains("Budget impact: 5.00% of current employer cost"));
        assert!(text.contains("Employer contributions: 33.80%"));
    }

    #[test]
    fn render_affordable_states_raise() {
        let raise = BudgetPlanner::new(dec!(0.338))
            .budget_to_raise(dec!(100000), dec!(5000))
            .unwrap();

        let text = render_affordable(&raise);

        assert!(text.starts_with(
            "With €5000.00 additional budget (3.74% of current employer cost) you can afford a 3.74% salary increase."
        ));
        assert!(text.contains(&line(
            "  ",
            "Affordable new salaries",
            "€103736.92",
            "€1244843.05"
        )));
        assert!(text.contains(&line(
            "* ",
            "Affordable increase",
            "€3736.92",
            "€44843.05"
        )));
    }

    #[test]
    fn render_affordable_ends_with_cost_increase_at_limit() {
        let raise = BudgetPlanner::new(dec!(0.338))
            .budget_to_raise(dec!(100000), dec!(5000))
            .unwrap();

        let text = render_affordable(&raise);
        let rows: Vec<&str> = text
            .lines()
            .filter(|l| l.contains('€') && !l.starts_with("With"))
            .collect();

        assert_eq!(rows.len(), 6);
        assert!(rows[0].contains("Current salaries"));
        assert_eq!(
            rows[5],
            line("* ", "Cost increase (at limit)", "€5000.00", "€60000.00")
        );
    }

    #[test]
    fn render_raise_signs_pay_cut() {
        let impact = BudgetPlanner::new(dec!(0.338))
            .raise_to_cost(dec!(2000), dec!(-5))
            .unwrap();

        let text = render_raise(&impact);

        assert!(text.contains("New salaries (-5.00%)"));
        assert!(!text.contains("+-"));
    }

    #[test]
    fn signed_percent_marks_direction() {
        assert_eq!(signed_percent(dec!(5)), "+5.00%");
        assert_eq!(signed_percent(dec!(-2.5)), "-2.50%");
        assert_eq!(signed_percent(Decimal::ZERO), "+0.00%");
    }

    #[test]
    fn render_outcome_blank_shows_dash() {
        let form = CalculatorForm::new(CountryCode::Latvia, CalculatorMode::GrossToNet);

        let text = render_outcome(&form, &FormOutcome::Blank);

        assert!(text.starts_with("Gross € → Net Salary (Latvia)\n"));
        assert!(text.contains("—\n"));
    }

    #[test]
    fn render_rates_filters_country() {
        let tables = RateTables::builtin();

        let all = render_rates(&tables, None);
        let latvia = render_rates(&tables, Some(CountryCode::Latvia));

        assert!(all.contains("Estonia (EE)"));
        assert!(all.contains("Lithuania (LT)"));
        assert!(latvia.contains("Latvia (LV)"));
        assert!(!latvia.contains("Estonia"));
    }

    #[test]
    fn capitalize_handles_empty_and_words() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("social tax"), "Social tax");
    }
}
