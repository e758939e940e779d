//! CSV batch payroll input and output.
//!
//! ## Input format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column | Required | Type | Notes |
//! |----------------|----------|---------|-------------------------------------------|
//! | `employee` | yes | string | Free-form name or id, copied to the output |
//! | `country` | yes | string | `EE`, `LV` or `LT` (case-insensitive) |
//! | `mode` | yes | string | `gross` or `net`: what `amount` is |
//! | `amount` | yes | decimal | Monthly amount, e.g. `2000.00` |
//! | `pension_rate` | no | decimal | Percent, e.g. `2`; empty for the default |
//!
//! ```csv
//! employee,country,mode,amount,pension_rate
//! Kadri,EE,gross,2000.00,2
//! Janis,LV,net,1473.80,
//! ```
//!
//! ## Output format
//!
//! One row per input row, in input order:
//! `employee,country,gross,net,income_tax,employee_contributions,pension,employer_cost`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use rust_decimal::Decimal;
use salary_core::calculations::common::rate_from_percent;
use salary_core::calculations::{PayrollCalculator, SalaryBreakdown, SalaryError};
use salary_core::{CountryCode, RateTables};
use serde::{Deserialize, Serialize};
use tracing::info;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    employee: String,
    country: String,
    mode: String,
    amount: Decimal,
    pension_rate: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading, calculating or writing a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, type mismatch, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based (header = row 0).
    #[error("unrecognised country '{value}' on row {row}")]
    InvalidCountry { value: String, row: usize },

    #[error("unrecognised mode '{value}' on row {row} (expected 'gross' or 'net')")]
    InvalidMode { value: String, row: usize },

    /// The amount or pension choice was rejected by the calculator.
    #[error("row {row} ({employee}): {source}")]
    Calculation {
        employee: String,
        row: usize,
        #[source]
        source: SalaryError,
    },

    #[error("CSV write error: {0}")]
    Write(#[source] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the `amount` column of a batch row means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Gross,
    Net,
}

impl BatchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gross" => Some(BatchMode::Gross),
            "net" => Some(BatchMode::Net),
            _ => None,
        }
    }
}

/// A validated batch input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// 1-based row number in the source file.
    pub row: usize,
    pub employee: String,
    pub country: CountryCode,
    pub mode: BatchMode,
    pub amount: Decimal,
    /// Pension contribution in percent; `None` uses the country default.
    pub pension_rate: Option<Decimal>,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub employee: String,
    pub country: CountryCode,
    pub gross: Decimal,
    pub net: Decimal,
    pub income_tax: Decimal,
    pub employee_contributions: Decimal,
    pub pension: Decimal,
    pub employer_cost: Decimal,
}

impl BatchResult {
    fn new(
        employee: String,
        breakdown: &SalaryBreakdown,
    ) -> Self {
        Self {
            employee,
            country: breakdown.country,
            gross: breakdown.gross,
            net: breakdown.net,
            income_tax: breakdown.income_tax,
            employee_contributions: breakdown.employee_contributions_total(),
            pension: breakdown.pension_contribution,
            employer_cost: breakdown.employer_cost,
        }
    }
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Convert a single CSV row into a BatchEntry.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BatchEntry, BatchLoadError> {
    let country =
        CountryCode::parse(&row.country).ok_or_else(|| BatchLoadError::InvalidCountry {
            value: row.country.clone(),
            row: row_number,
        })?;
    let mode = BatchMode::parse(&row.mode).ok_or_else(|| BatchLoadError::InvalidMode {
        value: row.mode.clone(),
        row: row_number,
    })?;

    Ok(BatchEntry {
        row: row_number,
        employee: row.employee,
        country,
        mode,
        amount: row.amount,
        pension_rate: row.pension_rate,
    })
}

/// Parse batch CSV from any reader. Rows are returned in file order.
///
/// # Errors
///
/// * [BatchLoadError::Parse] – if the CSV is structurally invalid or a
///   required field cannot be deserialised.
/// * [BatchLoadError::InvalidCountry] / [BatchLoadError::InvalidMode] –
///   if a row names an unknown country or mode.
pub fn load_entries<R: Read>(reader: R) -> Result<Vec<BatchEntry>, BatchLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(reader);

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            let row_number = idx + 1; // 1-based for user-facing messages
            convert_row(row, row_number)
        })
        .collect()
}

/// Convenience wrapper: open a file from disk and delegate to [load_entries].
pub fn load_from_file(path: &Path) -> Result<Vec<BatchEntry>, BatchLoadError> {
    let file = File::open(path)?;
    load_entries(file)
}

/// Calculates every entry against `tables`, stopping at the first rejected row.
pub fn calculate(
    tables: &RateTables,
    entries: &[BatchEntry],
) -> Result<Vec<BatchResult>, BatchLoadError> {
    let results = entries
        .iter()
        .map(|entry| calculate_entry(tables, entry))
        .collect::<Result<Vec<_>, _>>()?;
    info!(rows = results.len(), "calculated batch");
    Ok(results)
}

fn calculate_entry(
    tables: &RateTables,
    entry: &BatchEntry,
) -> Result<BatchResult, BatchLoadError> {
    let reject = |source: SalaryError| BatchLoadError::Calculation {
        employee: entry.employee.clone(),
        row: entry.row,
        source,
    };

    let mut calculator = PayrollCalculator::new(tables.get(entry.country)).map_err(reject)?;
    if let Some(percent) = entry.pension_rate {
        calculator = calculator
            .with_pension_rate(rate_from_percent(percent))
            .map_err(reject)?;
    }

    let breakdown = match entry.mode {
        BatchMode::Gross => calculator.gross_to_net(entry.amount).map_err(reject)?,
        BatchMode::Net => calculator.net_to_gross(entry.amount).map_err(reject)?.breakdown,
    };
    Ok(BatchResult::new(entry.employee.clone(), &breakdown))
}

/// Writes results as CSV with a header row.
pub fn write_results<W: Write>(
    writer: W,
    results: &[BatchResult],
) -> Result<(), BatchLoadError> {
    let mut writer = csv::Writer::from_writer(writer);
    for result in results {
        writer.serialize(result).map_err(BatchLoadError::Write)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
