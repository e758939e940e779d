use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use salary_core::{CountryCode, RateTables};
use salary_data::load_overrides;
use tracing::info;

use crate::config::AppConfig;

/// Settings after merging command-line flags over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub country: CountryCode,
    /// Pension percent; `None` keeps each country's default.
    pub pension_rate: Option<Decimal>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub rates_file: Option<PathBuf>,
    pub bands_file: Option<PathBuf>,
}

/// Values given on the command line; each one overrides the config file.
///
/// A pension rate given on the command line goes straight into the
/// [`CalculatorForm`](crate::form::CalculatorForm) as typed text.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub country: Option<CountryCode>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub rates_file: Option<PathBuf>,
    pub bands_file: Option<PathBuf>,
}

impl Settings {
    pub fn merge(
        config: AppConfig,
        overrides: Overrides,
    ) -> Self {
        Self {
            country: overrides.country.or(config.country).unwrap_or_default(),
            pension_rate: config.pension_rate,
            log_level: overrides.log_level.or(config.log_level),
            log_file: overrides.log_file.or(config.log_file),
            rates_file: overrides.rates_file.or(config.rates_file),
            bands_file: overrides.bands_file.or(config.bands_file),
        }
    }
}

/// Builds the active rate tables: built-in profiles, then the profile
/// file, then the band file.
pub fn load_rate_tables(
    profiles: Option<&Path>,
    bands: Option<&Path>,
) -> Result<RateTables> {
    let mut tables = RateTables::builtin();
    load_overrides(&mut tables, profiles, bands).context("Failed to load rate overrides")?;

    for profile in tables.iter() {
        info!(
            country = %profile.country,
            tax_year = profile.tax_year,
            employer_rate = %profile.employer_rate(),
            "rate profile ready"
        );
    }
    Ok(tables)
}
