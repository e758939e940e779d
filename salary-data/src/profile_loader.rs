//! Full rate profiles from TOML.
//!
//! ```toml
//! [[profile]]
//! country = "EE"
//! tax_year = 2026
//! pension_rates = ["0", "0.02", "0.04", "0.06"]
//! default_pension_rate = "0.02"
//! social_deductible = false
//!
//! [[profile.employee_contributions]]
//! name = "unemployment insurance"
//! rate = "0.016"
//!
//! [[profile.employer_contributions]]
//! name = "social tax"
//! rate = "0.33"
//!
//! [profile.exemption]
//! amount = "700"
//!
//! [[profile.tax_bands]]
//! min_income = "0"
//! rate = "0.22"
//! ```
//!
//! Rates may be written as strings or bare numbers; strings keep exact
//! decimal values.

use std::collections::BTreeSet;

use salary_core::{CountryCode, CountryProfile, ProfileError, RateTables};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ProfileLoaderError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no [[profile]] tables found")]
    Empty,

    #[error("profile for {0} appears more than once")]
    DuplicateCountry(CountryCode),

    #[error("profile for {country} is invalid: {source}")]
    InvalidProfile {
        country: CountryCode,
        #[source]
        source: ProfileError,
    },
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default, rename = "profile")]
    profiles: Vec<CountryProfile>,
}

/// Loader for complete country profiles from TOML documents.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Parse every `[[profile]]` table in `source`.
    ///
    /// Each profile is validated; a country may appear only once.
    pub fn parse(source: &str) -> Result<Vec<CountryProfile>, ProfileLoaderError> {
        let file: ProfileFile = toml::from_str(source)?;
        if file.profiles.is_empty() {
            return Err(ProfileLoaderError::Empty);
        }

        let mut seen = BTreeSet::new();
        for profile in &file.profiles {
            if !seen.insert(profile.country) {
                return Err(ProfileLoaderError::DuplicateCountry(profile.country));
            }
            profile
                .validate()
                .map_err(|source| ProfileLoaderError::InvalidProfile {
                    country: profile.country,
                    source,
                })?;
        }
        Ok(file.profiles)
    }

    /// Swap the parsed profiles into `tables`, returning how many were applied.
    ///
    /// Either every profile is applied or, on error, `tables` is unchanged.
    pub fn apply(
        tables: &mut RateTables,
        profiles: Vec<CountryProfile>,
    ) -> Result<usize, ProfileLoaderError> {
        let count = profiles.len();
        let mut staged = tables.clone();
        for profile in profiles {
            let country = profile.country;
            staged
                .replace(profile)
                .map_err(|source| ProfileLoaderError::InvalidProfile { country, source })?;
        }
        *tables = staged;
        info!(count, "loaded rate profiles");
        Ok(count)
    }
}
