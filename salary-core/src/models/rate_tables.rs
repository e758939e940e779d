use std::collections::BTreeMap;

use tracing::info;

use crate::models::{CountryCode, CountryProfile, ProfileError};

/// The active rate profile for every supported country.
///
/// Starts from the built-in 2026 profiles. A profile can only be swapped
/// for one that passes [`CountryProfile::validate`], so lookups never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTables {
    profiles: BTreeMap<CountryCode, CountryProfile>,
}

impl RateTables {
    pub fn builtin() -> Self {
        let profiles = CountryCode::ALL
            .into_iter()
            .map(|country| (country, CountryProfile::builtin(country)))
            .collect();
        Self { profiles }
    }

    pub fn get(
        &self,
        country: CountryCode,
    ) -> &CountryProfile {
        // Every country is inserted by `builtin` and never removed.
        &self.profiles[&country]
    }

    /// Replaces the profile for `profile.country`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns the validation error and leaves the tables untouched when the
    /// new profile is invalid.
    pub fn replace(
        &mut self,
        profile: CountryProfile,
    ) -> Result<CountryProfile, ProfileError> {
        profile.validate()?;
        info!(
            country = %profile.country,
            tax_year = profile.tax_year,
            "replacing rate profile"
        );
        let country = profile.country;
        Ok(self
            .profiles
            .insert(country, profile)
            .unwrap_or_else(|| CountryProfile::builtin(country)))
    }

    /// Profiles in country-code order.
    pub fn iter(&self) -> impl Iterator<Item = &CountryProfile> {
        self.profiles.values()
    }
}

impl Default for RateTables {
    fn default() -> Self {
        Self::builtin()
    }
}
