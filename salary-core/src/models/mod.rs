mod country;
mod country_profile;
mod rate_tables;

pub use country::{CountryCode, UnknownCountryError};
pub use country_profile::{
    BUILTIN_TAX_YEAR, ContributionRate, CountryProfile, Exemption, ProfileError, TaxBand,
};
pub use rate_tables::RateTables;
