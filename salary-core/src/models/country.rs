use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string is not one of the supported country codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown country code '{0}' (expected EE, LV or LT)")]
pub struct UnknownCountryError(pub String);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CountryCode {
    #[default]
    #[serde(rename = "EE")]
    Estonia,
    #[serde(rename = "LV")]
    Latvia,
    #[serde(rename = "LT")]
    Lithuania,
}

impl CountryCode {
    pub const ALL: [CountryCode; 3] = [Self::Estonia, Self::Latvia, Self::Lithuania];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estonia => "EE",
            Self::Latvia => "LV",
            Self::Lithuania => "LT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Estonia => "Estonia",
            Self::Latvia => "Latvia",
            Self::Lithuania => "Lithuania",
        }
    }

    /// Parses a two-letter code, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EE" => Some(Self::Estonia),
            "LV" => Some(Self::Latvia),
            "LT" => Some(Self::Lithuania),
            _ => None,
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryCode {
    type Err = UnknownCountryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCountryError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_codes_in_any_case() {
        assert_eq!(CountryCode::parse("EE"), Some(CountryCode::Estonia));
        assert_eq!(CountryCode::parse(" lv "), Some(CountryCode::Latvia));
        assert_eq!(CountryCode::parse("Lt"), Some(CountryCode::Lithuania));
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(CountryCode::parse("FI"), None);
        assert_eq!(CountryCode::parse(""), None);
    }

    #[test]
    fn from_str_reports_offending_value() {
        let err = "PL".parse::<CountryCode>().unwrap_err();

        assert_eq!(err, UnknownCountryError("PL".to_string()));
        assert_eq!(
            err.to_string(),
            "unknown country code 'PL' (expected EE, LV or LT)"
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for country in CountryCode::ALL {
            assert_eq!(CountryCode::parse(&country.to_string()), Some(country));
        }
    }

    #[test]
    fn default_is_estonia() {
        assert_eq!(CountryCode::default(), CountryCode::Estonia);
        assert_eq!(CountryCode::default().name(), "Estonia");
    }
}
