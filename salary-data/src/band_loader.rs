use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use salary_core::{CountryCode, ProfileError, RateTables, TaxBand};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading income tax band data.
#[derive(Debug, Error)]
pub enum TaxBandLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("no income tax bands found in file")]
    Empty,

    #[error("bands for {country} are invalid: {source}")]
    InvalidBands {
        country: CountryCode,
        #[source]
        source: ProfileError,
    },
}

impl From<csv::Error> for TaxBandLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBandLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the tax bands CSV file.
///
/// - `country`: The country code (EE, LV, LT)
/// - `min_income`: Monthly taxable income where the band starts
/// - `max_income`: Where the band ends (empty for the open-ended top band)
/// - `rate`: The marginal income tax rate as a decimal (e.g., 0.22)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBandRecord {
    pub country: CountryCode,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for income tax bands from CSV files.
///
/// Every country present in the file has its bands replaced wholesale, so
/// loading the same file twice yields the same tables. Countries absent
/// from the file keep their current bands.
pub struct TaxBandLoader;

impl TaxBandLoader {
    /// Parse tax band records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBandRecord>, TaxBandLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBandRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Apply tax band records to the rate tables.
    ///
    /// For each country in the records, this method will:
    /// 1. Sort that country's bands by `min_income`
    /// 2. Replace the bands of a copy of its current profile
    /// 3. Validate the copy and stage it
    ///
    /// Staged profiles are written to `tables` only once every country
    /// validates, so on error `tables` is unchanged. Returns the number of
    /// bands applied.
    pub fn apply(
        tables: &mut RateTables,
        records: &[TaxBandRecord],
    ) -> Result<usize, TaxBandLoaderError> {
        if records.is_empty() {
            return Err(TaxBandLoaderError::Empty);
        }

        let mut groups: BTreeMap<CountryCode, Vec<&TaxBandRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.country).or_default().push(record);
        }

        let mut staged = tables.clone();
        let mut applied = 0;
        for (country, mut group) in groups {
            group.sort_by(|a, b| a.min_income.cmp(&b.min_income));

            let mut profile = tables.get(country).clone();
            profile.tax_bands = group
                .iter()
                .map(|r| TaxBand::new(r.min_income, r.max_income, r.rate))
                .collect();

            staged
                .replace(profile)
                .map_err(|source| TaxBandLoaderError::InvalidBands { country, source })?;
            info!(%country, bands = group.len(), "loaded income tax bands");
            applied += group.len();
        }

        *tables = staged;
        Ok(applied)
    }
}
