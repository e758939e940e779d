//! TOML settings file for the `baltic-salary` command.
//!
//! ```toml
//! country = "LV"
//! pension_rate = "0"
//! log_level = "debug"
//! log_file = "salary.log"
//! rates_file = "profiles.toml"
//! bands_file = "tax_bands.csv"
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! containing the settings file. Command-line flags take precedence.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use salary_core::CountryCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Country used when a command does not name one.
    pub country: Option<CountryCode>,
    /// Funded pension contribution in percent, e.g. `2` for 2%.
    pub pension_rate: Option<Decimal>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    /// Profile overrides (TOML).
    pub rates_file: Option<PathBuf>,
    /// Tax band overrides (CSV).
    pub bands_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads the settings file at `path`, resolving relative file paths
    /// against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(base))
    }

    fn resolved_against(
        self,
        base: &Path,
    ) -> Self {
        let resolve = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        Self {
            log_file: resolve(self.log_file),
            rates_file: resolve(self.rates_file),
            bands_file: resolve(self.bands_file),
            ..self
        }
    }
}
