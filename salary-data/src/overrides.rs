//! Override files applied on top of the built-in rate tables.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use salary_core::RateTables;
use thiserror::Error;
use tracing::debug;

use crate::{ProfileLoader, ProfileLoaderError, TaxBandLoader, TaxBandLoaderError};

/// Errors that can occur when loading override files.
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid profiles in {}: {source}", path.display())]
    Profiles {
        path: PathBuf,
        #[source]
        source: ProfileLoaderError,
    },

    #[error("invalid tax bands in {}: {source}", path.display())]
    Bands {
        path: PathBuf,
        #[source]
        source: TaxBandLoaderError,
    },
}

/// Counts of what [`load_overrides`] applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedOverrides {
    pub profiles: usize,
    pub bands: usize,
}

/// Applies a profile file, then a band file, to `tables`.
///
/// Profiles go first so a band file can adjust a profile loaded from TOML.
/// On error `tables` is unchanged.
pub fn load_overrides(
    tables: &mut RateTables,
    profiles: Option<&Path>,
    bands: Option<&Path>,
) -> Result<AppliedOverrides, OverrideError> {
    let mut staged = tables.clone();
    let mut applied = AppliedOverrides::default();

    if let Some(path) = profiles {
        debug!(path = %path.display(), "loading rate profiles");
        let source = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        let profiles_error = |source| OverrideError::Profiles {
            path: path.to_path_buf(),
            source,
        };
        let parsed = ProfileLoader::parse(&source).map_err(profiles_error)?;
        applied.profiles = ProfileLoader::apply(&mut staged, parsed).map_err(profiles_error)?;
    }

    if let Some(path) = bands {
        debug!(path = %path.display(), "loading tax bands");
        let file = File::open(path).map_err(|source| io_error(path, source))?;
        let bands_error = |source| OverrideError::Bands {
            path: path.to_path_buf(),
            source,
        };
        let records = TaxBandLoader::parse(file).map_err(bands_error)?;
        applied.bands = TaxBandLoader::apply(&mut staged, &records).map_err(bands_error)?;
    }

    *tables = staged;
    Ok(applied)
}

fn io_error(
    path: &Path,
    source: io::Error,
) -> OverrideError {
    OverrideError::Io {
        path: path.to_path_buf(),
        source,
    }
}
