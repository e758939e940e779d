//! Loaders that override the built-in rate tables.
//!
//! - [`TaxBandLoader`] replaces income tax bands from a CSV file.
//! - [`ProfileLoader`] replaces whole country profiles from a TOML file.
//! - [`load_overrides`] applies both kinds of file from disk.

mod band_loader;
mod overrides;
mod profile_loader;

pub use band_loader::{TaxBandLoader, TaxBandLoaderError, TaxBandRecord};
pub use overrides::{AppliedOverrides, OverrideError, load_overrides};
pub use profile_loader::{ProfileLoader, ProfileLoaderError};
