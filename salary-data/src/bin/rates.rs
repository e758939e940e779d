use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use salary_core::{CountryCode, RateTables};
use salary_data::load_overrides;

/// Validate rate overrides and print the resulting rate tables.
///
/// Profiles are applied first, then bands, so a band file can adjust a
/// profile loaded from TOML.
///
/// The bands CSV file should have the following columns:
/// - country: The country code (EE, LV, LT)
/// - min_income: Monthly taxable income where the band starts
/// - max_income: Where the band ends (empty for the top band)
/// - rate: The marginal tax rate as a decimal (e.g., 0.22)
#[derive(Parser, Debug)]
#[command(name = "salary-rates")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file with [[profile]] tables replacing whole country profiles
    #[arg(short, long)]
    profiles: Option<PathBuf>,

    /// CSV file with income tax bands
    #[arg(short, long)]
    bands: Option<PathBuf>,

    /// Only print this country (EE, LV or LT)
    #[arg(short, long)]
    country: Option<CountryCode>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut tables = RateTables::builtin();

    if let Some(path) = &args.profiles {
        println!("Loading profiles from: {}", path.display());
    }
    if let Some(path) = &args.bands {
        println!("Loading tax bands from: {}", path.display());
    }
    let applied = load_overrides(&mut tables, args.profiles.as_deref(), args.bands.as_deref())
        .context("Failed to load rate overrides")?;
    if args.profiles.is_some() {
        println!("Applied {} profiles.", applied.profiles);
    }
    if args.bands.is_some() {
        println!("Applied {} tax bands.", applied.bands);
    }

    for profile in tables.iter() {
        if args.country.is_none_or(|c| c == profile.country) {
            println!();
            print!("{profile}");
        }
    }

    Ok(())
}
