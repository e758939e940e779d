use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use salary_cli::csv_loader;
use salary_cli::logging;
use salary_cli::report;
use salary_cli::{
    AppConfig, CalculatorForm, CalculatorMode, Overrides, Settings, load_rate_tables,
};
use salary_core::{CountryCode, RateTables};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Baltic salary and employer budget calculator (EE, LV, LT).
///
/// Amounts are monthly euros and may be typed as `2000`, `2 000,50` or
/// `€2000`.
#[derive(Debug, Parser)]
#[command(name = "baltic-salary", version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TOML file with [[profile]] tables replacing whole country profiles.
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// CSV file with income tax bands.
    #[arg(long, global = true)]
    bands: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `salary_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Hide log output on the console.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Net salary and employer cost for a gross salary.
    Net {
        #[arg(short, long)]
        country: Option<CountryCode>,

        /// Monthly gross salary.
        #[arg(short, long, allow_hyphen_values = true)]
        gross: String,

        /// Funded pension contribution in percent.
        #[arg(short, long)]
        pension: Option<String>,
    },

    /// Gross salary needed for a net salary.
    Gross {
        #[arg(short, long)]
        country: Option<CountryCode>,

        /// Desired monthly net salary.
        #[arg(short, long, allow_hyphen_values = true)]
        net: String,

        /// Funded pension contribution in percent.
        #[arg(short, long)]
        pension: Option<String>,
    },

    /// Employer cost impact of a planned raise.
    Raise {
        #[arg(short, long)]
        country: Option<CountryCode>,

        /// Current monthly salaries.
        #[arg(short, long, default_value = "100000", allow_hyphen_values = true)]
        salary: String,

        /// Planned raise in percent.
        #[arg(short, long, default_value = "5", allow_hyphen_values = true)]
        percent: String,
    },

    /// Largest raise an extra monthly budget pays for.
    Budget {
        #[arg(short, long)]
        country: Option<CountryCode>,

        /// Current monthly salaries.
        #[arg(short, long, default_value = "100000", allow_hyphen_values = true)]
        salary: String,

        /// Extra monthly employer budget.
        #[arg(short, long, default_value = "5000", allow_hyphen_values = true)]
        budget: String,
    },

    /// Gross/net for every row of a CSV file.
    Batch {
        /// Input CSV: employee,country,mode,amount,pension_rate
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV; standard output if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the active rate tables.
    Rates {
        #[arg(short, long)]
        country: Option<CountryCode>,
    },
}

impl Command {
    fn country(&self) -> Option<CountryCode> {
        match self {
            Command::Net { country, .. }
            | Command::Gross { country, .. }
            | Command::Raise { country, .. }
            | Command::Budget { country, .. }
            | Command::Rates { country } => *country,
            Command::Batch { .. } => None,
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let settings = Settings::merge(
        config,
        Overrides {
            country: cli.command.country(),
            log_level: cli.log_level.clone(),
            log_file: cli.log_file.clone(),
            rates_file: cli.rates.clone(),
            bands_file: cli.bands.clone(),
        },
    );
    if let Some(level) = &settings.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?settings, "settings resolved");

    let tables = load_rate_tables(settings.rates_file.as_deref(), settings.bands_file.as_deref())?;

    match cli.command {
        Command::Net { gross, pension, .. } => {
            let form = CalculatorForm {
                salary: gross,
                pension_rate: pension_text(pension, &settings),
                ..CalculatorForm::new(settings.country, CalculatorMode::GrossToNet)
            };
            print_form(&form, &tables, cli.json)
        }
        Command::Gross { net, pension, .. } => {
            let form = CalculatorForm {
                salary: net,
                pension_rate: pension_text(pension, &settings),
                ..CalculatorForm::new(settings.country, CalculatorMode::NetToGross)
            };
            print_form(&form, &tables, cli.json)
        }
        Command::Raise {
            salary, percent, ..
        } => {
            let form = CalculatorForm {
                salary,
                raise_percent: percent,
                ..CalculatorForm::new(settings.country, CalculatorMode::RaiseToCost)
            };
            print_form(&form, &tables, cli.json)
        }
        Command::Budget { salary, budget, .. } => {
            let form = CalculatorForm {
                salary,
                budget,
                ..CalculatorForm::new(settings.country, CalculatorMode::BudgetToRaise)
            };
            print_form(&form, &tables, cli.json)
        }
        Command::Batch { input, output } => run_batch(&input, output, &tables, cli.json),
        Command::Rates { country } => {
            if cli.json {
                let profiles: Vec<_> = tables
                    .iter()
                    .filter(|p| country.is_none_or(|c| c == p.country))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&profiles)?);
            } else {
                print!("{}", report::render_rates(&tables, country));
            }
            Ok(())
        }
    }
}

/// The pension given on the command line, else the configured one, else
/// empty for the country default.
fn pension_text(
    pension: Option<String>,
    settings: &Settings,
) -> String {
    pension
        .or_else(|| settings.pension_rate.map(|rate| rate.to_string()))
        .unwrap_or_default()
}

fn print_form(
    form: &CalculatorForm,
    tables: &RateTables,
    json: bool,
) -> Result<()> {
    let outcome = form.compute(tables);
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", report::render_outcome(form, &outcome));
    }
    Ok(())
}

fn run_batch(
    input: &Path,
    output: Option<PathBuf>,
    tables: &RateTables,
    json: bool,
) -> Result<()> {
    let entries = csv_loader::load_from_file(input)
        .with_context(|| format!("Failed to load batch: {}", input.display()))?;
    let results = csv_loader::calculate(tables, &entries)?;

    let mut sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    if json {
        serde_json::to_writer_pretty(&mut sink, &results)?;
        writeln!(sink)?;
    } else {
        csv_loader::write_results(&mut sink, &results)?;
    }
    sink.flush()?;
    Ok(())
}
