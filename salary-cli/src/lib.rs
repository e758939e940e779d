pub mod app;
pub mod config;
pub mod csv_loader;
pub mod form;
pub mod logging;
pub mod report;
pub mod utils;

pub use app::{Overrides, Settings, load_rate_tables};
pub use config::{AppConfig, ConfigError};
pub use form::{CalculatorForm, CalculatorMode, FormOutcome};
