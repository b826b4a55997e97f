use crate::error::ConfigError;
use chrono::NaiveDate;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, EnergyLossConfig, General, TrendPanelConfig, UtilityLoss};

/// Loads the application configuration from a TOML file.
///
/// The file is optional: anything it leaves out falls back to the stock
/// dashboard. Environment variables prefixed with `PLANTWATCH` override the
/// file, using `__` between nested keys (e.g. `PLANTWATCH_GENERAL__SEED=7`).
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // The stock dashboard is the lowest-priority source, so a partial section
    // only replaces the keys it names.
    let stock = config::Config::try_from(&Config::stock())?;
    let builder = config::Config::builder()
        .add_source(stock)
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("PLANTWATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), seed = ?config.general.seed, "Configuration loaded.");
    Ok(config)
}

/// Command-line overrides applied on top of the loaded file.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Base seed for this render.
    #[cfg_attr(feature = "clap", arg(long, conflicts_with = "unseeded"))]
    pub seed: Option<u64>,

    /// Draw fresh random data on every render.
    #[cfg_attr(feature = "clap", arg(long))]
    pub unseeded: bool,

    /// Date of the first sample (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub start_date: Option<NaiveDate>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if self.unseeded {
            config.general.seed = None;
        } else if let Some(seed) = self.seed {
            config.general.seed = Some(seed);
        }
        if let Some(start) = self.start_date {
            config.general.start_date = start;
        }
    }
}
