use chrono::NaiveDate;
use core_types::{AnomalyMode, Equipment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every section has defaults that reproduce the stock utility dashboard, so
/// an empty or missing `config.toml` is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub flue_gas: TrendPanelConfig,
    pub compressor: TrendPanelConfig,
    pub energy_loss: EnergyLossConfig,
}

/// Settings shared by every panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct General {
    /// Base seed for every render. `None` makes each render different.
    pub seed: Option<u64>,
    /// Timestamp of the first generated sample (midnight of this date).
    pub start_date: NaiveDate,
    /// Where `export` writes chart artifacts.
    pub output_dir: PathBuf,
    /// When set, logs are also written to a daily rolling file here.
    pub log_dir: Option<PathBuf>,
}

/// Parameters for one synthetic trend panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPanelConfig {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
    /// Spacing between samples, e.g. "1d" or "15m".
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// The standard or rated value the series is compared against.
    pub reference: f64,
    pub unit: String,
    pub anomalies: AnomalyMode,
}

/// A single cell of the energy loss heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityLoss {
    pub equipment: Equipment,
    pub loss_percent: f64,
}

/// Parameters for the energy loss heatmap and its cost figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyLossConfig {
    pub utilities: Vec<UtilityLoss>,
    /// Total energy lost over the reporting window, in kWh.
    pub total_loss_kwh: f64,
    /// Currency per kWh. Costs are reported at every rate.
    pub tariff_rates: Vec<f64>,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with the stock dashboard values.

impl Default for General {
    fn default() -> Self {
        Self {
            seed: Some(0),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            output_dir: PathBuf::from("artifacts"),
            log_dir: None,
        }
    }
}

impl TrendPanelConfig {
    pub fn flue_gas() -> Self {
        Self {
            mean: 8.0,
            std_dev: 0.5,
            count: 30,
            interval: Duration::from_secs(24 * 60 * 60),
            reference: 8.0,
            unit: "ratio".to_string(),
            anomalies: AnomalyMode::Fixed {
                indices: vec![5, 12, 20],
            },
        }
    }

    pub fn compressor() -> Self {
        Self {
            mean: 85.0,
            std_dev: 2.0,
            count: 30,
            interval: Duration::from_secs(24 * 60 * 60),
            reference: 85.0,
            unit: "%".to_string(),
            anomalies: AnomalyMode::Random { count: 3 },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::stock()
    }
}

impl Default for EnergyLossConfig {
    fn default() -> Self {
        let utilities = [
            (Equipment::Compressor, 12.0),
            (Equipment::Boiler, 18.0),
            (Equipment::RollingMill, 25.0),
            (Equipment::CoolingTower, 10.0),
            (Equipment::Furnace, 20.0),
        ]
        .into_iter()
        .map(|(equipment, loss_percent)| UtilityLoss {
            equipment,
            loss_percent,
        })
        .collect();

        Self {
            utilities,
            total_loss_kwh: 1000.0,
            tariff_rates: vec![4.2, 6.5, 8.0],
        }
    }
}

impl Config {
    /// The stock dashboard: flue gas with fixed anomalies, compressor
    /// efficiency with random anomalies, five utilities on the heatmap.
    pub fn stock() -> Self {
        Self {
            general: General::default(),
            flue_gas: TrendPanelConfig::flue_gas(),
            compressor: TrendPanelConfig::compressor(),
            energy_loss: EnergyLossConfig::default(),
        }
    }

    /// Checks the invariants the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_trend("flue_gas", &self.flue_gas)?;
        validate_trend("compressor", &self.compressor)?;

        let loss = &self.energy_loss;
        if loss.tariff_rates.is_empty() {
            return Err(ConfigError::ValidationError(
                "energy_loss.tariff_rates must list at least one rate".to_string(),
            ));
        }
        if let Some(rate) = loss.tariff_rates.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "energy_loss.tariff_rates contains invalid rate {rate}"
            )));
        }
        if !loss.total_loss_kwh.is_finite() || loss.total_loss_kwh < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "energy_loss.total_loss_kwh must be a non-negative number, got {}",
                loss.total_loss_kwh
            )));
        }

        let mut seen = HashSet::new();
        for cell in &loss.utilities {
            if !cell.loss_percent.is_finite() || cell.loss_percent < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "loss for {} must be a non-negative percentage, got {}",
                    cell.equipment, cell.loss_percent
                )));
            }
            if !seen.insert(cell.equipment) {
                return Err(ConfigError::ValidationError(format!(
                    "{} is listed more than once in energy_loss.utilities",
                    cell.equipment
                )));
            }
        }

        Ok(())
    }
}

fn validate_trend(name: &str, panel: &TrendPanelConfig) -> Result<(), ConfigError> {
    if panel.count == 0 {
        return Err(ConfigError::ValidationError(format!("{name}.count must be positive")));
    }
    if !panel.std_dev.is_finite() || panel.std_dev < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{name}.std_dev must be a non-negative number, got {}",
            panel.std_dev
        )));
    }
    if !panel.mean.is_finite() || !panel.reference.is_finite() {
        return Err(ConfigError::ValidationError(format!(
            "{name}.mean and {name}.reference must be finite"
        )));
    }
    if panel.interval.is_zero() {
        return Err(ConfigError::ValidationError(format!("{name}.interval must be positive")));
    }
    match &panel.anomalies {
        AnomalyMode::Random { count } if *count > panel.count => {
            Err(ConfigError::ValidationError(format!(
                "{name}.anomalies.count ({count}) exceeds {name}.count ({})",
                panel.count
            )))
        }
        AnomalyMode::Fixed { indices } => match indices.iter().find(|i| **i >= panel.count) {
            Some(i) => Err(ConfigError::ValidationError(format!(
                "{name}.anomalies index {i} is outside a series of {}",
                panel.count
            ))),
            None => Ok(()),
        },
        AnomalyMode::Random { .. } => Ok(()),
    }
}
