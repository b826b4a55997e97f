use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A piece of plant equipment that appears on the energy loss heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Compressor,
    Boiler,
    RollingMill,
    CoolingTower,
    Furnace,
}

impl Equipment {
    pub const ALL: [Equipment; 5] = [
        Equipment::Compressor,
        Equipment::Boiler,
        Equipment::RollingMill,
        Equipment::CoolingTower,
        Equipment::Furnace,
    ];

    /// The label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Equipment::Compressor => "Compressor",
            Equipment::Boiler => "Boiler",
            Equipment::RollingMill => "Rolling Mill",
            Equipment::CoolingTower => "Cooling Tower",
            Equipment::Furnace => "Furnace",
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Equipment {
    type Err = CoreError;

    /// Accepts either the snake_case key or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "compressor" => Ok(Equipment::Compressor),
            "boiler" => Ok(Equipment::Boiler),
            "rolling_mill" => Ok(Equipment::RollingMill),
            "cooling_tower" => Ok(Equipment::CoolingTower),
            "furnace" => Ok(Equipment::Furnace),
            _ => Err(CoreError::InvalidInput("equipment".to_string(), s.to_string())),
        }
    }
}

/// One dashboard panel. Each topic owns a fixed artifact file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FlueGasRatio,
    CompressorEfficiency,
    EnergyLoss,
}

impl Topic {
    pub const ALL: [Topic; 3] = [
        Topic::FlueGasRatio,
        Topic::CompressorEfficiency,
        Topic::EnergyLoss,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Topic::FlueGasRatio => "Flue Gas Ratio Trend with Anomalies",
            Topic::CompressorEfficiency => "Compressor Efficiency Trend",
            Topic::EnergyLoss => "Energy Loss Across Utilities (%)",
        }
    }

    /// The file name (without extension) the panel is exported under.
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            Topic::FlueGasRatio => "predictive_analytics_flue_gas",
            Topic::CompressorEfficiency => "compressor_efficiency_trend",
            Topic::EnergyLoss => "energy_loss_heatmap",
        }
    }

    /// Stable position of the topic, used to derive per-panel seeds.
    pub fn ordinal(&self) -> u64 {
        match self {
            Topic::FlueGasRatio => 0,
            Topic::CompressorEfficiency => 1,
            Topic::EnergyLoss => 2,
        }
    }
}

impl FromStr for Topic {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "flue_gas_ratio" | "flue_gas" => Ok(Topic::FlueGasRatio),
            "compressor_efficiency" | "compressor" => Ok(Topic::CompressorEfficiency),
            "energy_loss" => Ok(Topic::EnergyLoss),
            _ => Err(CoreError::InvalidInput("topic".to_string(), s.to_string())),
        }
    }
}

/// How a panel picks the samples it flags as anomalies.
///
/// Both modes are configured explicitly: `fixed` lists indices into the
/// generated series, `random` samples `count` distinct indices with the
/// panel's generator seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnomalyMode {
    Fixed { indices: Vec<usize> },
    Random { count: usize },
}
