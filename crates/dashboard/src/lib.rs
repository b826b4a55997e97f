//! # Plantwatch Dashboard
//!
//! One parameterized pipeline for every panel: generate a series from the
//! panel's configuration, apply the view filter, summarize it with the
//! `MetricEngine` and hand the result to a renderer. The renderer can be the
//! HTTP API, the terminal report or the artifact exporter; none of them
//! recompute anything.

use analytics::MetricEngine;
use chrono::NaiveTime;
use configuration::{Config, TrendPanelConfig};
use core_types::{AnomalyMode, Topic};
use synthetic::{SeriesSpec, SyntheticGenerator};

pub mod error;
pub mod export;
pub mod filter;
pub mod view;

pub use error::DashboardError;
pub use export::export;
pub use filter::ViewFilter;
pub use view::{CostLine, DashboardView, HeatmapCell, HeatmapPanel, Panel, TrendPanel};

pub struct Dashboard {
    config: Config,
    engine: MetricEngine,
}

impl Dashboard {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: MetricEngine::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Renders every panel with the configured seed.
    pub fn render(&self, filter: &ViewFilter) -> Result<DashboardView, DashboardError> {
        self.render_with_seed(self.config.general.seed, filter)
    }

    /// Renders every panel. Each panel derives its own seed from `seed`, so
    /// panels never share random state.
    pub fn render_with_seed(
        &self,
        seed: Option<u64>,
        filter: &ViewFilter,
    ) -> Result<DashboardView, DashboardError> {
        filter.validate()?;
        let panels = Topic::ALL
            .iter()
            .map(|&topic| self.render_panel(topic, seed, filter))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(seed = ?seed, panels = panels.len(), "Rendered dashboard.");
        Ok(DashboardView { seed, panels })
    }

    /// Renders a single panel.
    pub fn render_panel(
        &self,
        topic: Topic,
        seed: Option<u64>,
        filter: &ViewFilter,
    ) -> Result<Panel, DashboardError> {
        filter.validate()?;
        let panel_seed = seed.map(|s| s.wrapping_add(topic.ordinal()));

        match topic {
            Topic::FlueGasRatio => Ok(Panel::Trend(self.trend_panel(
                topic,
                &self.config.flue_gas,
                panel_seed,
                filter,
            )?)),
            Topic::CompressorEfficiency => Ok(Panel::Trend(self.trend_panel(
                topic,
                &self.config.compressor,
                panel_seed,
                filter,
            )?)),
            Topic::EnergyLoss => Ok(Panel::Heatmap(self.heatmap_panel(filter)?)),
        }
    }

    fn trend_panel(
        &self,
        topic: Topic,
        panel: &TrendPanelConfig,
        seed: Option<u64>,
        filter: &ViewFilter,
    ) -> Result<TrendPanel, DashboardError> {
        let interval = chrono::Duration::from_std(panel.interval)
            .map_err(|e| DashboardError::Config(format!("{}: interval {e}", topic.artifact_stem())))?;
        let spec = SeriesSpec {
            mean: panel.mean,
            std_dev: panel.std_dev,
            count: panel.count,
            start: self.config.general.start_date.and_time(NaiveTime::MIN),
            interval,
        };
        let full = SyntheticGenerator::new(seed).generate(&spec)?;

        // Fixed indices name positions in the generated series; check them
        // before filtering shifts positions around.
        if let AnomalyMode::Fixed { indices } = &panel.anomalies {
            self.engine.fixed_anomalies(&full, indices)?;
        }

        let (series, origins) = full.retain_indexed(|s| filter.matches(s));
        let mode = remap_anomalies(&panel.anomalies, &origins);
        let report = self.engine.summarize(&series, panel.reference, &mode, seed)?;

        tracing::debug!(
            topic = topic.artifact_stem(),
            generated = full.len(),
            shown = series.len(),
            "Built trend panel."
        );

        Ok(TrendPanel {
            topic,
            title: topic.title().to_string(),
            unit: panel.unit.clone(),
            series,
            report,
        })
    }

    fn heatmap_panel(&self, filter: &ViewFilter) -> Result<HeatmapPanel, DashboardError> {
        let loss = &self.config.energy_loss;
        let cells = loss
            .utilities
            .iter()
            .filter(|u| filter.includes(u.equipment))
            .map(|u| HeatmapCell {
                equipment: u.equipment,
                label: u.equipment.label().to_string(),
                loss_percent: u.loss_percent,
            })
            .collect();

        let costs = self
            .engine
            .cost_table(loss.total_loss_kwh, &loss.tariff_rates)?
            .into_iter()
            .map(|(rate, cost)| CostLine { rate, cost })
            .collect();

        Ok(HeatmapPanel {
            topic: Topic::EnergyLoss,
            title: Topic::EnergyLoss.title().to_string(),
            cells,
            total_loss_kwh: loss.total_loss_kwh,
            costs,
        })
    }
}

/// Translates the configured anomaly mode onto a filtered series.
///
/// Fixed indices move to their new positions and vanish when their sample was
/// filtered out. A random count is capped at the number of samples left.
fn remap_anomalies(mode: &AnomalyMode, origins: &[usize]) -> AnomalyMode {
    match mode {
        AnomalyMode::Fixed { indices } => AnomalyMode::Fixed {
            indices: indices
                .iter()
                .filter_map(|i| origins.binary_search(i).ok())
                .collect(),
        },
        AnomalyMode::Random { count } => AnomalyMode::Random {
            count: (*count).min(origins.len()),
        },
    }
}
