use analytics::KpiReport;
use core_types::{Equipment, Series, Topic};
use serde::{Deserialize, Serialize};

/// A line chart with anomaly overlays and its KPI cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPanel {
    pub topic: Topic,
    pub title: String,
    pub unit: String,
    pub series: Series,
    pub report: KpiReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub equipment: Equipment,
    pub label: String,
    pub loss_percent: f64,
}

/// Energy loss across utilities, plus what that loss costs at each tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPanel {
    pub topic: Topic,
    pub title: String,
    pub cells: Vec<HeatmapCell>,
    pub total_loss_kwh: f64,
    pub costs: Vec<CostLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub rate: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Panel {
    Trend(TrendPanel),
    Heatmap(HeatmapPanel),
}

impl Panel {
    pub fn topic(&self) -> Topic {
        match self {
            Panel::Trend(p) => p.topic,
            Panel::Heatmap(p) => p.topic,
        }
    }
}

/// One complete render of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub seed: Option<u64>,
    pub panels: Vec<Panel>,
}

impl DashboardView {
    pub fn panel(&self, topic: Topic) -> Option<&Panel> {
        self.panels.iter().find(|p| p.topic() == topic)
    }
}
