use core_types::{AnomalySet, KpiResult};
use serde::{Deserialize, Serialize};

/// Everything a trend panel shows about one series.
///
/// This struct is the final output of `MetricEngine::summarize` and is handed
/// as-is to whichever layer renders the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub sample_count: usize,
    pub reference: f64,
    pub min: f64,
    pub max: f64,
    #[serde(flatten)]
    pub kpis: KpiResult,
    pub anomalies: AnomalySet,
}

impl KpiReport {
    /// Deviation from the reference as a percentage of the reference.
    /// `None` when the reference is zero.
    pub fn deviation_pct(&self) -> Option<f64> {
        if self.reference == 0.0 {
            return None;
        }
        Some(self.kpis.deviation_from_reference / self.reference * 100.0)
    }
}
