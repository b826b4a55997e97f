use crate::error::MetricError;
use crate::report::KpiReport;
use core_types::{AnomalyMode, AnomalySet, KpiResult, Series};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A stateless calculator for deriving KPIs from a sensor series.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricEngine {}

impl MetricEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arithmetic mean over all samples.
    pub fn mean(&self, series: &Series) -> Result<f64, MetricError> {
        check_series(series)?;
        let scale = magnitude(series);
        if scale == 0.0 {
            return Ok(0.0);
        }
        let n = series.len() as f64;
        Ok(series.values().map(|v| v / scale).sum::<f64>() / n * scale)
    }

    /// `mean(series) - reference`.
    pub fn deviation(&self, series: &Series, reference: f64) -> Result<f64, MetricError> {
        let mean = self.mean(series)?;
        check_finite("reference", reference)?;
        finite_result("deviation", mean - reference)
    }

    /// Population standard deviation of the residuals `sample - reference`.
    ///
    /// Subtracting a constant does not change the spread, so the residuals are
    /// never materialized: `sample - reference` can overflow even when both
    /// operands are finite.
    pub fn residual_std_dev(&self, series: &Series, reference: f64) -> Result<f64, MetricError> {
        check_series(series)?;
        check_finite("reference", reference)?;

        let scale = magnitude(series);
        if scale == 0.0 {
            return Ok(0.0);
        }
        let n = series.len() as f64;
        let scaled_mean = series.values().map(|v| v / scale).sum::<f64>() / n;
        let variance = series
            .values()
            .map(|v| {
                let d = v / scale - scaled_mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Ok(variance.sqrt() * scale)
    }

    /// Mean, deviation and residual spread together.
    pub fn kpis(&self, series: &Series, reference: f64) -> Result<KpiResult, MetricError> {
        let mean = self.mean(series)?;
        Ok(KpiResult {
            mean,
            deviation_from_reference: self.deviation(series, reference)?,
            residual_std_dev: self.residual_std_dev(series, reference)?,
        })
    }

    /// Picks `count` distinct indices in `[0, len)` without replacement.
    ///
    /// With a seed the choice is reproducible; without one a fresh
    /// entropy-seeded generator is used for this call only.
    pub fn select_anomalies(
        &self,
        series: &Series,
        count: usize,
        seed: Option<u64>,
    ) -> Result<AnomalySet, MetricError> {
        let available = series.len();
        if count > available {
            return Err(MetricError::InvalidAnomalyCount {
                requested: count,
                available,
            });
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let picked = rand::seq::index::sample(&mut rng, available, count);

        Ok(AnomalySet::try_new(picked.into_iter(), available)?)
    }

    /// The fixed-index mode: flags exactly the given positions.
    pub fn fixed_anomalies(&self, series: &Series, indices: &[usize]) -> Result<AnomalySet, MetricError> {
        Ok(AnomalySet::try_new(indices.iter().copied(), series.len())?)
    }

    /// Translates an energy-loss total into currency at the given tariff.
    pub fn cost_estimate(&self, total_loss: f64, unit_rate: f64) -> Result<f64, MetricError> {
        check_finite("total loss", total_loss)?;
        check_finite("unit rate", unit_rate)?;
        finite_result("cost", total_loss * unit_rate)
    }

    /// Cost of `total_loss` at each tariff, in the order given.
    pub fn cost_table(&self, total_loss: f64, rates: &[f64]) -> Result<Vec<(f64, f64)>, MetricError> {
        rates
            .iter()
            .map(|&rate| Ok((rate, self.cost_estimate(total_loss, rate)?)))
            .collect()
    }

    /// The main entry point for a trend panel.
    ///
    /// # Arguments
    ///
    /// * `series` - The samples to summarize.
    /// * `reference` - The rated or standard value the series is judged against.
    /// * `mode` - How anomalies are chosen.
    /// * `seed` - Seed for the random anomaly mode; ignored in fixed mode.
    pub fn summarize(
        &self,
        series: &Series,
        reference: f64,
        mode: &AnomalyMode,
        seed: Option<u64>,
    ) -> Result<KpiReport, MetricError> {
        let kpis = self.kpis(series, reference)?;

        let anomalies = match mode {
            AnomalyMode::Fixed { indices } => self.fixed_anomalies(series, indices)?,
            AnomalyMode::Random { count } => self.select_anomalies(series, *count, seed)?,
        };

        let (min, max) = series
            .values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        tracing::debug!(
            samples = series.len(),
            mean = kpis.mean,
            deviation = kpis.deviation_from_reference,
            residual_std_dev = kpis.residual_std_dev,
            anomalies = anomalies.len(),
            "Summarized series."
        );

        Ok(KpiReport {
            sample_count: series.len(),
            reference,
            min,
            max,
            kpis,
            anomalies,
        })
    }
}

/// Rejects empty series first, then the first non-finite sample.
fn check_series(series: &Series) -> Result<(), MetricError> {
    if series.is_empty() {
        return Err(MetricError::EmptySeries);
    }
    if let Some((i, v)) = series.values().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(MetricError::NonFiniteInput(format!("sample {i} is {v}")));
    }
    Ok(())
}

/// Largest absolute sample. Sums run over `value / magnitude` so they stay in range.
fn magnitude(series: &Series) -> f64 {
    series.values().fold(0.0, |m, v| m.max(v.abs()))
}

/// Finite operands can still overflow, e.g. `1e308 - -1e308`.
fn finite_result(what: &str, value: f64) -> Result<f64, MetricError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricError::NonFiniteInput(format!("{what} overflows to {value}")))
    }
}

fn check_finite(what: &str, value: f64) -> Result<(), MetricError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MetricError::NonFiniteInput(format!("{what} is {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use core_types::CoreError;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn series(values: &[f64]) -> Series {
        Series::from_values(start(), Duration::minutes(15), values.iter().copied()).unwrap()
    }

    #[test]
    fn flue_gas_example() {
        let engine = MetricEngine::new();
        let s = series(&[8.1, 8.3, 7.9, 8.0]);

        assert!((engine.mean(&s).unwrap() - 8.075).abs() < EPS);
        assert!((engine.deviation(&s, 8.0).unwrap() - 0.075).abs() < EPS);

        // Population variance of the residuals is 0.0875 / 4.
        let sd = engine.residual_std_dev(&s, 8.0).unwrap();
        assert!((sd - 0.021875_f64.sqrt()).abs() < EPS);
        assert!((sd - 0.1436).abs() < 0.005);
    }

    #[test]
    fn cost_example() {
        let engine = MetricEngine::new();
        assert!((engine.cost_estimate(1000.0, 4.2).unwrap() - 4200.0).abs() < EPS);
    }

    #[test]
    fn cost_table_keeps_rate_order() {
        let engine = MetricEngine::new();
        let table = engine.cost_table(1000.0, &[4.2, 6.0]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].0, 4.2);
        assert!((table[1].1 - 6000.0).abs() < EPS);
    }

    #[test]
    fn empty_series_fails_explicitly() {
        let engine = MetricEngine::new();
        let s = Series::default();
        assert_eq!(engine.mean(&s), Err(MetricError::EmptySeries));
        assert_eq!(engine.deviation(&s, 1.0), Err(MetricError::EmptySeries));
        assert_eq!(engine.residual_std_dev(&s, 1.0), Err(MetricError::EmptySeries));
        assert_eq!(
            engine.summarize(&s, 1.0, &AnomalyMode::Random { count: 0 }, Some(1)),
            Err(MetricError::EmptySeries)
        );
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        let engine = MetricEngine::new();
        let s = series(&[1.0, f64::NAN, 2.0]);
        assert!(matches!(engine.mean(&s), Err(MetricError::NonFiniteInput(_))));

        let ok = series(&[1.0, 2.0]);
        assert!(matches!(
            engine.deviation(&ok, f64::INFINITY),
            Err(MetricError::NonFiniteInput(_))
        ));
        assert!(matches!(
            engine.cost_estimate(f64::NAN, 4.2),
            Err(MetricError::NonFiniteInput(_))
        ));
    }

    #[test]
    fn extreme_finite_values_do_not_overflow() {
        let engine = MetricEngine::new();
        let high = series(&[1e308, 1e308]);
        assert_eq!(engine.mean(&high), Ok(1e308));
        assert_eq!(engine.residual_std_dev(&high, -1e308), Ok(0.0));

        let spread = series(&[-1e308, 1e308]);
        assert_eq!(engine.mean(&spread), Ok(0.0));
        assert_eq!(engine.residual_std_dev(&spread, 0.0), Ok(1e308));

        // The true deviation is not representable.
        assert!(matches!(
            engine.deviation(&high, -1e308),
            Err(MetricError::NonFiniteInput(_))
        ));
        assert!(matches!(
            engine.cost_estimate(1e200, 1e200),
            Err(MetricError::NonFiniteInput(_))
        ));
    }

    #[test]
    fn too_many_anomalies_is_an_error() {
        let engine = MetricEngine::new();
        let s = series(&[1.0, 2.0]);
        assert_eq!(
            engine.select_anomalies(&s, 3, Some(0)),
            Err(MetricError::InvalidAnomalyCount {
                requested: 3,
                available: 2
            })
        );
    }

    #[test]
    fn unseeded_selection_still_respects_bounds() {
        let engine = MetricEngine::new();
        let s = series(&[0.0; 10]);
        let set = engine.select_anomalies(&s, 10, None).unwrap();
        assert_eq!(set.indices(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn fixed_mode_uses_literal_indices() {
        let engine = MetricEngine::new();
        let s = series(&[8.0; 30]);
        let report = engine
            .summarize(&s, 8.0, &AnomalyMode::Fixed { indices: vec![5, 12, 20] }, None)
            .unwrap();
        assert_eq!(report.anomalies.indices(), &[5, 12, 20]);
        assert_eq!(report.sample_count, 30);
        assert_eq!(report.kpis.residual_std_dev, 0.0);
    }

    #[test]
    fn fixed_mode_rejects_out_of_range_index() {
        let engine = MetricEngine::new();
        let s = series(&[8.0; 10]);
        assert_eq!(
            engine.fixed_anomalies(&s, &[5, 12]),
            Err(MetricError::InvalidAnomalyIndex(CoreError::IndexOutOfRange {
                index: 12,
                len: 10
            }))
        );
    }

    #[test]
    fn fixed_mode_rejects_duplicate_index() {
        let engine = MetricEngine::new();
        let s = series(&[8.0; 10]);
        assert_eq!(
            engine.summarize(&s, 8.0, &AnomalyMode::Fixed { indices: vec![3, 3] }, None),
            Err(MetricError::InvalidAnomalyIndex(CoreError::DuplicateIndex(3)))
        );
    }

    #[test]
    fn summarize_reports_extremes() {
        let engine = MetricEngine::new();
        let s = series(&[84.0, 87.5, 82.25]);
        let report = engine
            .summarize(&s, 85.0, &AnomalyMode::Random { count: 1 }, Some(7))
            .unwrap();
        assert_eq!(report.min, 82.25);
        assert_eq!(report.max, 87.5);
        assert_eq!(report.anomalies.len(), 1);
    }

    fn finite_values() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-1.0e6..1.0e6f64, 1..200)
    }

    proptest! {
        #[test]
        fn mean_matches_average(values in finite_values()) {
            let engine = MetricEngine::new();
            let expected = values.iter().sum::<f64>() / values.len() as f64;
            let largest = values.iter().fold(1.0f64, |m, v| m.max(v.abs()));
            let got = engine.mean(&series(&values)).unwrap();
            prop_assert!((got - expected).abs() <= 1e-9 * largest);
        }

        #[test]
        fn deviation_is_mean_minus_reference(values in finite_values(), reference in -1.0e6..1.0e6f64) {
            let engine = MetricEngine::new();
            let s = series(&values);
            let mean = engine.mean(&s).unwrap();
            prop_assert_eq!(engine.deviation(&s, reference).unwrap(), mean - reference);
        }

        #[test]
        fn residual_std_dev_is_non_negative(values in finite_values(), reference in -1.0e6..1.0e6f64) {
            let engine = MetricEngine::new();
            prop_assert!(engine.residual_std_dev(&series(&values), reference).unwrap() >= 0.0);
        }

        #[test]
        fn residual_std_dev_vanishes_on_constant_reference(reference in -1.0e6..1.0e6f64, len in 1usize..100) {
            let engine = MetricEngine::new();
            let s = series(&vec![reference; len]);
            prop_assert_eq!(engine.residual_std_dev(&s, reference).unwrap(), 0.0);
        }

        #[test]
        fn seeded_selection_is_reproducible(len in 1usize..300, frac in 0.0..=1.0f64, seed in any::<u64>()) {
            let engine = MetricEngine::new();
            let s = series(&vec![1.0; len]);
            let k = ((len as f64) * frac) as usize;

            let first = engine.select_anomalies(&s, k, Some(seed)).unwrap();
            let second = engine.select_anomalies(&s, k, Some(seed)).unwrap();

            prop_assert_eq!(first.len(), k);
            prop_assert!(first.iter().all(|i| i < len));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn cost_is_linear_in_total(total in -1.0e6..1.0e6f64, rate in 0.0..100.0f64) {
            let engine = MetricEngine::new();
            let single = engine.cost_estimate(total, rate).unwrap();
            let double = engine.cost_estimate(2.0 * total, rate).unwrap();
            prop_assert!((double - 2.0 * single).abs() <= 1e-9 * single.abs().max(1.0));
        }
    }
}
