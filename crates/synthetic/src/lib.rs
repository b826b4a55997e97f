//! Procedural sensor readings for the dashboard.
//!
//! Every `SyntheticGenerator` owns its random state. There is no process-wide
//! seed: two generators built from the same seed produce the same series no
//! matter what else runs in between.

use chrono::{Duration, NaiveDateTime};
use core_types::Series;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

pub mod error;

pub use error::GeneratorError;

/// Shape of one synthetic series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
    pub start: NaiveDateTime,
    pub interval: Duration,
}

pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    /// A seeded generator is reproducible; `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Draws `spec.count` readings from `Normal(spec.mean, spec.std_dev)` at
    /// `start + i * interval`.
    pub fn generate(&mut self, spec: &SeriesSpec) -> Result<Series, GeneratorError> {
        if spec.interval <= Duration::zero() {
            return Err(GeneratorError::InvalidInterval(format!(
                "{} is not positive",
                spec.interval
            )));
        }
        // `Normal::new` only rejects a non-finite spread, not a negative one.
        if !spec.mean.is_finite() || spec.std_dev.is_nan() || spec.std_dev < 0.0 {
            return Err(GeneratorError::InvalidDistribution {
                mean: spec.mean,
                std_dev: spec.std_dev,
            });
        }
        let normal = Normal::new(spec.mean, spec.std_dev).map_err(|_| {
            GeneratorError::InvalidDistribution {
                mean: spec.mean,
                std_dev: spec.std_dev,
            }
        })?;

        let values: Vec<f64> = (&mut self.rng).sample_iter(normal).take(spec.count).collect();

        tracing::trace!(count = spec.count, mean = spec.mean, std_dev = spec.std_dev, "Generated series.");

        Ok(Series::from_values(spec.start, spec.interval, values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn spec(mean: f64, std_dev: f64, count: usize) -> SeriesSpec {
        SeriesSpec {
            mean,
            std_dev,
            count,
            start: NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            interval: Duration::days(1),
        }
    }

    #[test]
    fn same_seed_same_series() {
        let a = SyntheticGenerator::new(Some(0)).generate(&spec(8.0, 0.5, 30)).unwrap();
        let b = SyntheticGenerator::new(Some(0)).generate(&spec(8.0, 0.5, 30)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
    }

    #[test]
    fn different_seeds_differ() {
        let a = SyntheticGenerator::new(Some(1)).generate(&spec(85.0, 2.0, 30)).unwrap();
        let b = SyntheticGenerator::new(Some(2)).generate(&spec(85.0, 2.0, 30)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn zero_spread_is_constant() {
        let s = SyntheticGenerator::new(Some(3)).generate(&spec(85.0, 0.0, 5)).unwrap();
        assert!(s.values().all(|v| v == 85.0));
    }

    #[test]
    fn timestamps_follow_interval() {
        let s = SyntheticGenerator::new(Some(4)).generate(&spec(8.0, 0.5, 3)).unwrap();
        let samples = s.samples();
        assert_eq!(samples[2].timestamp - samples[0].timestamp, Duration::days(2));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut generator = SyntheticGenerator::new(Some(5));
        assert!(matches!(
            generator.generate(&spec(8.0, -1.0, 3)),
            Err(GeneratorError::InvalidDistribution { .. })
        ));
        assert!(matches!(
            generator.generate(&spec(f64::NAN, 1.0, 3)),
            Err(GeneratorError::InvalidDistribution { .. })
        ));

        let mut bad_interval = spec(8.0, 0.5, 3);
        bad_interval.interval = Duration::zero();
        assert!(matches!(
            generator.generate(&bad_interval),
            Err(GeneratorError::InvalidInterval(_))
        ));
    }

    #[test]
    fn negative_or_infinite_spread_is_rejected() {
        let mut generator = SyntheticGenerator::new(Some(7));
        for std_dev in [-0.5, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    generator.generate(&spec(85.0, std_dev, 5)),
                    Err(GeneratorError::InvalidDistribution { .. })
                ),
                "std_dev {std_dev} was accepted"
            );
        }
    }

    #[test]
    fn empty_count_yields_empty_series() {
        let s = SyntheticGenerator::new(Some(6)).generate(&spec(8.0, 0.5, 0)).unwrap();
        assert!(s.is_empty());
    }
}
