use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::CoreError;

/// A single timestamped reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// An ordered sequence of samples with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Builds a series from arbitrary samples, rejecting any timestamp that
    /// does not move forward.
    pub fn new(samples: Vec<Sample>) -> Result<Self, CoreError> {
        if let Some(pos) = samples
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CoreError::NonIncreasingTimestamp(pos + 1));
        }
        Ok(Self { samples })
    }

    /// Builds a uniformly spaced series starting at `start`.
    ///
    /// The interval must be positive; with a non-positive interval the
    /// timestamps would not increase and construction fails.
    pub fn from_values<I>(start: NaiveDateTime, interval: Duration, values: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = f64>,
    {
        if interval <= Duration::zero() {
            return Err(CoreError::InvalidInput(
                "interval".to_string(),
                format!("{interval} is not positive"),
            ));
        }

        let mut samples = Vec::new();
        let mut timestamp = start;
        for value in values {
            samples.push(Sample { timestamp, value });
            timestamp = timestamp
                .checked_add_signed(interval)
                .ok_or_else(|| CoreError::InvalidInput("interval".to_string(), "timestamp overflow".to_string()))?;
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    /// Keeps the samples matching `keep`, returning the filtered series along
    /// with the original index of every retained sample.
    pub fn retain_indexed<F>(&self, mut keep: F) -> (Series, Vec<usize>)
    where
        F: FnMut(&Sample) -> bool,
    {
        let (origins, samples): (Vec<usize>, Vec<Sample>) = self
            .samples
            .iter()
            .enumerate()
            .filter(|(_, s)| keep(s))
            .map(|(i, s)| (i, *s))
            .unzip();
        // A subsequence of a strictly increasing series is still strictly increasing.
        (Series { samples }, origins)
    }
}

/// Distinct indices into a series, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct AnomalySet {
    indices: Vec<usize>,
}

impl AnomalySet {
    /// Validates that every index is below `len` and appears only once.
    pub fn try_new<I>(indices: I, len: usize) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut seen = BTreeSet::new();
        for index in indices {
            if index >= len {
                return Err(CoreError::IndexOutOfRange { index, len });
            }
            if !seen.insert(index) {
                return Err(CoreError::DuplicateIndex(index));
            }
        }
        Ok(Self {
            indices: seen.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

impl TryFrom<Vec<Sample>> for Series {
    type Error = CoreError;

    fn try_from(samples: Vec<Sample>) -> Result<Self, Self::Error> {
        Series::new(samples)
    }
}

impl From<Series> for Vec<Sample> {
    fn from(series: Series) -> Self {
        series.samples
    }
}

/// A deserialized set has no series to check its bounds against; only
/// uniqueness is enforced here, and the indices come back sorted.
impl TryFrom<Vec<usize>> for AnomalySet {
    type Error = CoreError;

    fn try_from(indices: Vec<usize>) -> Result<Self, Self::Error> {
        AnomalySet::try_new(indices, usize::MAX)
    }
}

impl From<AnomalySet> for Vec<usize> {
    fn from(set: AnomalySet) -> Self {
        set.indices
    }
}

/// The three headline statistics of a series measured against its reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiResult {
    pub mean: f64,
    pub deviation_from_reference: f64,
    pub residual_std_dev: f64,
}
