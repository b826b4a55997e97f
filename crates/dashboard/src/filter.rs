use chrono::{NaiveDate, Timelike};
use core_types::{Equipment, Sample};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// The widget selections that narrow what a render shows.
///
/// Every bound is inclusive. An empty equipment list selects everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub hour_range: Option<(u32, u32)>,
    pub equipment: Vec<Equipment>,
}

impl ViewFilter {
    pub fn validate(&self) -> Result<(), DashboardError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(DashboardError::InvalidFilter(format!(
                    "start date {from} is after end date {to}"
                )));
            }
        }
        if let Some((start, end)) = self.hour_range {
            if start > 23 || end > 23 {
                return Err(DashboardError::InvalidFilter(format!(
                    "hours must be within 0-23, got {start}-{end}"
                )));
            }
            if start > end {
                return Err(DashboardError::InvalidFilter(format!(
                    "hour range {start}-{end} is reversed"
                )));
            }
        }
        Ok(())
    }

    /// Whether a trend sample survives the date and hour selections.
    pub fn matches(&self, sample: &Sample) -> bool {
        let date = sample.timestamp.date();
        if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
            return false;
        }
        match self.hour_range {
            Some((start, end)) => (start..=end).contains(&sample.timestamp.hour()),
            None => true,
        }
    }

    pub fn includes(&self, equipment: Equipment) -> bool {
        self.equipment.is_empty() || self.equipment.contains(&equipment)
    }
}
