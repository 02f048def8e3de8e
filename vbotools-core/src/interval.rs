//! GPS sampling interval estimation

use crate::constants::{channel, INTERVAL_SAMPLE_LINES, INTERVAL_SKIP_LINES};
use crate::error::VboError;
use crate::time::logger_time_to_millis;
use crate::types::{field, SectionStore, Separator};
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::debug;

/// Nominal sampling period of the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum GpsDataInterval {
    /// 1 Hz
    Hz1,
    /// 5 Hz
    Hz5,
    /// 10 Hz
    Hz10,
    /// 20 Hz
    Hz20,
}

impl GpsDataInterval {
    /// Candidates in tie-break order
    pub const ALL: [GpsDataInterval; 4] = [
        GpsDataInterval::Hz1,
        GpsDataInterval::Hz5,
        GpsDataInterval::Hz10,
        GpsDataInterval::Hz20,
    ];

    /// Period in milliseconds
    pub const fn millis(&self) -> u32 {
        match self {
            GpsDataInterval::Hz1 => 1000,
            GpsDataInterval::Hz5 => 200,
            GpsDataInterval::Hz10 => 100,
            GpsDataInterval::Hz20 => 50,
        }
    }

    /// Closest canonical interval to a measured mean; ties go to the earlier candidate
    pub fn nearest(mean_ms: i64) -> Self {
        let mut best = GpsDataInterval::Hz1;
        let mut best_diff = (i64::from(best.millis()) - mean_ms).abs();
        for candidate in &Self::ALL[1..] {
            let diff = (i64::from(candidate.millis()) - mean_ms).abs();
            if diff < best_diff {
                best = *candidate;
                best_diff = diff;
            }
        }
        best
    }
}

impl From<GpsDataInterval> for u32 {
    fn from(interval: GpsDataInterval) -> Self {
        interval.millis()
    }
}

impl TryFrom<u32> for GpsDataInterval {
    type Error = String;

    fn try_from(millis: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|i| i.millis() == millis)
            .ok_or_else(|| format!("unsupported GPS data interval {millis} ms"))
    }
}

/// Minimum number of data lines needed for an estimate
pub const MIN_DATA_LINES: usize = INTERVAL_SKIP_LINES + INTERVAL_SAMPLE_LINES;

/// Estimate the logger's sampling interval
///
/// Skips the first data lines (timestamps are unstable right after GPS lock),
/// averages the deltas of the next ten timestamps with integer division and
/// rounds to the nearest canonical rate.
pub fn estimate(store: &SectionStore, separator: Separator) -> Result<GpsDataInterval, VboError> {
    let data = store.data()?;
    if data.len() < MIN_DATA_LINES {
        return Err(VboError::InsufficientSamples {
            required: MIN_DATA_LINES,
            actual: data.len(),
        });
    }

    let time_idx = store.columns()?.require(channel::TIME)?;

    let mut previous: Option<i64> = None;
    let mut sum_of_deltas: i64 = 0;
    for (line, text) in data
        .iter()
        .enumerate()
        .skip(INTERVAL_SKIP_LINES)
        .take(INTERVAL_SAMPLE_LINES)
    {
        let fields = separator.split(text);
        let current = logger_time_to_millis(field(&fields, line, time_idx, channel::TIME)?)? as i64;
        if let Some(prev) = previous {
            sum_of_deltas += current - prev;
        }
        previous = Some(current);
    }

    let mean = sum_of_deltas / (INTERVAL_SAMPLE_LINES as i64 - 1);
    let interval = GpsDataInterval::nearest(mean);

    #[cfg(feature = "logging")]
    debug!(
        "Mean sample delta {} ms, using {} ms interval",
        mean,
        interval.millis()
    );

    Ok(interval)
}
