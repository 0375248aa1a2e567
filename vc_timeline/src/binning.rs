//! Fixed-width submission density bins over the planned contest window.

use serde::{Deserialize, Serialize};

use crate::model::{is_plannable, millis, Submission, Timestamp};

const MINUTE_MS: f64 = 60_000.0;

/// Bin width in minutes for a planned duration.
pub fn bin_width_minutes(planned_minutes: f64) -> u32 {
    if planned_minutes <= 120.0 {
        8
    } else if planned_minutes <= 180.0 {
        12
    } else {
        15
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BinLayout {
    pub planned_minutes: f64,
    pub width_minutes: u32,
    pub count: usize,
}

impl BinLayout {
    /// `None` for a non-positive, non-finite or oversized planned duration.
    pub fn for_duration(planned_minutes: f64) -> Option<Self> {
        if !is_plannable(planned_minutes) {
            return None;
        }
        let width_minutes = bin_width_minutes(planned_minutes);
        let count = (planned_minutes / width_minutes as f64).ceil() as usize;
        Some(Self {
            planned_minutes,
            width_minutes,
            count,
        })
    }

    pub fn width_ms(&self) -> f64 {
        self.width_minutes as f64 * MINUTE_MS
    }

    /// `[start, end)` of bin `index` in minutes; the last bin stops at planned end.
    pub fn span_minutes(&self, index: usize) -> (f64, f64) {
        let width = self.width_minutes as f64;
        let start = index as f64 * width;
        (start, (start + width).min(self.planned_minutes))
    }

    fn index_of(&self, offset_ms: f64) -> usize {
        let raw = (offset_ms / self.width_ms()).floor();
        (raw.max(0.0) as usize).min(self.count.saturating_sub(1))
    }
}

/// Count submissions per bin; anything outside the planned window is dropped.
pub fn bin_counts(submissions: &[Submission], start: Timestamp, planned_minutes: f64) -> Vec<u32> {
    let Some(layout) = BinLayout::for_duration(planned_minutes) else {
        return Vec::new();
    };
    let start_ms = millis(&start);
    let planned_ms = planned_minutes * MINUTE_MS;
    let mut counts = vec![0u32; layout.count];
    for submission in submissions {
        let offset = millis(&submission.time) - start_ms;
        if offset < 0.0 || offset > planned_ms {
            continue;
        }
        counts[layout.index_of(offset)] += 1;
    }
    counts
}
