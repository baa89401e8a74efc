//! Fixed 5-bucket histogram over `total_score`.

use serde::Serialize;

use crate::scores::ScoreRecord;

/// Number of histogram buckets.
pub const BUCKET_COUNT: usize = 5;

/// Width of each bucket in score points.
pub const BUCKET_WIDTH: f64 = 20.0;

/// Display labels, one per bucket.
pub const BUCKET_LABELS: [&str; BUCKET_COUNT] = ["0-20", "21-40", "41-60", "61-80", "81-100"];

/// Bucket index for a score: `floor(score / 20)` clamped to `[0, 4]`.
///
/// Exactly 100 lands in the last bucket. Float-to-int `as` casts saturate,
/// so negatives and NaN map to 0 and +inf to the last bucket.
pub fn bucket_index(score: f64) -> usize {
    ((score / BUCKET_WIDTH).floor() as usize).min(BUCKET_COUNT - 1)
}

/// Histogram counts. The counts always sum to the number of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub counts: [usize; BUCKET_COUNT],
}

impl Distribution {
    /// Total number of counted scores.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Share of bucket `index` in percent, 0.0 when empty.
    pub fn pct(&self, index: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.counts[index] as f64 / total as f64) * 100.0
        }
    }
}

pub fn build_distribution(records: &[ScoreRecord]) -> Distribution {
    let mut dist = Distribution::default();
    for record in records {
        dist.counts[bucket_index(record.total_score)] += 1;
    }
    dist
}
