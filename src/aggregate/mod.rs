//! Aggregation engine: score records to chart-ready shapes.
//!
//! All functions here are pure and total: any record slice, including an
//! empty one, produces a value. Emptiness is reported through `is_empty()`
//! so callers can show a "no data" state instead of a degenerate chart.
//!
//! - **Trend**: per-dimension `(date, value)` series in input order
//! - **Distribution**: 5 fixed buckets of width 20 over `total_score`
//! - **Heatmap**: sorted distinct dates x dimensions, first record per date
//! - **Summary**: count / mean / min / max per dimension

pub mod distribution;
pub mod heatmap;
pub mod summary;
pub mod trend;

use serde::Serialize;

use crate::scores::ScoreRecord;

pub use distribution::{BUCKET_COUNT, BUCKET_LABELS, Distribution, bucket_index};
pub use heatmap::{Heatmap, HeatmapCell};
pub use summary::{DimensionStats, Summary};
pub use trend::{DimensionSeries, TrendPoint, TrendSeries};

/// Every aggregate derived from one record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub trend: TrendSeries,
    pub distribution: Distribution,
    pub heatmap: Heatmap,
    pub summary: Summary,
}

impl Aggregates {
    /// True when the source record set was empty.
    pub fn is_empty(&self) -> bool {
        self.summary.count == 0
    }
}

/// Compute every aggregate for one record set.
pub fn aggregate(records: &[ScoreRecord]) -> Aggregates {
    Aggregates {
        trend: trend::build_trend(records),
        distribution: distribution::build_distribution(records),
        heatmap: heatmap::build_heatmap(records),
        summary: summary::build_summary(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::tests::record;

    #[test]
    fn empty_input_is_no_data_everywhere() {
        let agg = aggregate(&[]);
        assert!(agg.is_empty());
        assert!(agg.trend.is_empty());
        assert!(agg.distribution.is_empty());
        assert_eq!(agg.distribution.counts, [0; BUCKET_COUNT]);
        assert!(agg.heatmap.is_empty());
        assert!(agg.heatmap.dates.is_empty());
    }

    #[test]
    fn aggregate_matches_individual_builders() {
        let records = vec![
            record("1", "2025-01-15 10:00:00", 40.0),
            record("2", "2025-01-16 10:00:00", 90.0),
        ];
        let agg = aggregate(&records);
        assert!(!agg.is_empty());
        assert_eq!(agg.trend, trend::build_trend(&records));
        assert_eq!(agg.distribution.counts, [0, 0, 1, 0, 1]);
        assert_eq!(agg.heatmap.dates, ["2025-01-15", "2025-01-16"]);
    }
}
