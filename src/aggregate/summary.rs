//! Per-dimension summary statistics.

use serde::Serialize;

use crate::scores::{ScoreDimension, ScoreRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionStats {
    pub dimension: ScoreDimension,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Record count plus stats for every dimension. All stats are 0.0 when
/// there are no records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub dimensions: Vec<DimensionStats>,
}

impl Summary {
    pub fn get(&self, dimension: ScoreDimension) -> &DimensionStats {
        &self.dimensions[dimension.index()]
    }
}

pub fn build_summary(records: &[ScoreRecord]) -> Summary {
    let dimensions = ScoreDimension::ALL
        .iter()
        .map(|&dimension| {
            if records.is_empty() {
                return DimensionStats {
                    dimension,
                    mean: 0.0,
                    min: 0.0,
                    max: 0.0,
                };
            }

            let values = records.iter().map(|r| dimension.value(r));
            let sum: f64 = values.clone().sum();
            let min = values.clone().fold(f64::INFINITY, f64::min);
            let max = values.fold(f64::NEG_INFINITY, f64::max);

            DimensionStats {
                dimension,
                mean: sum / records.len() as f64,
                min,
                max,
            }
        })
        .collect();

    Summary {
        count: records.len(),
        dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::tests::record;

    #[test]
    fn computes_mean_min_max() {
        let records = vec![
            record("1", "2025-01-15", 40.0),
            record("2", "2025-01-16", 80.0),
            record("3", "2025-01-17", 60.0),
        ];
        let summary = build_summary(&records);
        let total = summary.get(ScoreDimension::Total);

        assert_eq!(summary.count, 3);
        assert!((total.mean - 60.0).abs() < 1e-9);
        assert_eq!(total.min, 40.0);
        assert_eq!(total.max, 80.0);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = build_summary(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.dimensions.len(), 5);
        assert_eq!(summary.get(ScoreDimension::Accuracy).max, 0.0);
    }
}
