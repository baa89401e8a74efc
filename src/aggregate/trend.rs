//! Per-dimension time series for the trend and scatter charts.

use serde::Serialize;

use crate::scores::{ScoreDimension, ScoreRecord};

/// A single `(date_label, value)` point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
}

/// The series for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSeries {
    pub dimension: ScoreDimension,
    pub points: Vec<TrendPoint>,
}

impl DimensionSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Five series, one per dimension in canonical order, each with exactly one
/// point per input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    series: Vec<DimensionSeries>,
}

impl TrendSeries {
    /// Series for a dimension.
    pub fn get(&self, dimension: ScoreDimension) -> &DimensionSeries {
        &self.series[dimension.index()]
    }

    /// All series in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionSeries> {
        self.series.iter()
    }

    /// X-axis labels (identical across dimensions).
    pub fn labels(&self) -> Vec<String> {
        self.series
            .first()
            .map(|s| s.points.iter().map(|p| p.date.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of points per series.
    pub fn len(&self) -> usize {
        self.series.first().map_or(0, |s| s.points.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the trend series. Input order is kept as-is (assumed
/// chronological, never re-sorted).
pub fn build_trend(records: &[ScoreRecord]) -> TrendSeries {
    let series = ScoreDimension::ALL
        .iter()
        .map(|&dimension| DimensionSeries {
            dimension,
            points: records
                .iter()
                .map(|r| TrendPoint {
                    date: r.calendar_date().to_string(),
                    value: dimension.value(r),
                })
                .collect(),
        })
        .collect();

    TrendSeries { series }
}
