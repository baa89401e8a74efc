//! Date x dimension matrix for the heatmap chart.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::scores::{ScoreDimension, ScoreRecord};

/// One populated heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// Index into [`Heatmap::dates`].
    pub date_index: usize,
    pub dimension: ScoreDimension,
    pub value: f64,
}

/// Y axis = sorted distinct calendar dates, X axis = the five dimensions.
///
/// Cells are stored dimension-major (all accuracy cells, then completeness,
/// ...), which is the order the chart datasets are built in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub dates: Vec<String>,
    pub cells: Vec<HeatmapCell>,
}

impl Heatmap {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Value at `(date_index, dimension)`, if that cell is populated.
    pub fn cell(&self, date_index: usize, dimension: ScoreDimension) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.date_index == date_index && c.dimension == dimension)
            .map(|c| c.value)
    }

    /// Populated cells for one dimension, in date order.
    pub fn cells_for(&self, dimension: ScoreDimension) -> impl Iterator<Item = &HeatmapCell> {
        self.cells.iter().filter(move |c| c.dimension == dimension)
    }
}

/// Build the heatmap.
///
/// Each date row takes its values from the *first* record (input order)
/// whose `created_at` starts with that date. Later records on the same date
/// are ignored, not averaged. Dates with no exact prefix match are omitted.
pub fn build_heatmap(records: &[ScoreRecord]) -> Heatmap {
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.calendar_date())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let firsts: Vec<Option<&ScoreRecord>> = dates
        .iter()
        .map(|date| records.iter().find(|r| r.created_at.starts_with(date.as_str())))
        .collect();

    let mut cells = Vec::with_capacity(dates.len() * ScoreDimension::ALL.len());
    for dimension in ScoreDimension::ALL {
        for (date_index, first) in firsts.iter().enumerate() {
            let Some(record) = first else {
                continue;
            };
            cells.push(HeatmapCell {
                date_index,
                dimension,
                value: dimension.value(record),
            });
        }
    }

    Heatmap { dates, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::tests::record;

    #[test]
    fn dates_are_sorted_and_distinct() {
        let records = vec![
            record("1", "2025-01-16 09:00:00", 10.0),
            record("2", "2025-01-15 09:00:00", 20.0),
            record("3", "2025-01-16 18:00:00", 30.0),
        ];
        let heatmap = build_heatmap(&records);
        assert_eq!(heatmap.dates, ["2025-01-15", "2025-01-16"]);
        assert_eq!(heatmap.cells.len(), 2 * 5);
    }

    #[test]
    fn first_record_on_a_date_wins() {
        let records = vec![
            record("a", "2025-01-15 09:00:00", 40.0),
            record("b", "2025-01-15 17:00:00", 90.0),
        ];
        let heatmap = build_heatmap(&records);
        assert_eq!(heatmap.dates.len(), 1);
        assert_eq!(heatmap.cell(0, ScoreDimension::Total), Some(40.0));
        assert_eq!(heatmap.cell(0, ScoreDimension::Clarity), Some(40.0));
    }

    #[test]
    fn cells_are_dimension_major() {
        let records = vec![
            record("1", "2025-01-15 09:00:00", 10.0),
            record("2", "2025-01-16 09:00:00", 20.0),
        ];
        let heatmap = build_heatmap(&records);
        let first_two: Vec<_> = heatmap.cells.iter().take(2).map(|c| c.dimension).collect();
        assert_eq!(first_two, [ScoreDimension::Accuracy, ScoreDimension::Accuracy]);

        let totals: Vec<_> = heatmap
            .cells_for(ScoreDimension::Total)
            .map(|c| (c.date_index, c.value))
            .collect();
        assert_eq!(totals, [(0, 10.0), (1, 20.0)]);
    }

    #[test]
    fn missing_cell_is_none() {
        let heatmap = build_heatmap(&[record("1", "2025-01-15", 10.0)]);
        assert_eq!(heatmap.cell(3, ScoreDimension::Total), None);
    }
}
