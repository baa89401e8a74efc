//! Terminal rendering of chart views.
//!
//! Walks the same [`ChartConfig`] the web page hands to Chart.js and lays it
//! out as a table: category charts by label, scatter by timestamp, matrix
//! charts as a date x dimension grid.

use colored::Colorize;

use crate::charts::{ChartConfig, ChartView, DataPoint};

use super::{colorize_score, truncate};

/// Widest bar drawn for the distribution chart.
const BAR_WIDTH: usize = 40;

/// Render a chart view to a string of terminal lines.
pub fn render_chart(view: &ChartView) -> Vec<String> {
    let mut lines = vec![view.title().bold().cyan().to_string(), "=".repeat(60)];

    match view {
        ChartView::NoData { message, .. } => lines.push(format!("  {}", message.yellow())),
        ChartView::Ready { config, .. } => match config.kind {
            "radar" => lines.extend(by_dataset(config)),
            "scatter" => lines.extend(by_timestamp(config)),
            "matrix" => lines.extend(matrix(config)),
            "bar" => lines.extend(bars(config)),
            _ => lines.extend(by_label(config)),
        },
    }

    lines
}

fn value_of(point: &DataPoint) -> Option<f64> {
    match point {
        DataPoint::Value(v) => Some(*v),
        DataPoint::Timed { y, .. } => Some(*y),
        DataPoint::Cell { v, .. } => Some(*v),
    }
}

fn header(first: &str, columns: impl Iterator<Item = String>) -> String {
    let mut line = format!("  {:<22}", truncate(first, 22));
    for column in columns {
        line.push_str(&format!(" {:>12}", truncate(&column, 12)));
    }
    line
}

fn row(first: &str, values: impl Iterator<Item = Option<f64>>, striped: bool) -> String {
    let mut line = format!("  {:<22}", truncate(first, 22));
    for value in values {
        match value {
            Some(v) => line.push_str(&format!(" {}", colorize_score(v, 12))),
            None => line.push_str(&format!(" {:>12}", "-")),
        }
    }
    if striped { line.dimmed().to_string() } else { line }
}

/// One row per dataset, one column per label (radar).
fn by_dataset(config: &ChartConfig) -> Vec<String> {
    let mut lines = vec![header("", config.data.labels.iter().cloned())];
    for (i, ds) in config.data.datasets.iter().enumerate() {
        lines.push(row(&ds.label, ds.data.iter().map(value_of), i % 2 == 1));
    }
    lines
}

/// One row per label, one column per dataset (line).
fn by_label(config: &ChartConfig) -> Vec<String> {
    let datasets = &config.data.datasets;
    let mut lines = vec![header("", datasets.iter().map(|d| d.label.clone()))];
    for (i, label) in config.data.labels.iter().enumerate() {
        let values = datasets.iter().map(|d| d.data.get(i).and_then(value_of));
        lines.push(row(label, values, i % 2 == 1));
    }
    lines
}

/// One row per point of the first dataset, keyed by its timestamp.
fn by_timestamp(config: &ChartConfig) -> Vec<String> {
    let datasets = &config.data.datasets;
    let mut lines = vec![header("", datasets.iter().map(|d| d.label.clone()))];
    let Some(first) = datasets.first() else {
        return lines;
    };

    for (i, point) in first.data.iter().enumerate() {
        let x = match point {
            DataPoint::Timed { x, .. } => x.replace('T', " "),
            _ => (i + 1).to_string(),
        };
        let values = datasets.iter().map(|d| d.data.get(i).and_then(value_of));
        lines.push(row(&x, values, i % 2 == 1));
    }
    lines
}

fn axis_labels(config: &ChartConfig, axis: &str) -> Vec<String> {
    config.options["scales"][axis]["labels"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Date rows x dimension columns; missing cells print as `-`.
fn matrix(config: &ChartConfig) -> Vec<String> {
    let columns = axis_labels(config, "x");
    let rows = axis_labels(config, "y");

    let mut grid = vec![vec![None; columns.len()]; rows.len()];
    for ds in &config.data.datasets {
        for point in &ds.data {
            if let DataPoint::Cell { x, y, v } = point {
                if let Some(cell) = grid.get_mut(*y).and_then(|r| r.get_mut(*x)) {
                    *cell = Some(*v);
                }
            }
        }
    }

    let mut lines = vec![header("", columns.into_iter())];
    for (i, (date, cells)) in rows.iter().zip(grid).enumerate() {
        lines.push(row(date, cells.into_iter(), i % 2 == 1));
    }
    lines
}

/// Horizontal bars scaled to the largest count.
fn bars(config: &ChartConfig) -> Vec<String> {
    let Some(ds) = config.data.datasets.first() else {
        return Vec::new();
    };
    let counts: Vec<f64> = ds.data.iter().filter_map(value_of).collect();
    let max = counts.iter().copied().fold(0.0_f64, f64::max);

    config
        .data
        .labels
        .iter()
        .zip(&counts)
        .map(|(label, &count)| {
            let width = if max > 0.0 {
                ((count / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "  {:<10} {:>6} {}",
                label,
                count as u64,
                "█".repeat(width).blue()
            )
        })
        .collect()
}
