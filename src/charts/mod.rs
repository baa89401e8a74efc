//! Chart adapters: aggregates to Chart.js-shaped configurations.
//!
//! The structures here serialize directly into the `{type, data, options}`
//! object Chart.js expects, so the embedded dashboard page hands them to
//! `new Chart(ctx, config)` untouched. The terminal renderer walks the same
//! structures.

pub mod adapters;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::i18n::{Labels, Lang};
use crate::theme::{Palette, Theme};

pub use adapters::{build_chart, build_chart_set};

// ---------------------------------------------------------------------------
// Chart identifiers
// ---------------------------------------------------------------------------

/// Identifies one of the dashboard's charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartId {
    #[default]
    Radar,
    Scatter,
    Heatmap,
    Trend,
    Distribution,
}

impl ChartId {
    pub const ALL: [ChartId; 5] = [
        Self::Radar,
        Self::Scatter,
        Self::Heatmap,
        Self::Trend,
        Self::Distribution,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Radar => "radar",
            Self::Scatter => "scatter",
            Self::Heatmap => "heatmap",
            Self::Trend => "trend",
            Self::Distribution => "distribution",
        }
    }

    /// Translated tab title.
    pub fn title(self, labels: &Labels) -> &'static str {
        match self {
            Self::Radar => labels.radar_chart,
            Self::Scatter => labels.scatter_chart,
            Self::Heatmap => labels.heatmap_chart,
            Self::Trend => labels.trend_chart,
            Self::Distribution => labels.distribution_chart,
        }
    }
}

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parse a chart name.
pub fn parse_chart(val: &str) -> Option<ChartId> {
    match val.trim().to_ascii_lowercase().as_str() {
        "radar" => Some(ChartId::Radar),
        "scatter" => Some(ChartId::Scatter),
        "heatmap" | "matrix" => Some(ChartId::Heatmap),
        "trend" | "line" => Some(ChartId::Trend),
        "distribution" | "histogram" | "bar" => Some(ChartId::Distribution),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Chart.js structures
// ---------------------------------------------------------------------------

/// A complete chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    /// Chart.js chart type (`radar`, `scatter`, `matrix`, `line`, `bar`).
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Paint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: None,
            border_color: None,
            border_width: None,
            tension: None,
        }
    }
}

/// A single color, or one color per data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    Solid(String),
    PerPoint(Vec<String>),
}

/// Chart.js data point shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataPoint {
    /// Category charts (radar, line, bar).
    Value(f64),
    /// Time scatter point.
    Timed { x: String, y: f64 },
    /// Matrix cell: dimension index, date index, value.
    Cell { x: usize, y: usize, v: f64 },
}

// ---------------------------------------------------------------------------
// Chart views and the chart set
// ---------------------------------------------------------------------------

/// What a chart slot shows: a configured chart, or the "no data" state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartView {
    Ready { title: String, config: ChartConfig },
    NoData { title: String, message: String },
}

impl ChartView {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Ready { title, .. } | Self::NoData { title, .. } => title,
        }
    }
}

/// The owned collection of chart views, keyed by chart.
///
/// Replaces a long-lived mutable chart map: a set is built whole by
/// [`build_chart_set`] and dropped whole when its dashboard unmounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSet {
    charts: BTreeMap<ChartId, ChartView>,
}

impl ChartSet {
    pub fn insert(&mut self, id: ChartId, view: ChartView) -> Option<ChartView> {
        self.charts.insert(id, view)
    }

    pub fn get(&self, id: ChartId) -> Option<&ChartView> {
        self.charts.get(&id)
    }

    pub fn remove(&mut self, id: ChartId) -> Option<ChartView> {
        self.charts.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChartId, &ChartView)> {
        self.charts.iter().map(|(id, view)| (*id, view))
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }
}

// ---------------------------------------------------------------------------
// Render context
// ---------------------------------------------------------------------------

/// Language and theme a chart is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub lang: Lang,
    pub theme: Theme,
}

impl RenderContext {
    pub fn new(lang: Lang, theme: Theme) -> Self {
        Self { lang, theme }
    }

    pub fn labels(&self) -> &'static Labels {
        self.lang.labels()
    }

    pub fn palette(&self) -> &'static Palette {
        self.theme.palette()
    }
}
