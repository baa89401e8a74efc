//! One builder per chart. Each takes the record set (and the aggregates
//! derived from it) and fills Chart.js structures for a language and theme.

use serde_json::json;

use crate::aggregate::{Aggregates, BUCKET_LABELS};
use crate::scores::{ScoreDimension, ScoreRecord};
use crate::theme::with_alpha;

use super::{ChartConfig, ChartData, ChartId, ChartSet, ChartView, DataPoint, Dataset, Paint, RenderContext};

/// Build every chart for a record set from its precomputed aggregates.
pub fn build_chart_set(records: &[ScoreRecord], aggregates: &Aggregates, ctx: RenderContext) -> ChartSet {
    let mut set = ChartSet::default();
    for id in ChartId::ALL {
        set.insert(id, build_chart(id, records, aggregates, ctx));
    }
    set
}

/// Build one chart, or its "no data" view when there are no records.
pub fn build_chart(
    id: ChartId,
    records: &[ScoreRecord],
    aggregates: &Aggregates,
    ctx: RenderContext,
) -> ChartView {
    let labels = ctx.labels();
    let title = id.title(labels).to_string();

    if records.is_empty() || aggregates.is_empty() {
        return ChartView::NoData {
            title,
            message: labels.no_data.to_string(),
        };
    }

    let config = match id {
        ChartId::Radar => radar(records, ctx),
        ChartId::Scatter => scatter(records, ctx),
        ChartId::Heatmap => heatmap(aggregates, ctx),
        ChartId::Trend => trend(aggregates, ctx),
        ChartId::Distribution => distribution(aggregates, ctx),
    };

    ChartView::Ready { title, config }
}

fn dimension_labels(ctx: RenderContext) -> Vec<String> {
    ScoreDimension::ALL
        .iter()
        .map(|&d| ctx.labels().dimension(d).to_string())
        .collect()
}

fn legend(ctx: RenderContext) -> serde_json::Value {
    json!({ "labels": { "color": ctx.palette().text } })
}

/// Axis with a title, themed grid and ticks.
fn axis(ctx: RenderContext, title: &str) -> serde_json::Value {
    let palette = ctx.palette();
    json!({
        "title": { "display": true, "text": title, "color": palette.text },
        "grid": { "color": palette.grid },
        "ticks": { "color": palette.text },
    })
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

/// One polygon per record over the five dimensions.
fn radar(records: &[ScoreRecord], ctx: RenderContext) -> ChartConfig {
    let palette = ctx.palette();
    let labels = ctx.labels();

    let datasets = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let color = palette.chart_color(i);
            let mut ds = Dataset::new(
                format!("{} {}", labels.total, i + 1),
                ScoreDimension::ALL
                    .iter()
                    .map(|&d| DataPoint::Value(d.value(record)))
                    .collect(),
            );
            ds.background_color = Some(Paint::Solid(format!("{color}40")));
            ds.border_color = Some(color.to_string());
            ds.border_width = Some(2);
            ds
        })
        .collect();

    ChartConfig {
        kind: "radar",
        data: ChartData {
            labels: dimension_labels(ctx),
            datasets,
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "r": {
                    "beginAtZero": true,
                    "max": 100,
                    "ticks": { "color": palette.text },
                    "grid": { "color": palette.grid },
                    "pointLabels": { "color": palette.text },
                }
            },
            "plugins": { "legend": legend(ctx) },
        }),
    }
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// Five time series of `{x: timestamp, y: score}` points.
fn scatter(records: &[ScoreRecord], ctx: RenderContext) -> ChartConfig {
    let palette = ctx.palette();
    let labels = ctx.labels();

    let stamps: Vec<String> = records
        .iter()
        .map(|r| {
            r.timestamp()
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_else(|| r.created_at.clone())
        })
        .collect();

    let datasets = ScoreDimension::ALL
        .iter()
        .map(|&dimension| {
            let mut ds = Dataset::new(
                labels.dimension(dimension),
                records
                    .iter()
                    .zip(&stamps)
                    .map(|(r, x)| DataPoint::Timed {
                        x: x.clone(),
                        y: dimension.value(r),
                    })
                    .collect(),
            );
            ds.background_color = Some(Paint::Solid(palette.chart_color(dimension.index()).to_string()));
            ds
        })
        .collect();

    let mut x_axis = axis(ctx, labels.date);
    x_axis["type"] = json!("time");
    x_axis["time"] = json!({ "unit": "day" });

    let mut y_axis = axis(ctx, labels.score);
    y_axis["beginAtZero"] = json!(true);
    y_axis["max"] = json!(100);

    ChartConfig {
        kind: "scatter",
        data: ChartData {
            labels: Vec::new(),
            datasets,
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": { "x": x_axis, "y": y_axis },
            "plugins": { "legend": legend(ctx) },
        }),
    }
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Matrix chart: one dataset per dimension, cell opacity = score / 100.
fn heatmap(aggregates: &Aggregates, ctx: RenderContext) -> ChartConfig {
    let palette = ctx.palette();
    let labels = ctx.labels();
    let heatmap = &aggregates.heatmap;

    let datasets = ScoreDimension::ALL
        .iter()
        .map(|&dimension| {
            let color = palette.chart_color(dimension.index());
            let cells: Vec<_> = heatmap.cells_for(dimension).collect();

            let mut ds = Dataset::new(
                labels.dimension(dimension),
                cells
                    .iter()
                    .map(|c| DataPoint::Cell {
                        x: dimension.index(),
                        y: c.date_index,
                        v: c.value,
                    })
                    .collect(),
            );
            ds.background_color = Some(Paint::PerPoint(
                cells.iter().map(|c| with_alpha(color, c.value / 100.0)).collect(),
            ));
            ds.border_color = Some(color.to_string());
            ds.border_width = Some(1);
            ds
        })
        .collect();

    let mut x_axis = axis(ctx, labels.score);
    x_axis["type"] = json!("category");
    x_axis["labels"] = json!(dimension_labels(ctx));

    let mut y_axis = axis(ctx, labels.date);
    y_axis["type"] = json!("category");
    y_axis["labels"] = json!(heatmap.dates);

    ChartConfig {
        kind: "matrix",
        data: ChartData {
            labels: Vec::new(),
            datasets,
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": { "x": x_axis, "y": y_axis },
            "plugins": { "legend": { "display": false } },
        }),
    }
}

// ---------------------------------------------------------------------------
// Trend and distribution
// ---------------------------------------------------------------------------

/// Series order on the trend chart: total first, then the sub-scores.
const TREND_ORDER: [ScoreDimension; 5] = [
    ScoreDimension::Total,
    ScoreDimension::Accuracy,
    ScoreDimension::Completeness,
    ScoreDimension::Relevance,
    ScoreDimension::Clarity,
];

fn stats_options(ctx: RenderContext) -> serde_json::Value {
    let palette = ctx.palette();
    let plain_axis = json!({
        "grid": { "color": palette.grid },
        "ticks": { "color": palette.text },
    });
    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "plugins": {
            "legend": { "position": "top", "labels": { "color": palette.text } }
        },
        "scales": { "x": plain_axis, "y": plain_axis },
    })
}

fn trend(aggregates: &Aggregates, ctx: RenderContext) -> ChartConfig {
    let palette = ctx.palette();
    let labels = ctx.labels();

    let datasets = TREND_ORDER
        .iter()
        .enumerate()
        .map(|(i, &dimension)| {
            let mut ds = Dataset::new(
                labels.dimension(dimension),
                aggregates
                    .trend
                    .get(dimension)
                    .points
                    .iter()
                    .map(|p| DataPoint::Value(p.value))
                    .collect(),
            );
            ds.border_color = Some(palette.stats_colors[i].to_string());
            ds.tension = Some(0.1);
            ds
        })
        .collect();

    ChartConfig {
        kind: "line",
        data: ChartData {
            labels: aggregates.trend.labels(),
            datasets,
        },
        options: stats_options(ctx),
    }
}

fn distribution(aggregates: &Aggregates, ctx: RenderContext) -> ChartConfig {
    let palette = ctx.palette();

    let mut ds = Dataset::new(
        ctx.labels().total,
        aggregates
            .distribution
            .counts
            .iter()
            .map(|&c| DataPoint::Value(c as f64))
            .collect(),
    );
    ds.background_color = Some(Paint::Solid(palette.stats_colors[0].to_string()));

    ChartConfig {
        kind: "bar",
        data: ChartData {
            labels: BUCKET_LABELS.iter().map(|s| (*s).to_string()).collect(),
            datasets: vec![ds],
        },
        options: stats_options(ctx),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::i18n::Lang;
    use crate::scores::tests::record;
    use crate::theme::Theme;

    fn en() -> RenderContext {
        RenderContext::new(Lang::En, Theme::Light)
    }

    fn ready(view: &ChartView) -> &ChartConfig {
        match view {
            ChartView::Ready { config, .. } => config,
            ChartView::NoData { .. } => panic!("expected a ready chart"),
        }
    }

    #[test]
    fn empty_records_render_no_data_for_every_chart() {
        let set = build_chart_set(&[], &aggregate::aggregate(&[]), en());
        assert_eq!(set.len(), 5);
        for (_, view) in set.iter() {
            match view {
                ChartView::NoData { message, .. } => assert_eq!(message, "No Data"),
                ChartView::Ready { .. } => panic!("empty input must not render a chart"),
            }
        }
    }

    #[test]
    fn radar_has_one_dataset_per_record() {
        let records = vec![
            record("1", "2025-01-15 10:00:00", 50.0),
            record("2", "2025-01-16 10:00:00", 70.0),
        ];
        let set = build_chart_set(&records, &aggregate::aggregate(&records), en());
        let config = ready(set.get(ChartId::Radar).unwrap());

        assert_eq!(config.kind, "radar");
        assert_eq!(config.data.labels.len(), 5);
        assert_eq!(config.data.datasets.len(), 2);
        assert_eq!(config.data.datasets[1].label, "Total 2");
        assert_eq!(
            config.data.datasets[0].background_color,
            Some(Paint::Solid("#4a90e240".to_string()))
        );
    }

    #[test]
    fn scatter_points_use_iso_timestamps() {
        let records = vec![record("1", "2025-01-15 10:30:00", 50.0)];
        let set = build_chart_set(&records, &aggregate::aggregate(&records), en());
        let config = ready(set.get(ChartId::Scatter).unwrap());

        assert_eq!(config.data.datasets.len(), 5);
        assert_eq!(
            config.data.datasets[0].data[0],
            DataPoint::Timed {
                x: "2025-01-15T10:30:00".to_string(),
                y: 50.0
            }
        );
    }

    #[test]
    fn heatmap_cells_carry_per_point_alpha() {
        let records = vec![
            record("1", "2025-01-15 10:00:00", 100.0),
            record("2", "2025-01-15 12:00:00", 0.0),
        ];
        let set = build_chart_set(&records, &aggregate::aggregate(&records), en());
        let config = ready(set.get(ChartId::Heatmap).unwrap());

        assert_eq!(config.kind, "matrix");
        assert_eq!(config.options["scales"]["y"]["labels"], json!(["2025-01-15"]));
        let accuracy = &config.data.datasets[0];
        assert_eq!(accuracy.data, vec![DataPoint::Cell { x: 0, y: 0, v: 100.0 }]);
        assert_eq!(
            accuracy.background_color,
            Some(Paint::PerPoint(vec!["#4a90e2ff".to_string()]))
        );
    }

    #[test]
    fn trend_puts_total_first() {
        let records = vec![record("1", "2025-01-15 10:00:00", 50.0)];
        let set = build_chart_set(&records, &aggregate::aggregate(&records), en());
        let config = ready(set.get(ChartId::Trend).unwrap());

        assert_eq!(config.kind, "line");
        assert_eq!(config.data.labels, ["2025-01-15"]);
        let order: Vec<_> = config.data.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(order, ["Total", "Accuracy", "Completeness", "Relevance", "Clarity"]);
        assert_eq!(config.data.datasets[0].tension, Some(0.1));
    }

    #[test]
    fn distribution_uses_bucket_labels() {
        let records = vec![
            record("1", "2025-01-15", 10.0),
            record("2", "2025-01-15", 100.0),
        ];
        let set = build_chart_set(&records, &aggregate::aggregate(&records), en());
        let config = ready(set.get(ChartId::Distribution).unwrap());

        assert_eq!(config.data.labels, BUCKET_LABELS);
        let counts: Vec<f64> = config.data.datasets[0]
            .data
            .iter()
            .map(|p| match p {
                DataPoint::Value(v) => *v,
                other => panic!("unexpected point {other:?}"),
            })
            .collect();
        assert_eq!(counts, [1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn charts_use_the_aggregates_passed_in() {
        let records = vec![record("1", "2025-01-15", 10.0)];
        let wider = vec![
            record("1", "2025-01-15", 10.0),
            record("2", "2025-01-16", 50.0),
            record("3", "2025-01-17", 90.0),
        ];
        let set = build_chart_set(&records, &aggregate::aggregate(&wider), en());

        let config = ready(set.get(ChartId::Distribution).unwrap());
        assert_eq!(config.data.datasets[0].data.len(), 5);
        let trend = ready(set.get(ChartId::Trend).unwrap());
        assert_eq!(trend.data.labels, ["2025-01-15", "2025-01-16", "2025-01-17"]);
    }

    #[test]
    fn titles_follow_language() {
        let ctx = RenderContext::new(Lang::Zh, Theme::Dark);
        let set = build_chart_set(&[], &aggregate::aggregate(&[]), ctx);
        assert_eq!(set.get(ChartId::Heatmap).unwrap().title(), "热力图");
    }
}
