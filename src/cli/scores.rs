//! `scorelens summary`, `scorelens chart` and `scorelens detail`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::aggregate::{self, BUCKET_LABELS};
use crate::charts::ChartId;
use crate::config::ScorelensConfig;
use crate::dashboard::{ScoreDetail, render};
use crate::filter::FilterConditions;

use super::render::render_chart;
use super::{FilterArgs, OutputFormat, colorize_score, csv_field, format_number, load_dashboard, open_source};

// ---------------------------------------------------------------------------
// scorelens summary
// ---------------------------------------------------------------------------

/// Print record count, per-dimension statistics and the score distribution.
pub fn run_summary(
    config: &ScorelensConfig,
    input: Option<&Path>,
    filter: &FilterArgs,
    format: OutputFormat,
) -> Result<()> {
    let conditions = filter.resolve(config)?;
    let source = open_source(input, config)?;
    let dashboard = load_dashboard(config, source.as_ref(), conditions, config.display.default_chart)?;

    let view = render(dashboard.state());
    let distribution = aggregate::aggregate(&dashboard.state().records).distribution;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "count": view.summary.count,
                "dimensions": view.summary.rows,
                "distribution": BUCKET_LABELS
                    .iter()
                    .zip(distribution.counts)
                    .map(|(label, count)| serde_json::json!({ "range": label, "count": count }))
                    .collect::<Vec<_>>(),
                "filter": view.filter,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("dimension,mean,min,max");
            for row in &view.summary.rows {
                println!(
                    "{},{:.2},{:.2},{:.2}",
                    csv_field(&row.label),
                    row.mean,
                    row.min,
                    row.max
                );
            }
        }
        OutputFormat::Table => {
            let labels = view.labels;
            println!("{}", view.summary.title.bold().cyan());
            println!("{}", "=".repeat(60));

            if !view.has_data {
                println!("  {}", labels.no_data.yellow());
                return Ok(());
            }

            println!(
                "  {} {}",
                format!("{}:", labels.count).bold(),
                format_number(view.summary.count as u64)
            );
            if !view.filter.is_empty() {
                let pairs: Vec<String> = view
                    .filter
                    .to_query_pairs()
                    .into_iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                println!("  {} {}", "Filter:".bold(), pairs.join(" ").dimmed());
            }
            println!();
            println!("  {:<16} {:>10} {:>10} {:>10}", "", "mean", "min", "max");
            println!("  {}", "-".repeat(48));
            for row in &view.summary.rows {
                println!(
                    "  {:<16} {} {} {}",
                    row.label,
                    colorize_score(row.mean, 10),
                    colorize_score(row.min, 10),
                    colorize_score(row.max, 10),
                );
            }

            println!();
            if let Some(chart) = view.charts.get(ChartId::Distribution) {
                for line in render_chart(chart) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// scorelens chart
// ---------------------------------------------------------------------------

/// Print one chart as a terminal table, or its Chart.js configuration.
pub fn run_chart(
    config: &ScorelensConfig,
    chart: ChartId,
    input: Option<&Path>,
    filter: &FilterArgs,
    format: OutputFormat,
) -> Result<()> {
    let conditions = filter.resolve(config)?;
    let source = open_source(input, config)?;
    let dashboard = load_dashboard(config, source.as_ref(), conditions, chart)?;

    let view = render(dashboard.state());
    let chart_view = view
        .charts
        .get(chart)
        .with_context(|| format!("chart {chart} was not rendered"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(chart_view)?),
        OutputFormat::Table | OutputFormat::Csv => {
            for line in render_chart(chart_view) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// scorelens detail
// ---------------------------------------------------------------------------

/// Print one record's scores and the rest of the set as its history.
pub fn run_detail(
    config: &ScorelensConfig,
    id: &str,
    input: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let source = open_source(input, config)?;
    let dashboard = load_dashboard(
        config,
        source.as_ref(),
        FilterConditions::default(),
        config.display.default_chart,
    )?;

    let detail = dashboard
        .detail(id)
        .with_context(|| format!("no score record with id '{id}'"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
        _ => print_detail(&detail),
    }

    Ok(())
}

fn print_detail(detail: &ScoreDetail) {
    println!("{} #{}", detail.title.bold().cyan(), detail.id);
    println!("{}", "=".repeat(50));
    println!("  {}", detail.created_at.dimmed());
    println!();

    println!("{}", detail.current_title.bold());
    for line in &detail.current {
        println!("  {:<16} {:>8}", line.label, line.value);
    }
    if let Some(feedback) = &detail.feedback {
        println!("  {}", feedback.italic());
    }
    println!();

    println!("{}", detail.history_title.bold());
    if let Some(empty) = &detail.empty_history {
        println!("  {}", empty.dimmed());
        return;
    }

    for (i, entry) in detail.history.iter().enumerate() {
        let scores: Vec<String> = entry
            .scores
            .iter()
            .map(|s| format!("{} {}", s.label, s.value))
            .collect();
        let line = format!(
            "  {:<12} {:>8}  {}",
            entry.date,
            entry.total,
            scores.join("  ")
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
        if let Some(feedback) = &entry.feedback {
            println!("  {:<12} {}", "", feedback.italic().dimmed());
        }
    }
}
