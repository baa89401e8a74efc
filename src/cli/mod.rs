//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `scorelens summary`: record count and per-dimension statistics
//! - `scorelens chart KIND`: one chart, as a terminal table or Chart.js JSON
//! - `scorelens detail ID`: one record's scores and history
//! - `scorelens files ...` / `scorelens export`: backend file operations
//! - `scorelens filters ...`: saved filter management
//! - `scorelens config show|init|set|reset`: configuration management

pub mod files;
pub mod filters;
pub mod render;
pub mod scores;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;

use crate::api::ApiClient;
use crate::charts::ChartId;
use crate::config::{self, ScorelensConfig};
use crate::dashboard::{Dashboard, DashboardState, FetchOutcome};
use crate::filter::FilterConditions;
use crate::scores::source::{LocalRecords, RecordSource};

/// Output format for listing commands. Unknown values are rejected by
/// clap when the arguments are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

// ---------------------------------------------------------------------------
// Filter flags
// ---------------------------------------------------------------------------

/// Filter flags shared by the record commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Match records whose feedback or id contains this text
    #[arg(long)]
    pub keyword: Option<String>,
    /// Earliest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// Latest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub min_total: Option<f64>,
    #[arg(long)]
    pub max_total: Option<f64>,
    #[arg(long)]
    pub min_accuracy: Option<f64>,
    #[arg(long)]
    pub min_completeness: Option<f64>,
    #[arg(long)]
    pub min_relevance: Option<f64>,
    #[arg(long)]
    pub min_clarity: Option<f64>,
    /// Start from a saved filter; explicit flags override its fields
    #[arg(long, value_name = "NAME")]
    pub saved: Option<String>,
}

impl FilterArgs {
    /// Overlay the explicit flags onto `base`.
    pub fn apply_to(&self, mut base: FilterConditions) -> FilterConditions {
        if let Some(keyword) = self.keyword.as_ref().filter(|k| !k.trim().is_empty()) {
            base.keyword = Some(keyword.clone());
        }
        base.start_date = self.start_date.or(base.start_date);
        base.end_date = self.end_date.or(base.end_date);
        base.min_total_score = self.min_total.or(base.min_total_score);
        base.max_total_score = self.max_total.or(base.max_total_score);
        base.min_accuracy_score = self.min_accuracy.or(base.min_accuracy_score);
        base.min_completeness_score = self.min_completeness.or(base.min_completeness_score);
        base.min_relevance_score = self.min_relevance.or(base.min_relevance_score);
        base.min_clarity_score = self.min_clarity.or(base.min_clarity_score);
        base
    }

    /// Resolve `--saved` against the backend (if given) and overlay the
    /// explicit flags.
    pub fn resolve(&self, config: &ScorelensConfig) -> Result<FilterConditions> {
        let base = match &self.saved {
            Some(name) => {
                let list = ApiClient::from_config(&config.backend)
                    .list_filters()
                    .context("failed to load saved filters")?;
                list.resolve(name)?.conditions.clone()
            }
            None => FilterConditions::default(),
        };
        let conditions = self.apply_to(base);
        conditions.validate()?;
        Ok(conditions)
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// The record source: a local file when `--input` is given, else the backend.
pub fn open_source(input: Option<&Path>, config: &ScorelensConfig) -> Result<Box<dyn RecordSource>> {
    match input {
        Some(path) => {
            let local = LocalRecords::load(path)
                .with_context(|| format!("failed to load records from {}", path.display()))?;
            Ok(Box::new(local))
        }
        None => Ok(Box::new(ApiClient::from_config(&config.backend))),
    }
}

/// Build a mounted dashboard holding the records for `filter`.
///
/// A failed fetch becomes an error carrying the notice text.
pub fn load_dashboard(
    config: &ScorelensConfig,
    source: &dyn RecordSource,
    filter: FilterConditions,
    chart: ChartId,
) -> Result<Dashboard> {
    let state = DashboardState::new(config.display.lang, config.display.theme, chart);
    let mut dashboard = Dashboard::new(state);
    dashboard.mount();

    match dashboard.fetch_with(source, filter, Instant::now()) {
        FetchOutcome::Applied => Ok(dashboard),
        FetchOutcome::Stale => anyhow::bail!("records request was superseded"),
        FetchOutcome::Failed => {
            let message = dashboard
                .state()
                .notices
                .active()
                .last()
                .map(|n| n.message.clone())
                .unwrap_or_else(|| dashboard.state().context().labels().request_failed.to_string());
            Err(anyhow::anyhow!(message))
                .with_context(|| format!("failed to fetch records from {}", source.describe()))
        }
    }
}

// ---------------------------------------------------------------------------
// scorelens config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective scorelens Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.scorelens/config.toml");
    print_source(project_exists, ".scorelens.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "SCORELENS_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.scorelens/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Right-align a score to `width` and color it by band: red below 60,
/// yellow below 80, green above.
pub(crate) fn colorize_score(value: f64, width: usize) -> colored::ColoredString {
    let text = format!("{value:>width$.2}");
    if value >= 80.0 {
        text.green()
    } else if value >= 60.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
pub(crate) fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("评分详情报告", 4), "评分详…");
    }

    #[derive(Debug, clap::Parser)]
    struct FormatFlag {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    }

    #[test]
    fn test_output_format_parsing() {
        use clap::Parser;

        let parse = |args: &[&str]| FormatFlag::try_parse_from(args).map(|f| f.format);
        assert_eq!(parse(&["scorelens"]).unwrap(), OutputFormat::Table);
        assert_eq!(parse(&["scorelens", "--format", "json"]).unwrap(), OutputFormat::Json);
        assert_eq!(parse(&["scorelens", "--format", "csv"]).unwrap(), OutputFormat::Csv);
        assert!(parse(&["scorelens", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn explicit_flags_override_saved_fields() {
        let saved = FilterConditions {
            min_total_score: Some(50.0),
            keyword: Some("old".to_string()),
            ..Default::default()
        };
        let args = FilterArgs {
            min_total: Some(70.0),
            min_clarity: Some(40.0),
            ..Default::default()
        };
        let merged = args.apply_to(saved);
        assert_eq!(merged.min_total_score, Some(70.0));
        assert_eq!(merged.min_clarity_score, Some(40.0));
        assert_eq!(merged.keyword.as_deref(), Some("old"));
    }

    #[test]
    fn resolve_without_saved_validates() {
        let args = FilterArgs {
            min_total: Some(90.0),
            max_total: Some(10.0),
            ..Default::default()
        };
        assert!(args.resolve(&ScorelensConfig::default()).is_err());
    }

    #[test]
    fn load_dashboard_from_local_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "created_at": "2025-01-01 09:00:00", "accuracy_score": 80,
                "completeness_score": 70, "relevance_score": 90, "clarity_score": 60,
                "total_score": 75}]"#,
        )
        .unwrap();

        let config = ScorelensConfig::default();
        let source = open_source(Some(&path), &config).unwrap();
        let dashboard =
            load_dashboard(&config, source.as_ref(), FilterConditions::default(), ChartId::Radar)
                .unwrap();
        assert_eq!(dashboard.state().records.len(), 1);
    }
}
