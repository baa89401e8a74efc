//! `scorelens filters list|show|save|delete`.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::ApiClient;
use crate::config::ScorelensConfig;
use crate::filter::{FilterConditions, SavedFilterList};

use super::{FilterArgs, OutputFormat, csv_field, truncate};

fn fetch(client: &ApiClient) -> Result<SavedFilterList> {
    client.list_filters().context("failed to load saved filters")
}

fn describe(conditions: &FilterConditions) -> String {
    if conditions.is_empty() {
        return "(no constraints)".to_string();
    }
    conditions
        .to_query_pairs()
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// List saved filters. Entries the backend returned with unreadable
/// conditions are reported after the listing.
pub fn run_list(config: &ScorelensConfig, format: OutputFormat) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let list = fetch(&client)?;

    match format {
        OutputFormat::Json => {
            let rejected: Vec<String> = list.rejected.iter().map(ToString::to_string).collect();
            let value = serde_json::json!({
                "filters": list.filters,
                "rejected": rejected,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("id,name,conditions");
            for f in &list.filters {
                println!(
                    "{},{},{}",
                    csv_field(&f.id),
                    csv_field(&f.name),
                    csv_field(&f.conditions.to_json()?)
                );
            }
        }
        OutputFormat::Table => {
            let labels = config.display.lang.labels();
            println!("{}", "Saved Filters".bold().cyan());
            println!("{}", "=".repeat(80));

            if list.filters.is_empty() {
                println!("  {}", labels.no_filters.yellow());
            }
            for (i, f) in list.filters.iter().enumerate() {
                let line = format!(
                    "  {:<8} {:<24} {}",
                    truncate(&f.id, 8),
                    truncate(&f.name, 24),
                    describe(&f.conditions)
                );
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }

            if !list.rejected.is_empty() {
                println!();
                for err in &list.rejected {
                    println!("  {} {}", "!".yellow().bold(), err.to_string().yellow());
                }
            }
        }
    }

    Ok(())
}

/// Print one saved filter's conditions as JSON.
pub fn run_show(config: &ScorelensConfig, name: &str) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let list = fetch(&client)?;
    let filter = list.resolve(name)?;

    println!("{} {}", filter.name.bold().cyan(), format!("(id {})", filter.id).dimmed());
    println!("{}", serde_json::to_string_pretty(&filter.conditions)?);
    Ok(())
}

/// Save the given filter flags under `name`.
pub fn run_save(config: &ScorelensConfig, name: &str, args: &FilterArgs) -> Result<()> {
    let conditions = args.resolve(config)?;
    let labels = config.display.lang.labels();

    let client = ApiClient::from_config(&config.backend);
    client
        .save_filter(name, &conditions)
        .with_context(|| labels.save_failed.to_string())?;

    println!("{} {}: {}", "✓".green().bold(), labels.save_success, name.bold());
    println!("  {}", describe(&conditions).dimmed());
    Ok(())
}

/// Delete a saved filter by id.
pub fn run_delete(config: &ScorelensConfig, filter_id: &str) -> Result<()> {
    let labels = config.display.lang.labels();
    let client = ApiClient::from_config(&config.backend);
    client
        .delete_filter(filter_id)
        .with_context(|| labels.delete_failed.to_string())?;

    println!("{} {} ({})", "✓".green().bold(), labels.delete_success, filter_id);
    Ok(())
}
