//! `scorelens files ...` and `scorelens export`.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::ApiClient;
use crate::api::types::{ExportRequest, FileRecord, ProcessProgress};
use crate::config::ScorelensConfig;

use super::{OutputFormat, csv_field, format_number, truncate};

/// How often `files process --wait` polls for progress.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// List uploaded files.
pub fn run_list(config: &ScorelensConfig, format: OutputFormat) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let files = client.list_files().context("failed to list files")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        OutputFormat::Csv => {
            println!("id,filename,filetype,filesize,upload_time,status");
            for f in &files {
                println!(
                    "{},{},{},{},{},{}",
                    csv_field(&f.id),
                    csv_field(&f.filename),
                    csv_field(f.filetype.as_deref().unwrap_or("")),
                    f.filesize.map(|s| s.to_string()).unwrap_or_default(),
                    csv_field(f.upload_time.as_deref().unwrap_or("")),
                    csv_field(f.status.as_deref().unwrap_or("")),
                );
            }
        }
        OutputFormat::Table => print_table(&files),
    }

    Ok(())
}

fn print_table(files: &[FileRecord]) {
    println!("{}", "Uploaded Files".bold().cyan());
    println!("{}", "=".repeat(90));

    if files.is_empty() {
        println!("  {}", "No files uploaded yet.".yellow());
        return;
    }

    println!(
        "  {:<8} {:<32} {:<8} {:>12} {:<20} {}",
        "ID".bold(),
        "Filename".bold(),
        "Type".bold(),
        "Size".bold(),
        "Uploaded".bold(),
        "Status".bold(),
    );
    println!("  {}", "-".repeat(88));

    for (i, f) in files.iter().enumerate() {
        let size = f
            .filesize
            .map(|s| format!("{} B", format_number(s)))
            .unwrap_or_else(|| "-".to_string());
        let line = format!(
            "  {:<8} {:<32} {:<8} {:>12} {:<20} {}",
            truncate(&f.id, 8),
            truncate(&f.filename, 32),
            f.filetype.as_deref().unwrap_or("-"),
            size,
            f.upload_time.as_deref().unwrap_or("-"),
            f.status.as_deref().unwrap_or("-"),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!();
    println!("  {} {}", "Total:".bold(), format_number(files.len() as u64));
}

/// Upload a local file.
pub fn run_upload(config: &ScorelensConfig, path: &Path) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let file = client
        .upload_file(path)
        .with_context(|| format!("failed to upload {}", path.display()))?;
    println!(
        "{} Uploaded {} (id {})",
        "✓".green().bold(),
        file.filename.bold(),
        file.id
    );
    Ok(())
}

/// Start segmenting an uploaded file; with `wait`, poll until it finishes.
pub fn run_process(config: &ScorelensConfig, file_id: &str, wait: bool) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let result = client
        .process_file(file_id)
        .with_context(|| format!("failed to process file {file_id}"))?;

    match result.segments_count {
        Some(count) => println!(
            "{} Processed file {} into {} segments",
            "✓".green().bold(),
            file_id,
            format_number(count)
        ),
        None => println!("{} Processing started for file {}", "✓".green().bold(), file_id),
    }
    if let Some(message) = &result.message {
        println!("  {}", message.dimmed());
    }

    let Some(task_id) = result.task_id.filter(|_| wait) else {
        return Ok(());
    };

    loop {
        let progress = client.process_progress(&task_id)?;
        print_progress(&task_id, &progress);
        if progress.is_finished() {
            if let Some(error) = progress.error {
                anyhow::bail!("task {task_id} failed: {error}");
            }
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Show one task's progress.
pub fn run_progress(config: &ScorelensConfig, task_id: &str, format: OutputFormat) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let progress = client
        .process_progress(task_id)
        .with_context(|| format!("failed to read progress of task {task_id}"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&progress)?),
        _ => print_progress(task_id, &progress),
    }
    Ok(())
}

fn print_progress(task_id: &str, progress: &ProcessProgress) {
    let status = match progress.status.as_str() {
        "completed" => progress.status.green(),
        "failed" | "error" => progress.status.red(),
        _ => progress.status.yellow(),
    };
    println!(
        "  {} {:<10} {:>6.1}%  {}/{}",
        task_id.dimmed(),
        status,
        progress.progress,
        format_number(progress.current),
        format_number(progress.total),
    );
}

/// Delete an uploaded file.
pub fn run_delete(config: &ScorelensConfig, file_id: &str) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    client
        .delete_file(file_id)
        .with_context(|| format!("failed to delete file {file_id}"))?;
    println!("{} Deleted file {}", "✓".green().bold(), file_id);
    Ok(())
}

/// Export the processed dataset.
pub fn run_export(config: &ScorelensConfig, format: &str, include_metadata: bool) -> Result<()> {
    let client = ApiClient::from_config(&config.backend);
    let request = ExportRequest {
        format: format.to_string(),
        include_metadata,
    };
    let artifact = client.export_dataset(&request).context("export failed")?;

    println!(
        "{} Exported to {}",
        "✓".green().bold(),
        artifact.export_path.bold()
    );
    if let Some(pairs) = artifact.total_qa_pairs {
        println!("  {} {}", "QA pairs:".dimmed(), format_number(pairs));
    }
    Ok(())
}
