use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use scorelens::charts::parse_chart;
use scorelens::cli::{self, FilterArgs, OutputFormat};
use scorelens::config::{self, ScorelensConfig};
use scorelens::i18n::parse_lang;
use scorelens::scores::source::LocalRecords;
use scorelens::theme::parse_theme;
use scorelens::{logging, web};

#[derive(Debug, Parser)]
#[command(name = "scorelens")]
#[command(about = "Quality score dashboard for QA datasets")]
struct App {
    /// Display language: zh or en
    #[arg(long, global = true)]
    lang: Option<String>,
    /// Color theme: light or dark
    #[arg(long, global = true)]
    theme: Option<String>,
    /// Backend base URL (overrides config)
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show record count, per-dimension statistics and the score distribution
    Summary {
        /// Read records from a local JSON file instead of the backend
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output format: table (default), json, csv
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Render one chart: radar, scatter, heatmap, trend, distribution
    Chart {
        kind: String,
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output format: table (default) or json (Chart.js configuration)
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show one record's scores and history
    Detail {
        id: String,
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output format: table (default), json
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Manage uploaded source files
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },
    /// Export the processed dataset
    Export {
        /// Export format
        #[arg(long, default_value = "alpaca")]
        format: String,
        /// Leave per-pair metadata out of the export
        #[arg(long)]
        no_metadata: bool,
    },
    /// Manage saved filters
    Filters {
        #[command(subcommand)]
        command: FiltersCommand,
    },
    /// Launch the web dashboard
    Web {
        /// Address to bind (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Serve records from a local JSON file instead of the backend
        #[arg(long)]
        input: Option<PathBuf>,
        /// Do not open a browser
        #[arg(long)]
        no_open: bool,
    },
    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum FilesCommand {
    /// List uploaded files
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Upload a local file
    Upload { path: PathBuf },
    /// Segment an uploaded file into QA pairs
    Process {
        id: String,
        /// Poll progress until the task finishes
        #[arg(long)]
        wait: bool,
    },
    /// Show a processing task's progress
    Progress {
        task_id: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Delete an uploaded file
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum FiltersCommand {
    /// List saved filters
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show one saved filter's conditions
    Show { name: String },
    /// Save the given filter flags under NAME
    Save {
        name: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Delete a saved filter by id
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.scorelens/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value with a dotted key, e.g. `display.lang en`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

/// Apply the global flags over the loaded configuration.
fn apply_flags(app: &App, config: &mut ScorelensConfig) -> Result<()> {
    if let Some(lang) = &app.lang {
        config.display.lang =
            parse_lang(lang).ok_or_else(|| anyhow::anyhow!("unknown language '{lang}' (zh, en)"))?;
    }
    if let Some(theme) = &app.theme {
        config.display.theme = parse_theme(theme)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme}' (light, dark)"))?;
    }
    if let Some(url) = &app.backend {
        config.backend.base_url = url.clone();
    }
    Ok(())
}

fn run(app: App) -> Result<()> {
    let loaded = config::load();
    logging::init(&loaded.config.logging);
    loaded.report();
    let mut config = loaded.config;
    apply_flags(&app, &mut config)?;

    match app.command {
        Commands::Summary {
            input,
            filter,
            format,
        } => cli::scores::run_summary(&config, input.as_deref(), &filter, format),
        Commands::Chart {
            kind,
            input,
            filter,
            format,
        } => {
            let chart = parse_chart(&kind).ok_or_else(|| {
                anyhow::anyhow!("unknown chart '{kind}' (radar, scatter, heatmap, trend, distribution)")
            })?;
            cli::scores::run_chart(&config, chart, input.as_deref(), &filter, format)
        }
        Commands::Detail { id, input, format } => {
            cli::scores::run_detail(&config, &id, input.as_deref(), format)
        }
        Commands::Files { command } => match command {
            FilesCommand::List { format } => cli::files::run_list(&config, format),
            FilesCommand::Upload { path } => cli::files::run_upload(&config, &path),
            FilesCommand::Process { id, wait } => cli::files::run_process(&config, &id, wait),
            FilesCommand::Progress { task_id, format } => {
                cli::files::run_progress(&config, &task_id, format)
            }
            FilesCommand::Delete { id } => cli::files::run_delete(&config, &id),
        },
        Commands::Export {
            format,
            no_metadata,
        } => cli::files::run_export(&config, &format, !no_metadata),
        Commands::Filters { command } => match command {
            FiltersCommand::List { format } => cli::filters::run_list(&config, format),
            FiltersCommand::Show { name } => cli::filters::run_show(&config, &name),
            FiltersCommand::Save { name, filter } => cli::filters::run_save(&config, &name, &filter),
            FiltersCommand::Delete { id } => cli::filters::run_delete(&config, &id),
        },
        Commands::Web {
            addr,
            input,
            no_open,
        } => {
            let addr = addr.unwrap_or_else(|| config.web.addr.clone());
            if no_open {
                config.web.open_browser = false;
            }
            let ctx = match input {
                Some(path) => {
                    let source = LocalRecords::load(&path)?;
                    web::WebContext::with_source(config, Box::new(source))
                }
                None => web::WebContext::remote(config),
            };
            web::serve(&ctx, &addr)
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => cli::run_config_show(),
            ConfigCommand::Init { force } => cli::run_config_init(force),
            ConfigCommand::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommand::Reset => cli::run_config_reset(),
        },
    }
}

fn main() {
    if let Err(e) = run(App::parse()) {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
