use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use logsentry::config::{AppConfig, LoggingConfig};
use logsentry::report::Report;

#[derive(Parser)]
#[command(
    name = "logsentry",
    about = "Rule-based anomaly detection for activity logs",
    version,
    long_about = None
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalies in a log file and write the JSON report
    Detect {
        /// Log file to analyse
        log: PathBuf,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Report output path (overrides config)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Also store anomalies in the SQLite database
        #[arg(long)]
        save: bool,

        /// Database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Write a sample log that triggers every detector
    Generate {
        /// Output file path
        #[arg(long, default_value = "sample_log.log")]
        output: PathBuf,
    },

    /// Show per-minute event frequency with spikes marked
    Timeline {
        /// Log file to analyse
        log: PathBuf,

        /// Bar width in characters
        #[arg(long, default_value = "40")]
        width: usize,

        /// Include minutes with no events
        #[arg(long)]
        all: bool,
    },

    /// List anomalies stored in the database
    History {
        /// Database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Maximum number of rows
        #[arg(long, default_value = "20")]
        limit: usize,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let resolved = AppConfig::resolve(cli.config.as_deref())?;
    init_tracing(&resolved.config.logging);
    resolved.log();
    let config = resolved.config;

    match cli.command {
        Commands::Detect {
            log,
            json,
            report,
            save,
            db,
        } => {
            let analysis = logsentry::analyze_file(&log, &config.detection)?;
            let rendered = Report::build(&analysis.anomalies, &config.detection);

            let report_path = report.unwrap_or(config.report.output_path.clone());
            rendered.write(&report_path)?;

            if save {
                let db_path = db.unwrap_or(config.storage.db_path.clone());
                let pool = logsentry::storage::open_pool(&db_path)?;
                logsentry::storage::save_report(&pool, &log.display().to_string(), &rendered)?;
            }

            if json {
                println!("{}", rendered.to_json_pretty()?);
            } else {
                print_report(&log, analysis.events.len(), analysis.skipped, &rendered, &report_path);
            }
        }
        Commands::Generate { output } => {
            let lines = logsentry::generate::write_sample(&output)?;
            println!("Sample log '{}' created with {} entries.", output.display(), lines);
        }
        Commands::Timeline { log, width, all } => {
            let analysis = logsentry::analyze_file(&log, &config.detection)?;
            let timeline =
                logsentry::timeline::Timeline::build(&analysis.events, &analysis.anomalies);
            println!("\nEvent frequency per minute: {}", log.display());
            print!("{}", timeline.render(width, all));
            println!();
        }
        Commands::History { db, limit, json } => {
            let db_path = db.unwrap_or(config.storage.db_path.clone());
            let pool = logsentry::storage::open_pool(&db_path)?;
            let rows = logsentry::storage::list_recent(&pool, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No anomalies stored.");
            } else {
                println!("{:<6} | {:<22} | {:<20} | Description", "ID", "Type", "Source");
                println!("{:-<6}-|-{:-<22}-|-{:-<20}-|-{:-<40}", "", "", "", "");
                for row in rows {
                    println!(
                        "{:<6} | {:<22} | {:<20} | {}",
                        row.id,
                        row.entry.kind,
                        row.source.as_deref().unwrap_or("-"),
                        row.entry.description
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_report(log: &Path, events: usize, skipped: usize, report: &Report, report_path: &Path) {
    println!("\n=== logsentry Anomaly Report ===");
    println!("Log:       {}", log.display());
    println!("Events:    {} ({} skipped)", events, skipped);
    println!("Anomalies: {}", report.len());
    for (kind, count) in report.summary() {
        println!("  {:<22} {}", kind, count);
    }
    if !report.is_empty() {
        println!("\nDetails:");
        for entry in &report.entries {
            println!(" - [{}] {}", entry.kind, entry.description);
        }
    }
    println!("\nReport written to {}", report_path.display());
    println!("================================\n");
}
