//! `savor` command-line entry point.
//!
//! # Responsibility
//! - Load spreadsheet export files into the life-log SQLite database.
//! - Print the declared table layout for quick inspection.

use clap::{Parser, Subcommand};
use log::info;
use savor_core::db::open_db;
use savor_core::{
    core_version, default_log_level, init_logging, IngestService, LogKind, SqliteLogRepository,
};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "savor", about = "Life-log ingestion into SQLite")]
struct Cli {
    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, global = true, env = "SAVOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true, env = "SAVOR_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load one export file into a log table.
    Ingest {
        /// project|engagement|moment
        #[arg(long)]
        kind: LogKind,
        /// JSON export: record list, one page, or a list of pages.
        #[arg(long)]
        input: PathBuf,
        /// SQLite database file; created and migrated when missing.
        #[arg(long, env = "SAVOR_DB")]
        db: PathBuf,
    },
    /// Print every log table with its columns.
    Schema,
    /// Print the core version.
    Version,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("savor: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Ingest { kind, input, db } => {
            start_logging(cli.log_level.as_deref(), cli.log_dir)?;
            let json = std::fs::read_to_string(&input)
                .map_err(|err| format!("cannot read `{}`: {err}", input.display()))?;
            let conn = open_db(&db)?;
            let service = IngestService::new(SqliteLogRepository::new(&conn));
            let report = service.ingest_export(kind, &json)?;
            info!(
                "event=cli_ingest module=cli status=ok batch_id={} table={} rows={}",
                report.batch_id,
                kind.table_name(),
                report.rows_loaded
            );
            println!(
                "loaded {} row(s) into {} (batch {})",
                report.rows_loaded,
                kind.table_name(),
                report.batch_id
            );
            if !report.skipped_columns.is_empty() {
                println!("skipped columns: {}", report.skipped_columns.join(", "));
            }
        }
        Command::Schema => {
            for kind in LogKind::ALL {
                let table = kind.table();
                println!("{}", table.name);
                for column in table.columns {
                    let key = if column.primary_key { " PRIMARY KEY" } else { "" };
                    println!("  {} {}{key}", column.name, column.ty.sql_type());
                }
            }
        }
        Command::Version => println!("savor_core version={}", core_version()),
    }
    Ok(())
}

fn start_logging(level: Option<&str>, log_dir: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let level = level.unwrap_or(default_log_level());
    let log_dir = match log_dir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => std::env::current_dir()?.join(dir),
        None => std::env::temp_dir().join("savor-logs"),
    };
    init_logging(level, &log_dir)?;
    Ok(())
}
