//! Operator CLI for a research records database.
//!
//! # Responsibility
//! - Open a database file and run one read or maintenance command.
//! - Map core errors to `anyhow` at the process boundary.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use research_core::{
    core_version, default_log_level, init_logging, open_db, ping, Actor, BackupService,
    FilterCriteria, Publication, PublicationService, ReportService, SqliteRecordStore,
    ValidationService,
};
use std::fs;
use std::path::PathBuf;

/// Research records registry maintenance tool
#[derive(Parser)]
#[command(name = "research-cli")]
#[command(about = "Inspect and maintain a research records database")]
#[command(version)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "RESEARCH_DB", default_value = "research.db")]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RESEARCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rotating log files; logging is off when unset
    #[arg(long, env = "RESEARCH_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,
    /// Print the system report as JSON
    Stats,
    /// Write a backup of users, publications and projects
    Export { file: PathBuf },
    /// Replace users, publications and projects from a backup file
    Import { file: PathBuf },
    /// List publications
    Publications {
        /// Free-text search over title, authors, journal, DOI and keywords
        #[arg(long)]
        search: Option<String>,
        /// Publication type, e.g. `article` or `book_chapter`
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// List publications and projects awaiting validation
    Pending,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy()).map_err(|err| anyhow!(err))?;
    }

    if let Commands::Ping = cli.command {
        println!("research_core ping={}", ping());
        println!("research_core version={}", core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db).with_context(|| format!("opening {}", cli.db.display()))?;
    let store = SqliteRecordStore::new(&conn);
    let operator = Actor::operator("research-cli");

    match cli.command {
        Commands::Ping => {}
        Commands::Stats => {
            let report = ReportService::new(store).system_report()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Export { file } => {
            let blob = BackupService::new(store).export_backup(&operator)?;
            fs::write(&file, blob.to_json()?)
                .with_context(|| format!("writing {}", file.display()))?;
            println!(
                "exported users={} publications={} projects={} to {}",
                blob.users.len(),
                blob.publications.len(),
                blob.projects.len(),
                file.display()
            );
        }
        Commands::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let summary = BackupService::new(store).import_backup(&operator, &text)?;
            println!(
                "imported users={} publications={} projects={}",
                summary.users, summary.publications, summary.projects
            );
        }
        Commands::Publications { search, kind, year } => {
            let mut criteria = FilterCriteria::new();
            if let Some(search) = search {
                criteria = criteria.search(search);
            }
            if let Some(kind) = kind {
                criteria = criteria.equals("type", kind);
            }
            if let Some(year) = year {
                criteria = criteria.year("year", year);
            }
            let publications = PublicationService::new(store).explore(&criteria)?;
            for publication in &publications {
                print_publication(publication);
            }
            info!(
                "event=cli_list module=cli status=ok collection=publications count={}",
                publications.len()
            );
        }
        Commands::Pending => {
            let queue = ValidationService::new(store).pending()?;
            for publication in &queue.publications {
                print_publication(publication);
            }
            for project in &queue.projects {
                println!(
                    "project\t{}\t{}\t{}\t{}",
                    project.id,
                    project.kind.as_str(),
                    project.owner_name,
                    project.name
                );
            }
            println!("pending={}", queue.len());
        }
    }
    Ok(())
}

fn print_publication(publication: &Publication) {
    println!(
        "publication\t{}\t{}\t{}\t{}\t{}\t{}",
        publication.id,
        publication.kind.as_str(),
        publication.year,
        publication.validation.status(),
        publication.owner_name,
        publication.title
    );
}
