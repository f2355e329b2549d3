use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use reelfind::core::batch::{BatchProcessor, BatchProgress, BatchRequest, load_terms};
use reelfind::models::{CategoryFilter, InstanceMode, ScannedFile, SearchQuery, format_size};
use reelfind::{SearchService, Settings, classify};

#[derive(Parser)]
#[command(name = "reelfind", version, about = "Find and classify media files by name")]
struct Cli {
    /// Log every match decision
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a directory tree for one term
    Search {
        term: String,
        #[arg(short, long)]
        location: Option<PathBuf>,
        /// movie, tv, other or all
        #[arg(short, long, value_parser = parse_category)]
        category: Option<CategoryFilter>,
        #[arg(long)]
        exact: bool,
        /// Smart matching even when exact is the configured default
        #[arg(long, conflicts_with = "exact")]
        smart: bool,
    },
    /// Search for every term in a file, one per line
    Batch {
        terms_file: PathBuf,
        #[arg(short, long)]
        location: Option<PathBuf>,
        #[arg(short, long, value_parser = parse_category)]
        category: Option<CategoryFilter>,
        #[arg(long)]
        exact: bool,
        #[arg(long, conflicts_with = "exact")]
        smart: bool,
        /// Keep only the first result per term
        #[arg(long)]
        single: bool,
    },
    /// Classify files by name
    Classify { paths: Vec<PathBuf> },
}

fn parse_category(s: &str) -> Result<CategoryFilter, String> {
    CategoryFilter::parse(s).ok_or_else(|| {
        let known: Vec<_> = CategoryFilter::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category '{s}' ({})", known.join(", "))
    })
}

/// `--exact` and `--smart` win over the configured default.
fn exact_match(exact: bool, smart: bool, default: bool) -> bool {
    if exact {
        true
    } else if smart {
        false
    } else {
        default
    }
}

fn default_location(location: Option<PathBuf>) -> Result<PathBuf> {
    match location {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Could not determine current directory"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize output")?;
    println!("{text}");
    Ok(())
}

fn size_of(path: &Path) -> i64 {
    std::fs::metadata(path)
        .ok()
        .and_then(|m| i64::try_from(m.len()).ok())
        .unwrap_or(ScannedFile::UNKNOWN_SIZE)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the JSON report
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load();

    match cli.command {
        Commands::Search {
            term,
            location,
            category,
            exact,
            smart,
        } => {
            let query = SearchQuery {
                term,
                location: default_location(location)?,
                category_filter: category.unwrap_or(settings.default_search_type),
                exact_match: exact_match(exact, smart, settings.default_exact_match),
            };
            let service = Arc::new(SearchService::new(settings));

            let stopper = service.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stopper.stop();
                }
            });

            let outcome = service.run(query).await?;
            if outcome.was_cancelled() {
                tracing::warn!("Search stopped early, results are partial");
            }
            tracing::info!(
                "Total files found: {} ({} known size)",
                outcome.results.len(),
                format_size(i64::try_from(outcome.total_known_bytes()).unwrap_or(i64::MAX))
            );
            print_json(&outcome)?;
        }
        Commands::Batch {
            terms_file,
            location,
            category,
            exact,
            smart,
            single,
        } => {
            let text = std::fs::read_to_string(&terms_file)
                .with_context(|| format!("Could not read terms file {}", terms_file.display()))?;
            let terms = load_terms(&text);
            if terms.is_empty() {
                bail!("No search terms found in {}", terms_file.display());
            }

            let request = BatchRequest {
                terms,
                location: default_location(location)?,
                category_filter: category.unwrap_or(settings.default_search_type),
                exact_match: exact_match(exact, smart, settings.default_exact_match),
                instance_mode: if single {
                    InstanceMode::Single
                } else {
                    settings.default_instance_mode
                },
            };

            let service = Arc::new(SearchService::new(settings));
            let batch = Arc::new(BatchProcessor::new(service));

            let stopper = batch.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stopper.stop();
                }
            });

            let (tx, mut rx) = mpsc::unbounded_channel::<BatchProgress>();
            tokio::spawn(async move {
                while let Some(p) = rx.recv().await {
                    eprintln!("[{}/{}] {}", p.index, p.total, p.term);
                }
            });

            let report = batch.run(request, Some(tx)).await?;
            tracing::info!(
                "Terms processed: {}, with results: {}, files found: {}",
                report.entries.len(),
                report.terms_with_results(),
                report.total_files_found()
            );
            print_json(&report)?;
        }
        Commands::Classify { paths } => {
            let results: Vec<_> = paths.iter().map(|p| classify(p, size_of(p))).collect();
            for r in &results {
                tracing::info!(
                    "{} -> {} '{}'",
                    r.file.file_name(),
                    r.category().as_str(),
                    r.metadata.title().unwrap_or("-")
                );
            }
            print_json(&results)?;
        }
    }

    Ok(())
}
