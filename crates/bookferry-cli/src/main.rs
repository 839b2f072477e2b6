//! Bookferry - Pre-ingest transfer tool for book collections
//!
//! Evaluates each book item directory against a readiness policy, performs
//! the one-time ingest copy for ready items and propagates later changes to
//! the update destinations.

use anyhow::{Context, Result};
use bookferry_config::{Config, ConfigLoader};
use bookferry_transfer::{DirectoryStatistics, TransferEngine};
use bookferry_types::{BookType, TransferSummary};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Bookferry - Pre-ingest transfer tool for book collections
#[derive(Parser)]
#[command(
    name = "bookferry",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pre-ingest transfer tool for book collections",
    long_about = "Bookferry scans per-book item directories, decides which items are ready\n\
                  for ingest into a preservation repository, copies ready items once, and\n\
                  propagates later content and metadata changes to update destinations."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a transfer pass over both source roots
    Transfer,
    /// Show item statistics for the source roots
    Stats,
    /// Show, generate or validate configuration
    Config {
        /// Print the default configuration instead of the loaded one
        #[arg(long)]
        default: bool,
        /// Write the configuration to this file
        #[arg(long)]
        generate: Option<PathBuf>,
        /// Check that this configuration file loads and validates
        #[arg(long)]
        validate: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.quiet, cli.verbose)?;

    info!("Bookferry v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Transfer => transfer_command(config, cli.quiet).await?,
        Commands::Stats => stats_command(config).await?,
        Commands::Config {
            default,
            generate,
            validate,
        } => config_command(config, default, generate, validate)?,
    }

    Ok(())
}

fn init_logging(debug: bool, quiet: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

async fn transfer_command(config: Config, quiet: bool) -> Result<()> {
    info!("Starting transfer run");
    info!("Ebook source: {}", config.ebook_source_dir.display());
    info!("Audio source: {}", config.audio_source_dir.display());

    if !quiet {
        println!(
            "{} Transferring ready books from {} and {}",
            style("→").green().bold(),
            style(config.ebook_source_dir.display()).cyan(),
            style(config.audio_source_dir.display()).cyan()
        );
    }

    let pb = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Processing items...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let engine = TransferEngine::new(config);
    let summary = engine.transfer_ready_books().await?;

    if let Some(pb) = pb {
        pb.finish_with_message("Transfer completed");
    }

    if !quiet {
        print_summary(&summary);
    }

    // per-item failures are logged and counted, not fatal for the run
    info!("Transfer run completed");
    Ok(())
}

async fn stats_command(config: Config) -> Result<()> {
    for (book_type, source, formats) in [
        (BookType::Ebook, &config.ebook_source_dir, &config.ebook_formats),
        (BookType::Audio, &config.audio_source_dir, &config.audio_formats),
    ] {
        println!(
            "{} {} items under {}",
            style("⚙").blue().bold(),
            book_type,
            style(source.display()).cyan()
        );

        let stats = DirectoryStatistics::calculate(
            source,
            formats,
            &config.transfer.metadata_suffixes,
        )
        .await;

        match stats {
            Ok(stats) => print_stats(&stats),
            Err(e) => println!("  {} {}", style("✗").red(), e),
        }
    }
    Ok(())
}

fn config_command(
    config: Config,
    default: bool,
    generate: Option<PathBuf>,
    validate: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = validate {
        ConfigLoader::validate_file(&path)
            .with_context(|| format!("Configuration file {} is invalid", path.display()))?;
        println!(
            "{} {} is a valid configuration",
            style("✓").green(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    let shown = if default { Config::default() } else { config };

    if let Some(path) = generate {
        ConfigLoader::save_to_file(&shown, &path)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        println!(
            "{} Wrote configuration to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

fn print_summary(summary: &TransferSummary) {
    println!();
    println!("{}", style("Transfer Summary:").bold().underlined());
    println!("  Items processed: {}", style(summary.processed).green());
    println!("  Ingested: {}", style(summary.ingested).green());
    println!("  Updated: {}", style(summary.updated).green());
    println!("  Skipped: {}", style(summary.skipped).yellow());
    println!(
        "  Failed: {}",
        if summary.failed > 0 {
            style(summary.failed).red()
        } else {
            style(summary.failed).green()
        }
    );
}

fn print_stats(stats: &DirectoryStatistics) {
    println!("  Items: {}", style(stats.total_items).green());
    println!("  Content and metadata: {}", style(stats.with_both).green());
    println!("  Content only: {}", style(stats.content_only).yellow());
    println!("  Metadata only: {}", style(stats.metadata_only).yellow());
    println!("  Empty: {}", style(stats.empty).red());
    println!("  Content files: {}", style(stats.content_files).green());
}
