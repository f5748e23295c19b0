use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rotapress::config::Config;
use rotapress::generator::OpenRouterGenerator;
use rotapress::history::HistoryStore;
use rotapress::publisher::WebhookPublisher;
use rotapress::run::RunOrchestrator;
use rotapress::scheduler::{self, RotationSelector};
use rotapress::source::RssSource;

#[derive(Parser)]
#[command(
    name = "rotapress",
    version,
    about = "Recurring content-publishing job with topic rotation and title deduplication",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one publishing run
    Run {
        /// Select topics and print the plan without generating or publishing
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Show which topics the next run would select, without mutating state
    Plan,

    /// Print a summary of the persisted history state
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Run { dry_run } => {
            tracing::info!(
                articles_per_day = config.run.articles_per_day,
                topics = config.topics.len(),
                dry_run = dry_run,
                "Starting run command"
            );
            run(config, dry_run).await?;
        }

        Commands::Plan => {
            plan(config)?;
        }

        Commands::History => {
            history(config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("rotapress=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("rotapress=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn run(config: Config, dry_run: bool) -> Result<()> {
    if dry_run {
        return plan(config);
    }

    let store = HistoryStore::new(&config.history.path, config.topics.clone());
    let selector = RotationSelector::new(config.topics.clone());

    let generator = Arc::new(OpenRouterGenerator::new(config.generator.clone())?);
    let publisher = Arc::new(WebhookPublisher::new(config.publisher.clone())?);

    let mut orchestrator =
        RunOrchestrator::new(config.run.clone(), store, selector, generator, publisher);

    if !config.feeds.is_empty() {
        let source = RssSource::new(config.feeds.clone(), config.feed_timeout())?;
        orchestrator = orchestrator.with_source(Arc::new(source));
    }

    let report = orchestrator.run().await?;
    print!("{report}");

    Ok(())
}

fn plan(config: Config) -> Result<()> {
    let store = HistoryStore::new(&config.history.path, config.topics.clone());
    let selector = RotationSelector::new(config.topics.clone());

    // Select against a copy of the record; nothing is persisted
    let mut record = store.load();
    let date_key = scheduler::today_key();
    let selection = selector.select(&mut record, &date_key, config.run.articles_per_day);

    println!("Plan for {date_key}:");
    if selection.topics.is_empty() {
        println!("  (nothing to publish — all topics already posted today)");
    }
    for topic in &selection.topics {
        println!("  {topic}");
    }
    println!("  cursor would advance by {} positions", selection.scanned);

    Ok(())
}

fn history(config: Config) -> Result<()> {
    let store = HistoryStore::new(&config.history.path, config.topics.clone());
    let record = store.load();

    println!("History state at {}:", config.history.path.display());
    println!("  titles seen:     {}", record.seen_title_hashes.len());
    println!("  total published: {}", record.total_published());
    println!("  rotation cursor: {}", record.rotation_cursor);
    for topic in &config.topics {
        println!(
            "  {:<16} cycles: {:<4} recent: {}",
            topic,
            record.loop_index(topic),
            record.recent_titles(topic).len()
        );
    }
    if let Some((date, topics)) = record.days.iter().next_back() {
        println!("  last run day:    {date} ({})", topics.join(", "));
    }

    Ok(())
}
