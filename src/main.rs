use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

use tubeflow::chart::PngChartRenderer;
use tubeflow::config::{ConfigLoader, PipelineConfig};
use tubeflow::error::ErrorCode;
use tubeflow::handoff::{FileHandOff, HandOff, MemoryHandOff};
use tubeflow::stages::{self, ReportOutcome};
use tubeflow::{Pipeline, PipelineError};

/// Load, enrich and report on trending-video data
#[derive(Parser)]
#[command(name = "tubeflow", version)]
#[command(about = "Trending-video ETL: load, enrich and chart", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Override a configuration key for this run (e.g. --set channel_metric=views)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    set: Vec<String>,

    /// Run id shared by stages invoked as separate processes
    #[arg(long, global = true)]
    run_id: Option<String>,

    /// Directory holding the file-backed hand-off store
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage in order
    Run,
    /// Load the video table and hand off its records
    LoadVideos,
    /// Load the category document and hand off the id -> name map
    LoadCategories,
    /// Join categories onto videos and write the enriched table
    Enrich,
    /// Rank the enriched table and render the charts
    Report,
    /// Print the resolved configuration as YAML
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("tubeflow started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run_cli(cli).await {
        let exit_code = match e.downcast_ref::<PipelineError>() {
            Some(pipeline_error) => {
                error!("{}", pipeline_error.developer_message());
                eprintln!("Error: {}", pipeline_error.user_message());
                pipeline_error.exit_code()
            }
            None => {
                error!("Fatal error: {:#}", e);
                eprintln!("Error: {e:#}");
                1
            }
        };
        std::process::exit(exit_code);
    }
}

async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli).await?;

    match cli.command {
        Commands::Run => {
            let run_id = cli
                .run_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let handoff: Arc<dyn HandOff> = if cli.run_id.is_some() {
                Arc::new(FileHandOff::new(&config.state_dir, &run_id)?)
            } else {
                Arc::new(MemoryHandOff::new())
            };

            let summary = Pipeline::new(config, handoff).run().await?;
            println!("Run {} finished", run_id);
            println!("  videos: {}", summary.videos);
            println!("  categories: {}", summary.categories);
            println!("  enriched table: {}", summary.enriched_path.display());
            print_report(&summary.report);
        }
        Commands::LoadVideos => {
            let handoff = stage_handoff(&cli, &config)?;
            let videos = stages::load_videos(&config, &handoff).await?;
            println!("Loaded {} videos into run {}", videos.len(), handoff.run_id());
        }
        Commands::LoadCategories => {
            let handoff = stage_handoff(&cli, &config)?;
            let categories = stages::load_categories(&config, &handoff).await?;
            println!(
                "Loaded {} categories into run {}",
                categories.len(),
                handoff.run_id()
            );
        }
        Commands::Enrich => {
            let handoff = stage_handoff(&cli, &config)?;
            let path = stages::enrich(&config, &handoff).await?;
            println!("Enriched table written to {}", path.display());
        }
        Commands::Report => {
            let handoff = stage_handoff(&cli, &config)?;
            let outcome = stages::report(&config, &handoff, &PngChartRenderer::new()).await?;
            print_report(&outcome);
        }
        Commands::Config => {
            let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

async fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path);
    }
    if let Some(state_dir) = &cli.state_dir {
        loader = loader.with_override("state_dir", state_dir.to_string_lossy())?;
    }
    for assignment in &cli.set {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            PipelineError::invalid_argument(
                ErrorCode::ARGUMENT_GENERIC,
                format!("'{}' is not in KEY=VALUE form", assignment),
                "--set",
            )
        })?;
        loader = loader.with_override(key.trim(), value.trim())?;
    }
    Ok(loader.load().await?)
}

/// Single stages only make sense against a persisted run
fn stage_handoff(cli: &Cli, config: &PipelineConfig) -> anyhow::Result<FileHandOff> {
    let run_id = cli.run_id.as_deref().ok_or_else(|| {
        PipelineError::invalid_argument(
            ErrorCode::ARGUMENT_GENERIC,
            "--run-id is required when running a single stage",
            "run_id",
        )
    })?;
    Ok(FileHandOff::new(&config.state_dir, run_id)?)
}

fn print_report(outcome: &ReportOutcome) {
    match outcome {
        ReportOutcome::Skipped { path } => {
            println!("Report skipped: no enriched table at {}", path.display());
        }
        ReportOutcome::Rendered { charts, .. } => {
            for chart in charts {
                println!("  chart: {}", chart.display());
            }
        }
    }
}
