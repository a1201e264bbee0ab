use analyzer::ExperimentAnalyzer;
use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{DesignArgs, Settings, load_config};
use core_types::{AcquisitionChannel, DeviceType};
use std::path::{Path, PathBuf};

mod render;

/// The main entry point for the Vantage experiment readout tool.
fn main() -> anyhow::Result<()> {
    // Load VANTAGE_* overrides and RUST_LOG from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = configuration::init_tracing(&settings.logging)
        .context("Failed to initialise logging")?;
    tracing::debug!(?settings, "Loaded configuration");

    // Execute the appropriate command
    match cli.command {
        Commands::Power(args) => handle_power(args, settings),
        Commands::SampleSize(args) => handle_sample_size(args, settings),
        Commands::Analyze(args) => handle_analyze(args, settings),
        Commands::Segment(args) => handle_segment(args, settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Power analysis and post-hoc readout for two-arm conversion experiments.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the experiment configuration (defaults to ./experiment.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the power of an experiment design.
    Power(DesignArgs),
    /// Solve for the per-arm sample size reaching the target power.
    SampleSize(DesignArgs),
    /// Run the full readout over an experiment export.
    Analyze(AnalyzeArgs),
    /// Conversion lift inside an ad-hoc channel/device slice.
    Segment(SegmentArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// CSV export with one row per trial user.
    #[arg(long)]
    data: PathBuf,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SegmentArgs {
    /// CSV export with one row per trial user.
    #[arg(long)]
    data: PathBuf,

    #[arg(long, value_enum)]
    channel: Option<AcquisitionChannel>,

    #[arg(long, value_enum)]
    device: Option<DeviceType>,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn with_design(args: &DesignArgs, mut settings: Settings) -> ExperimentAnalyzer {
    settings.design = args.apply(&settings.design);
    ExperimentAnalyzer::new(settings)
}

fn handle_power(args: DesignArgs, settings: Settings) -> anyhow::Result<()> {
    let analyzer = with_design(&args, settings);
    let estimate = analyzer.design_power().context("Power calculation failed")?;
    tracing::info!(power = estimate.power, "Estimated design power");
    println!("{}", render::power_table(&estimate));
    Ok(())
}

fn handle_sample_size(args: DesignArgs, settings: Settings) -> anyhow::Result<()> {
    let analyzer = with_design(&args, settings);
    let n = analyzer
        .required_sample_size()
        .context("Sample-size calculation failed")?;
    tracing::info!(n, "Solved per-arm sample size");
    println!("{}", render::sample_size_table(&analyzer.settings().design, n));
    Ok(())
}

fn load_records(path: &Path) -> anyhow::Result<Vec<core_types::ExperimentRecord>> {
    dataset::load_csv(path).with_context(|| format!("Failed to load dataset {}", path.display()))
}

fn handle_analyze(args: AnalyzeArgs, settings: Settings) -> anyhow::Result<()> {
    let records = load_records(&args.data)?;
    let report = ExperimentAnalyzer::new(settings)
        .run(&records)
        .context("Analysis failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report);
    }
    Ok(())
}

fn handle_segment(args: SegmentArgs, settings: Settings) -> anyhow::Result<()> {
    let records = load_records(&args.data)?;
    let lift = ExperimentAnalyzer::new(settings)
        .segment(&records, args.channel, args.device)
        .context("Segment lift failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lift)?);
    } else {
        println!("{}", render::segments_table(std::slice::from_ref(&lift)));
    }
    Ok(())
}
