//! ACDP Builder CLI
//!
//! Builds Areas of Contiguous Domicile Population from a seeds, sectors and
//! districts layer.
//!
//! Run with: cargo run --release -- run --config acdp.toml
//! Validate a config without running the pipeline: cargo run --release -- validate --config acdp.toml

use std::path::PathBuf;
use std::process::ExitCode;

use acdp_builder::config::PipelineConfig;
use acdp_builder::{error::AcdpError, pipeline};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase output verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and write the output layers.
    Run {
        /// Path to a TOML or JSON pipeline configuration file.
        #[arg(long)]
        config: PathBuf,

        /// Restrict processing to a single district code, overriding the config file.
        #[arg(long)]
        district: Option<String>,

        /// Process districts sequentially instead of in parallel, overriding the config file.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Validate a configuration file without running the pipeline.
    Validate {
        /// Path to a TOML or JSON pipeline configuration file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run {
            config,
            district,
            sequential,
        } => run_command(config, district, sequential),
        Command::Validate { config } => validate_command(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_command(config_path: PathBuf, district: Option<String>, sequential: bool) -> Result<(), AcdpError> {
    info!("[1/2] loading configuration from {}", config_path.display());
    let mut config = PipelineConfig::from_file(&config_path)?;
    if let Some(district) = district {
        config.district_filter = Some(district);
    }
    if sequential {
        config.parallel_districts = false;
    }

    info!("[2/2] running pipeline");
    let output = pipeline::run(&config)?;

    info!(
        acdps = output.acdps.len(),
        orphans = output.orphans.len(),
        "pipeline complete"
    );
    if !output.orphans.is_empty() {
        tracing::warn!(count = output.orphans.len(), "sectors remained unassigned after hole repair");
    }
    Ok(())
}

fn validate_command(config_path: PathBuf) -> Result<(), AcdpError> {
    let config = PipelineConfig::from_file(&config_path)?;
    let band = config.validate()?;
    info!(
        lower_limit = band.lower_limit,
        upper_limit = band.upper_limit,
        "configuration is valid"
    );
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info,acdp_builder=info",
        1 => "debug,acdp_builder=debug",
        _ => "acdp_builder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    use tracing_tree::HierarchicalLayer;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(HierarchicalLayer::new(2).with_targets(false).with_bracketed_fields(true))
        .init();
}
