//! callcheck CLI - end-to-end verification of a two-party WebRTC voice call
//!
//! Usage:
//!   callcheck run                 Run the scenario against the configured page
//!   callcheck run --url <url>     Run against a different page
//!   callcheck init                Write a default callcheck.toml

use anyhow::{Context, Result};
use callcheck_core::ScenarioConfig;
use callcheck_scenario::ScenarioRunner;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "callcheck")]
#[command(version, about = "Headless verification of a two-party WebRTC voice call")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the two-party call scenario
    Run {
        /// Configuration file (defaults apply if absent)
        #[arg(long, default_value = "callcheck.toml")]
        config: PathBuf,

        /// Override the page URL
        #[arg(long)]
        url: Option<String>,

        /// Override the artifact output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write the JSON report to this path instead of the output directory
        #[arg(long)]
        report: Option<PathBuf>,

        /// Run with a visible browser window
        #[arg(long)]
        headed: bool,
    },

    /// Write a default configuration file
    Init {
        /// Where to write the configuration
        #[arg(default_value = "callcheck.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            config,
            url,
            output_dir,
            report,
            headed,
        } => cmd_run(config, url, output_dir, report, headed).await,
        Commands::Init { path } => cmd_init(path).await,
    }
}

async fn cmd_run(
    config_path: PathBuf,
    url: Option<String>,
    output_dir: Option<PathBuf>,
    report: Option<PathBuf>,
    headed: bool,
) -> Result<()> {
    let mut config = ScenarioConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // CLI flags override file values
    if let Some(url) = url {
        config.target_url = url;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(path) = report {
        config.report_path = Some(path);
    }
    if headed {
        config.browser.headless = false;
    }

    info!("Running call scenario against {}", config.target_url);

    let runner = ScenarioRunner::new(config);
    let report = runner.run().await.context("Voice call scenario failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn cmd_init(path: PathBuf) -> Result<()> {
    ScenarioConfig::write_default(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote default configuration to {}", path.display());
    println!("Edit target_url and timeouts as needed, then run 'callcheck run'");
    Ok(())
}
