//! # Project Flow Runner
//!
//! Command-line entry point for the end-to-end project creation check.
//! Exits 0 when every step passes and 1 otherwise, so it can gate a CI job.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

use projectflow::config::{CleanupPolicy, ConfigLoader, FlowConfig};
use projectflow::logging::init_structured_logging;
use projectflow::scenario::{ProjectFlowScenario, ScenarioReport};

#[derive(Parser)]
#[command(name = "project-flow")]
#[command(about = "Verify the project creation flow across API and web UI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: ./projectflow.toml or ./config/projectflow.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the flow once
    Run(RunArgs),

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(clap::Args, Default)]
pub struct RunArgs {
    /// Resource API base URL
    #[arg(long, env = "PROJECTFLOW_API_URL")]
    api_url: Option<String>,

    /// Web UI base URL
    #[arg(long, env = "PROJECTFLOW_UI_URL")]
    ui_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Delete the created resource during teardown instead of only logging
    #[arg(long)]
    delete_resource: bool,

    /// Write the JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    let result = match cli.command {
        Some(Commands::Config) => show_config(cli.config),
        Some(Commands::Run(args)) => run_flow(cli.config, args).await,
        None => run_flow(cli.config, RunArgs::default()).await,
    };

    match result {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("project-flow failed: {:#}", e);
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<FlowConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::new().with_file(path),
        None => ConfigLoader::new(),
    };
    Ok(loader.load()?)
}

fn show_config(path: Option<PathBuf>) -> anyhow::Result<bool> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config.sanitized())?);
    Ok(true)
}

async fn run_flow(path: Option<PathBuf>, args: RunArgs) -> anyhow::Result<bool> {
    let mut config = load_config(path)?;
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }
    if let Some(ui_url) = args.ui_url {
        config.ui.base_url = ui_url;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if args.delete_resource {
        config.fixture.cleanup = CleanupPolicy::Delete;
    }

    println!("🚀 Project flow");
    println!("   API: {}", config.api.base_url);
    println!("   UI:  {}", config.ui.base_url);

    let scenario = ProjectFlowScenario::with_chromium(config)?;
    let run = scenario.run().await;
    print_summary(&run.report);

    if let Some(report_path) = args.report {
        std::fs::write(&report_path, run.report.to_json_pretty()?)
            .with_context(|| format!("writing report to {}", report_path.display()))?;
        info!(path = %report_path.display(), "Report written");
    }

    Ok(run.result.is_ok())
}

fn print_summary(report: &ScenarioReport) {
    for transition in &report.transitions {
        println!("   {} -> {}", transition.from_state, transition.to_state);
    }

    match &report.failure {
        None => println!("✅ Flow passed in {}ms", report.elapsed_ms),
        Some(failure) => {
            let step = failure
                .step
                .map_or_else(|| "unknown step".to_string(), |step| step.to_string());
            println!("❌ Flow failed at {step}: {}", failure.message);
        }
    }
}
