use crate::commands::{
    run_assess, run_consolidate, run_credits, run_evaluate, AssessArgs, ConsolidateArgs,
    EvaluateArgs,
};
use crate::infra::load_catalog;
use clap::{Parser, Subcommand};
use credit_engine::config::AppConfig;
use credit_engine::error::AppError;
use credit_engine::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "credit-assessor",
    about = "Assess building-certification credits from project documents",
    version
)]
struct Cli {
    /// JSON credit catalog replacing the built-in definitions
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the credits the catalog can assess
    Credits,
    /// Evaluate one credit against an already consolidated parameter file
    Evaluate(EvaluateArgs),
    /// Merge document extractions for one credit and resolve conflicts
    Consolidate(ConsolidateArgs),
    /// Consolidate, evaluate and recommend in one pass
    Assess(AssessArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "credit assessor starting");

    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Command::Credits => run_credits(&catalog),
        Command::Evaluate(args) => run_evaluate(&catalog, &config, args),
        Command::Consolidate(args) => run_consolidate(&catalog, &config, args),
        Command::Assess(args) => run_assess(&catalog, &config, args),
    }
}
