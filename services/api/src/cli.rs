use crate::demo::run_demo;
use crate::error::AppError;
use crate::infra::{load_case, DecisionEnvelope};
use crate::server;
use clap::{Args, Parser, Subcommand};
use gastric_decision::config::AppConfig;
use gastric_decision::decisions::DecisionComposer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Gastric Decision Service",
    about = "Score gastric cancer treatment alternatives over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compose a decision for a case stored as JSON and print it
    Evaluate(EvaluateArgs),
    /// Run the reference patient scenarios and print a summary
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Path to a case file: `{ patient, tumor, treatment_intent?, context? }`
    #[arg(long)]
    pub(crate) case: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Demo => run_demo(),
    }
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let intake = load_case(&args.case)?;
    let decision = DecisionComposer::new(config.engine).compose(intake)?;
    let envelope = DecisionEnvelope::new(decision);

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{rendered}");
    Ok(())
}
