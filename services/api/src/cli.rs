use crate::report::{run_batch, run_rules, run_score, BatchArgs, RulesArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lifestyle_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lifestyle Risk Assessment",
    about = "Score lifestyle questionnaires over HTTP or from the command line",
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
    /// Score a single JSON answer file (or stdin) and print the result
    Score(ScoreArgs),
    /// Score every row of a CSV export and write one result row per respondent
    Batch(BatchArgs),
    /// Print the active rule table as JSON
    Rules(RulesArgs),
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

/// Rule table selection shared by the offline commands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RuleSourceArgs {
    /// JSON rule table to load instead of the configured one
    #[arg(long)]
    pub(crate) rules: Option<std::path::PathBuf>,
    /// Built-in preset name (standard, compact, original)
    #[arg(long, conflicts_with = "rules")]
    pub(crate) preset: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Batch(args) => run_batch(args),
        Command::Rules(args) => run_rules(args),
    }
}
