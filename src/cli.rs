use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "converge")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Plan idempotent changes for a fleet of hosts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the commands each host needs
    Plan(PlanArgs),

    /// Show which hosts already match the deploy
    Status(StatusArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that plans a deploy
#[derive(Args, Clone, Default)]
pub struct DeployArgs {
    /// Deploy file (defaults to the user config directory)
    #[arg(short, long, env = "CONVERGE_DEPLOY")]
    pub deploy: Option<PathBuf>,

    /// Only plan operations of this kind (e.g. packages, service.nginx)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Only plan this host
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub deploy: DeployArgs,

    /// Number of hosts planned in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print a JSON report
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub deploy: DeployArgs,
}
