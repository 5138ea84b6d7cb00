use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "fepladder developers",
    version,
    about = "fepladder CLI - Plan, validate and analyze alchemical free-energy perturbation ladders between two ligands.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the intermediate states the configured mutations expand into.
    Plan(PlanArgs),
    /// Validate the configuration, the base setups and the state of existing ladders.
    Check(CheckArgs),
    /// Estimate free-energy differences from re-evaluated pair energies.
    Analyze(AnalyzeArgs),
}

/// Options shared by every subcommand that reads a run configuration.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override `simulation.nsteps` from the config file.
    #[arg(long, value_name = "INT")]
    pub nsteps: Option<u64>,

    /// Override `simulation.nstdcd` from the config file.
    #[arg(long, value_name = "INT")]
    pub nstdcd: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S simulation.nsteps=50000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only show the plan of this structure.
    #[arg(short, long, value_name = "NAME")]
    pub structure: Option<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only check this structure.
    #[arg(short, long, value_name = "NAME")]
    pub structure: Option<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// The structure whose ladder is analyzed.
    #[arg(short, long, required = true, value_name = "NAME")]
    pub structure: String,

    /// Number of intermediate states. Defaults to the length of the configured plan.
    #[arg(short = 'n', long, value_name = "INT")]
    pub states: Option<usize>,

    /// Export the free-energy, uncertainty and overlap matrices as CSV into this directory.
    #[arg(long, value_name = "DIR")]
    pub csv_dir: Option<PathBuf>,
}
