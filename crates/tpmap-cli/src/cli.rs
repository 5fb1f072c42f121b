use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tpmap::core::models::proteome::ExperimentKind;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Felix Feyertag",
    version,
    about = "TPMAP CLI - A command-line interface for TPMAP, a scoring and inference engine for thermal proteome profiling experiments.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize, score and rank every protein of a 1D or 2D experiment.
    Score(ScoreArgs),
    /// Write the pairwise distance matrix between all proteins of a 2D experiment.
    Distance(DistanceArgs),
    /// Write the mean difference of every protein from a selected one (2D only).
    Difference(DifferenceArgs),
}

/// Layout of the input table.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentArg {
    /// Four replicate series (t1, t2, v1, v2) across temperatures.
    #[value(name = "1d")]
    OneD,
    /// Concentration by temperature grid.
    #[value(name = "2d")]
    TwoD,
}

impl From<ExperimentArg> for ExperimentKind {
    fn from(arg: ExperimentArg) -> Self {
        match arg {
            ExperimentArg::OneD => ExperimentKind::OneDimensional,
            ExperimentArg::TwoD => ExperimentKind::TwoDimensional,
        }
    }
}

/// Input and analysis options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    // --- Core Arguments ---
    /// Path to the tab-delimited abundance table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Experiment layout of the input table.
    #[arg(short = 'k', long, value_enum, default_value_t = ExperimentArg::TwoD)]
    pub kind: ExperimentArg,

    /// Path to an analysis configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Analysis Overrides ---
    /// Override the normalization mode ('none' or 'median').
    #[arg(long, value_name = "MODE")]
    pub normalization: Option<String>,

    /// Override the population percentile used for the lower threshold.
    #[arg(long, value_name = "FLOAT")]
    pub min_percentile: Option<f64>,

    /// Override the population percentile used for the upper threshold.
    #[arg(long, value_name = "FLOAT")]
    pub max_percentile: Option<f64>,

    /// Override the weight of Tm shifts in the 1D score.
    #[arg(long, value_name = "FLOAT")]
    pub tm_weight: Option<f64>,

    /// Override the number of bootstrap iterations (2D). Zero disables p-values.
    #[arg(short = 'b', long, value_name = "INT")]
    pub bootstrap_iterations: Option<usize>,

    /// Override the number of curve-fit attempts per replicate (1D).
    #[arg(long, value_name = "INT")]
    pub curve_fit_attempts: Option<usize>,

    /// Run the analysis on the calling thread only.
    #[arg(long)]
    pub single_thread: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S bootstrap.iterations=5000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path for the tab-delimited score table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write the hex colour of every normalized cell to this path.
    #[arg(long, value_name = "PATH")]
    pub colours: Option<PathBuf>,
}

/// Arguments for the `distance` subcommand.
#[derive(Args, Debug)]
pub struct DistanceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path for the tab-delimited distance matrix.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `difference` subcommand.
#[derive(Args, Debug)]
pub struct DifferenceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Accession of the protein the others are compared with.
    #[arg(short, long, required = true, value_name = "ACCESSION")]
    pub protein: String,

    /// Path for the tab-delimited difference table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
