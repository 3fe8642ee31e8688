use clap::{Args, Parser, Subcommand};
use h4corr::core::forcefield::presets::Method;
use h4corr::workflows::correction::Term;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "h4corr - Evaluate H4 hydrogen-bond and H-H repulsion corrections (with gradients) for semiempirical methods.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
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
    /// Evaluate the corrections for a geometry.
    Evaluate(EvaluateArgs),
    /// Compare the corrections for a geometry against a reference output file.
    Check(CheckArgs),
    /// Print a built-in parameter set as TOML.
    Params(ParamsArgs),
}

/// Where the correction parameters come from.
#[derive(Args, Debug, Clone)]
#[group(required = false, multiple = false)]
pub struct ParameterSource {
    /// Path to a parameter file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    /// Built-in parameter set.
    #[arg(short, long, value_name = "NAME")]
    pub method: Option<Method>,
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to the input geometry (XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub source: ParameterSource,

    /// Correction term to report: total, h4 or hh-rep.
    #[arg(short, long, default_value_t = Term::Total, value_name = "TERM")]
    pub term: Term,

    /// Write both terms and their gradients in reference-output format.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write the gradient of the selected term as a CSV table.
    #[arg(long, value_name = "PATH")]
    pub gradient_csv: Option<PathBuf>,

    /// Enumerate candidate pairs by brute force instead of a cell list.
    #[arg(long)]
    pub all_pairs: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the input geometry (XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the reference output file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub reference: PathBuf,

    #[command(flatten)]
    pub source: ParameterSource,

    /// Largest accepted absolute deviation in energies and gradient components.
    #[arg(long, default_value_t = 1e-6, value_name = "FLOAT")]
    pub tolerance: f64,

    /// Enumerate candidate pairs by brute force instead of a cell list.
    #[arg(long)]
    pub all_pairs: bool,
}

/// Arguments for the `params` subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Built-in parameter set to print.
    #[arg(short, long, default_value_t = Method::Pm6D3H4, value_name = "NAME")]
    pub method: Method,

    /// Write the parameters to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
