//! Command-line parsing for the biofilm growth tool.
//!
//! Argument parsing and command dispatch stay separate from the modelling and
//! fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_INITIAL_STATE, DEFAULT_MAX_CAPACITY};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "biofilm", version, about = "Biofilm growth modelling with antibiotic inhibition")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve the logistic biofilm model over 24 hours.
    Model(ModelArgs),
    /// Fit an exponential growth rate to planktonic measurements.
    Fit(FitArgs),
    /// List the species catalog, optionally refitting every dataset.
    Species(SpeciesArgs),
    /// Solve the model once per antibiotic concentration.
    Sweep(SweepArgs),
    /// Plot a previously exported trajectory JSON.
    Plot(PlotArgs),
}

/// Where the model's growth rate comes from.
#[derive(Debug, Args, Clone)]
#[group(multiple = false)]
pub struct RateSource {
    /// Use the stored growth rate of a catalog species.
    #[arg(short = 's', long)]
    pub species: Option<String>,

    /// Use an explicit growth rate k_b (1/hour).
    #[arg(short = 'k', long)]
    pub growth_rate: Option<f64>,
}

/// Model inputs other than the growth rate and antibiotic concentration.
#[derive(Debug, Args, Clone)]
pub struct BiofilmArgs {
    #[command(flatten)]
    pub rate: RateSource,

    /// Initial biofilm density (OD).
    #[arg(long, default_value_t = DEFAULT_INITIAL_STATE)]
    pub initial: f64,

    /// Maximum carrying capacity (OD).
    #[arg(long = "max", default_value_t = DEFAULT_MAX_CAPACITY)]
    pub max_capacity: f64,

    /// Minimum inhibitory concentration (0 disables inhibition).
    #[arg(long, default_value_t = 0.0)]
    pub mic: f64,

    /// Integrator relative tolerance.
    #[arg(long, default_value_t = 1e-6)]
    pub rtol: f64,

    /// Integrator absolute tolerance.
    #[arg(long, default_value_t = 1e-9)]
    pub atol: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct ModelArgs {
    #[command(flatten)]
    pub biofilm: BiofilmArgs,

    /// Applied antibiotic concentration.
    #[arg(long, default_value_t = 0.0)]
    pub conc: f64,

    /// Skip the ASCII plot (shown by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the trajectory to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export parameters and trajectory to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Fit the stored dataset of a catalog species.
    #[arg(short = 's', long, conflicts_with_all = ["data", "synthetic_rate"])]
    pub species: Option<String>,

    /// Densities, one per hour, separated by spaces and/or commas.
    #[arg(long, conflicts_with = "synthetic_rate")]
    pub data: Option<String>,

    /// First hour of `--data`.
    #[arg(long, default_value_t = 0)]
    pub start: i64,

    /// Last hour of `--data` (defaults to one hour per value).
    #[arg(long)]
    pub end: Option<i64>,

    /// Register the fitted dataset in the catalog under this name.
    #[arg(long)]
    pub name: Option<String>,

    /// Generate a noisy synthetic dataset with this growth rate instead.
    #[arg(long)]
    pub synthetic_rate: Option<f64>,

    /// Log-space noise for synthetic data.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Random seed for synthetic data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Starting growth rate for the fit.
    #[arg(long, default_value_t = 1.0)]
    pub initial_rate: f64,

    /// Maximum Levenberg-Marquardt iterations.
    #[arg(long = "max-iter", default_value_t = 200)]
    pub max_iterations: usize,

    /// Render data and fitted curve as an ASCII plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct SpeciesArgs {
    /// Refit every dataset and compare with the stored rates.
    #[arg(long)]
    pub refit: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub biofilm: BiofilmArgs,

    /// Comma-separated antibiotic concentrations.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub conc: Vec<f64>,
}

/// Options for plotting a saved trajectory.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Trajectory JSON file produced by `biofilm model --export-json`.
    #[arg(long, value_name = "JSON")]
    pub trajectory: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
