//! CLI command definitions and argument parsing.

use crate::error::{CliError, Result};
use clap::{Args, Parser, Subcommand};
use coverlab_domain::{ConfidenceLevel, PopulationParameters};
use std::io::Read;
use std::path::PathBuf;

/// Coverlab CLI - Submit samples and watch how many confidence intervals capture μ.
#[derive(Debug, Parser)]
#[command(name = "coverlab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute your interval and record it with the class
    Submit(SubmitArgs),

    /// Compute an interval locally without recording it
    Compute(ComputeArgs),

    /// List every recorded interval
    Results,

    /// Show how many intervals captured μ
    Summary,

    /// Show the exercise parameters
    Params,

    /// Manage configuration profiles
    Profile(ProfileArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Where the sample values come from. Exactly one must be given.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ValuesSource {
    /// Values separated by commas, spaces or newlines
    #[arg(short, long, allow_hyphen_values = true)]
    pub values: Option<String>,

    /// Read values from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Read values from stdin
    #[arg(long)]
    pub stdin: bool,
}

impl ValuesSource {
    /// Inline values
    pub fn inline(values: impl Into<String>) -> Self {
        Self {
            values: Some(values.into()),
            file: None,
            stdin: false,
        }
    }

    /// Raw text to hand to validation
    pub fn read(&self) -> Result<String> {
        if let Some(values) = &self.values {
            return Ok(values.clone());
        }
        if let Some(path) = &self.file {
            return Ok(std::fs::read_to_string(path)?);
        }
        if self.stdin {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            return Ok(text);
        }
        Err(CliError::InvalidInput(
            "provide values with --values, --file or --stdin".to_string(),
        ))
    }
}

/// Arguments for the submit command.
#[derive(Debug, Clone, Parser)]
pub struct SubmitArgs {
    /// Your name or sample ID (defaults to the profile's student_id)
    #[arg(short, long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub source: ValuesSource,

    /// Confidence level: 90, 95 or 99
    #[arg(short, long, default_value = "95", value_parser = parse_level)]
    pub level: ConfidenceLevel,

    /// Reconnect attempts when the service is unreachable
    #[arg(long, default_value = "3")]
    pub retries: u32,
}

/// Arguments for the compute command.
#[derive(Debug, Clone, Parser)]
pub struct ComputeArgs {
    /// Name shown with the result
    #[arg(short, long, default_value = "local")]
    pub id: String,

    #[command(flatten)]
    pub source: ValuesSource,

    /// Confidence level: 90, 95 or 99
    #[arg(short, long, default_value = "95", value_parser = parse_level)]
    pub level: ConfidenceLevel,

    #[command(flatten)]
    pub population: PopulationOverrides,
}

/// Class parameters for offline computation; unset fields use the course defaults
#[derive(Debug, Clone, Default, Args)]
pub struct PopulationOverrides {
    /// Population mean μ
    #[arg(long, allow_hyphen_values = true)]
    pub mean: Option<f64>,

    /// Population standard deviation σ
    #[arg(long)]
    pub std_dev: Option<f64>,

    /// Required number of values n
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Lowest admissible value
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<f64>,

    /// Highest admissible value
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<f64>,
}

impl PopulationOverrides {
    /// Apply the overrides on top of the course defaults
    pub fn to_parameters(&self) -> Result<PopulationParameters> {
        let base = PopulationParameters::default();
        Ok(PopulationParameters::new(
            self.mean.unwrap_or(base.population_mean()),
            self.std_dev.unwrap_or(base.population_std_dev()),
            self.sample_size.unwrap_or(base.sample_size()),
            self.min.unwrap_or(base.min_allowed_value()),
            self.max.unwrap_or(base.max_allowed_value()),
        )?)
    }
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Service URL
        #[arg(short, long)]
        url: String,
        /// Default student ID for submissions
        #[arg(short, long)]
        student_id: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Parse "95", "95%" or " 99 % " into a level
pub fn parse_level(s: &str) -> std::result::Result<ConfidenceLevel, String> {
    s.parse::<ConfidenceLevel>().map_err(|e| e.to_string())
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
